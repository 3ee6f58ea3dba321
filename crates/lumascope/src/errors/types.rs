//! Error type definitions
//!
//! One application-level error enum covers both entry points. The analysis
//! step surfaces `UnsupportedBatch` to the host as a hard failure; the
//! retrieval handler maps every variant onto an HTTP status in the web layer.

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// More than one image stacked along the leading dimension. Fatal to the
    /// single analysis call, never retried.
    #[error("Batched image input is not supported (got a batch of {count}).")]
    UnsupportedBatch { count: usize },

    /// A tensor whose shape cannot describe a single RGB/RGBA image.
    #[error("Invalid image shape: {message}")]
    InvalidShape { message: String },

    /// Malformed retrieval request, e.g. a missing cache key.
    #[error("{message}")]
    BadRequest { message: String },

    /// Cache miss: the requested key was never analyzed or has been evicted.
    #[error("{message}")]
    NotFound { message: String },

    /// JSON serialization failures.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Preview encoding failures from the image pipeline.
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// Any other unexpected failure.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_shape<S: Into<String>>(message: S) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(anyhow::anyhow!("{}", message.into()))
    }
}
