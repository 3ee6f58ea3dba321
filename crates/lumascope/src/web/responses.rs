//! HTTP response types and error mapping
//!
//! The response bodies here are a wire contract with the histogram viewer:
//! success bodies carry `status: "success"` plus the preview and report,
//! error bodies carry `status: "error"` plus a message. The mapping from
//! [`AppError`] to status codes lives in one place so every handler agrees.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::models::{ChannelHistograms, ChannelStatsSet};

/// Successful retrieval: the preview plus the full histogram report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistogramResponse {
    /// Always `"success"`.
    pub status: String,
    /// PNG preview as a `data:image/png;base64,...` URI.
    pub preview_image: String,
    pub histograms: ChannelHistograms,
    pub stats: ChannelStatsSet,
}

impl HistogramResponse {
    pub fn new(preview_image: String, histograms: ChannelHistograms, stats: ChannelStatsSet) -> Self {
        Self {
            status: "success".to_string(),
            preview_image,
            histograms,
            stats,
        }
    }
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    pub message: String,
}

/// Liveness report for `/health`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub cached_images: usize,
}

/// Map an [`AppError`] onto an HTTP status and the error body.
///
/// Expected conditions (missing key, cache miss, invalid input) stay at
/// debug; everything else is a real failure and logs its full chain, while
/// the caller only ever sees the message.
pub fn handle_error(error: AppError) -> Response {
    let status = match &error {
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::UnsupportedBatch { .. } | AppError::InvalidShape { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppError::Serialization(_) | AppError::Image(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = ?error, "request failed");
    } else {
        tracing::debug!(error = %error, status = %status, "request rejected");
    }

    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            message: error.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self)
    }
}
