//! Error handling for the histogram service
//!
//! Re-exports the error types so callers can use
//! `crate::errors::{AppError, AppResult}` without reaching into submodules.

pub mod types;

pub use types::{AppError, AppResult};
