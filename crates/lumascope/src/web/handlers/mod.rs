//! HTTP request handlers
//!
//! Thin handlers that delegate to the analysis engine and the preview cache;
//! status mapping lives in `web::responses`.

pub mod health;
pub mod histogram;
