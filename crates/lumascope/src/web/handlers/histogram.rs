//! Histogram retrieval handler
//!
//! Serves the pull-based half of the analyze/inspect split: the analysis step
//! cached the image, this endpoint recomputes its histogram report and ships
//! it together with a downscaled preview.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::debug;

use crate::analysis::compute_histogram_stats;
use crate::errors::AppError;
use crate::preview;
use crate::web::{AppState, responses::HistogramResponse};

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    pub key: Option<String>,
}

/// Generate histogram data for a cached image
///
/// Looks up the cache key handed to the UI by the analysis step, recomputes
/// the histogram report for the cached image, and returns it with a base64
/// PNG preview.
#[utoipa::path(
    get,
    path = "/api/histogram/generate",
    tag = "histogram",
    summary = "Retrieve histogram data and preview",
    params(
        ("key" = Option<String>, Query, description = "Cache key returned by the analysis step"),
    ),
    responses(
        (status = 200, description = "Histogram report with preview image", body = HistogramResponse),
        (status = 400, description = "Missing cache key", body = crate::web::responses::ErrorResponse),
        (status = 404, description = "No cached image for this key", body = crate::web::responses::ErrorResponse),
        (status = 500, description = "Preview generation failed", body = crate::web::responses::ErrorResponse),
    )
)]
pub async fn generate_histogram(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
) -> Result<Json<HistogramResponse>, AppError> {
    let key = params
        .key
        .ok_or_else(|| AppError::bad_request("Missing histogram cache key."))?;
    debug!(%key, "fetching cached image");

    let image = {
        let cache = state.cache.lock().await;
        cache.get(&key).cloned()
    }
    .ok_or_else(|| {
        AppError::not_found("No source image found. Please re-run the producing node.")
    })?;

    let report = compute_histogram_stats(&image);
    let png = preview::render_preview_png(&image)?;

    Ok(Json(HistogramResponse::new(
        preview::to_data_uri(&png),
        report.histograms,
        report.stats,
    )))
}
