//! Analysis step
//!
//! The entry point the host graph runtime invokes once per image-producing
//! step. It validates the tensor, caches a deep copy for later preview
//! retrieval, runs the statistics engine, and hands the serialized stats back
//! to the invoking node together with the cache key the viewer needs.

use tracing::debug;

use crate::analysis::compute_histogram_stats;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalyzeOutput, AnalyzeRequest, UiMetadata};
use crate::services::preview_cache::{PreviewCache, SharedPreviewCache};

/// Sentinel workflow id when the owning workflow metadata is absent.
const UNKNOWN_WORKFLOW: &str = "unknown";
/// Sentinel node id when the node identifier is absent.
const DEFAULT_NODE_ID: &str = "x";

/// Runs the analysis step against the shared preview cache.
#[derive(Clone)]
pub struct AnalysisService {
    cache: SharedPreviewCache,
}

impl AnalysisService {
    pub fn new(cache: SharedPreviewCache) -> Self {
        Self { cache }
    }

    /// Analyze a single image and cache it for preview retrieval.
    ///
    /// The cache holds an independent deep copy while the engine runs on the
    /// caller's tensor, so the two can never alias. The cache mutation is a
    /// single infallible critical section: prune the key family, insert, let
    /// the bound evict the overall-oldest entry.
    pub async fn analyze(&self, request: AnalyzeRequest) -> AppResult<AnalyzeOutput> {
        let AnalyzeRequest {
            version,
            image,
            workflow_metadata,
            node_id,
        } = request;

        debug!(%version, shape = ?image.shape(), "analysis step invoked");

        let batch = image.batch_len();
        if batch > 1 {
            return Err(AppError::UnsupportedBatch { count: batch });
        }

        let workflow_id = workflow_metadata
            .and_then(|metadata| metadata.workflow.id)
            .unwrap_or_else(|| UNKNOWN_WORKFLOW.to_string());
        let node_id = node_id.unwrap_or_else(|| DEFAULT_NODE_ID.to_string());
        let cache_key = PreviewCache::cache_key(&workflow_id, &node_id);
        debug!(%cache_key, "caching image for preview retrieval");

        {
            let mut cache = self.cache.lock().await;
            cache.prune_node(&workflow_id, &node_id);
            cache.insert(cache_key.clone(), image.clone());
            debug!(cached = cache.len(), "preview cache updated");
        }

        let report = compute_histogram_stats(&image);
        let result = serde_json::to_string_pretty(&report.stats)?;

        Ok(AnalyzeOutput {
            ui: UiMetadata {
                cache_key,
                message: "Histogram generated".to_string(),
            },
            result,
        })
    }
}
