//! Service layer
//!
//! Business logic shared by the two entry points: the bounded preview cache
//! and the analysis step that feeds it.

pub mod analysis;
pub mod preview_cache;

pub use analysis::AnalysisService;
pub use preview_cache::{MAX_CACHE_ITEMS, PreviewCache, SharedPreviewCache};
