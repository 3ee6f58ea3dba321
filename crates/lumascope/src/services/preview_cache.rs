//! Bounded cache of pending preview images
//!
//! Holds the most recently analyzed image per `(workflow, node)` pair so the
//! retrieval endpoint can serve histogram previews without re-running the
//! producing graph step. This is a working-set cache for active inspection,
//! not an archive: the bound favors "most recently analyzed node wins" over
//! historical completeness, and nothing survives a process restart.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::ImageTensor;

/// Upper bound on cached entries after any insert.
pub const MAX_CACHE_ITEMS: usize = 10;

/// The cache as shared by the analysis step and the retrieval handler.
///
/// One mutex guards the whole prune-insert-evict sequence; the critical
/// sections never run fallible or awaiting operations, so a failed request
/// cannot leave the cache partially updated.
pub type SharedPreviewCache = Arc<Mutex<PreviewCache>>;

/// Ordered bounded mapping from composite cache key to image tensor.
///
/// Insertion order drives eviction: `insert` marks an entry most recently
/// used and evicts the overall-oldest entry once the bound is exceeded, while
/// `get` reads without refreshing recency.
pub struct PreviewCache {
    entries: LruCache<String, ImageTensor>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(MAX_CACHE_ITEMS).unwrap()),
        }
    }

    /// The cache wrapped for sharing across both entry points. Constructed
    /// once at process start and passed by reference, never a global.
    pub fn shared() -> SharedPreviewCache {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Composite key for a workflow/node pair.
    pub fn cache_key(workflow_id: &str, node_id: &str) -> String {
        format!("histogram_{workflow_id}_{node_id}")
    }

    /// Remove every entry keyed under this workflow/node family.
    ///
    /// One composite key maps to at most one entry, so this removes zero or
    /// one; the prefix match guarantees a re-analysis never leaves a stale
    /// duplicate behind under an incidental key variant.
    pub fn prune_node(&mut self, workflow_id: &str, node_id: &str) {
        let prefix = Self::cache_key(workflow_id, node_id);
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.entries.pop(&key);
            debug!(%key, "pruned cached preview entry");
        }
    }

    /// Insert or replace the entry for `key` and mark it most recently used.
    ///
    /// Replacing an existing key updates in place, so the entry count never
    /// transiently exceeds the bound and a replacement never double-evicts.
    pub fn insert(&mut self, key: String, image: ImageTensor) {
        if let Some((evicted, _)) = self.entries.push(key.clone(), image)
            && evicted != key
        {
            debug!(%evicted, "evicted oldest preview entry");
        }
    }

    /// Read-only lookup; does not alter eviction order.
    pub fn get(&self, key: &str) -> Option<&ImageTensor> {
        self.entries.peek(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pixel(value: f32) -> ImageTensor {
        ImageTensor::from_pixels(1, 1, 3, vec![value; 3]).unwrap()
    }

    #[test]
    fn composite_key_format() {
        assert_eq!(PreviewCache::cache_key("wf", "7"), "histogram_wf_7");
        assert_eq!(PreviewCache::cache_key("unknown", "x"), "histogram_unknown_x");
    }

    #[test]
    fn never_exceeds_bound() {
        let mut cache = PreviewCache::new();
        for i in 0..30 {
            cache.insert(format!("histogram_w_{i}"), pixel(0.0));
            assert!(cache.len() <= MAX_CACHE_ITEMS);
        }
        assert_eq!(cache.len(), MAX_CACHE_ITEMS);
    }

    #[test]
    fn eleventh_insert_evicts_the_oldest() {
        let mut cache = PreviewCache::new();
        for i in 1..=11 {
            cache.insert(format!("histogram_w_{i}"), pixel(0.0));
        }
        assert!(cache.get("histogram_w_1").is_none());
        for i in 2..=11 {
            assert!(cache.get(&format!("histogram_w_{i}")).is_some());
        }
    }

    #[test]
    fn reads_do_not_refresh_recency() {
        let mut cache = PreviewCache::new();
        for i in 1..=10 {
            cache.insert(format!("histogram_w_{i}"), pixel(0.0));
        }
        for _ in 0..5 {
            assert!(cache.get("histogram_w_1").is_some());
        }
        cache.insert("histogram_w_11".to_string(), pixel(0.0));
        // repeated reads did not save the oldest entry
        assert!(cache.get("histogram_w_1").is_none());
        assert!(cache.get("histogram_w_2").is_some());
    }

    #[test]
    fn insert_refreshes_recency() {
        let mut cache = PreviewCache::new();
        for i in 1..=10 {
            cache.insert(format!("histogram_w_{i}"), pixel(0.0));
        }
        cache.insert("histogram_w_1".to_string(), pixel(0.5));
        cache.insert("histogram_w_11".to_string(), pixel(0.0));
        // the re-written entry survived; the next-oldest was evicted instead
        assert!(cache.get("histogram_w_1").is_some());
        assert!(cache.get("histogram_w_2").is_none());
    }

    #[test]
    fn reinsert_replaces_without_growing() {
        let mut cache = PreviewCache::new();
        cache.insert("histogram_w_1".to_string(), pixel(0.25));
        cache.insert("histogram_w_1".to_string(), pixel(0.75));
        assert_eq!(cache.len(), 1);
        let cached = cache.get("histogram_w_1").unwrap();
        assert_eq!(cached.sample(0, 0, 0), 0.75);
    }

    #[test]
    fn prune_removes_only_the_key_family() {
        let mut cache = PreviewCache::new();
        cache.insert(PreviewCache::cache_key("a", "1"), pixel(0.0));
        cache.insert(PreviewCache::cache_key("a", "2"), pixel(0.0));
        cache.insert(PreviewCache::cache_key("b", "1"), pixel(0.0));
        cache.prune_node("a", "1");
        assert!(cache.get("histogram_a_1").is_none());
        assert!(cache.get("histogram_a_2").is_some());
        assert!(cache.get("histogram_b_1").is_some());
    }

    proptest! {
        #[test]
        fn bound_holds_for_any_insert_sequence(keys in prop::collection::vec("[a-d]{1,3}", 0..120)) {
            let mut cache = PreviewCache::new();
            for key in keys {
                cache.insert(format!("histogram_w_{key}"), pixel(0.0));
                prop_assert!(cache.len() <= MAX_CACHE_ITEMS);
            }
        }
    }
}
