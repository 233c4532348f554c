//! Parsed STAC item cache.
//!
//! Opening a reader fetches and parses the item document. Tile requests for
//! one item arrive in bursts, so parsed items are kept in an LRU cache keyed
//! by their locator.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;

use super::item::StacItem;

/// Default number of cached items.
pub const DEFAULT_ITEM_CACHE_CAPACITY: usize = 100;

/// LRU cache of parsed STAC items.
///
/// The cache is thread-safe and can be shared across async tasks via `Arc`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stac_tiler::stac::{ItemCache, StacItem};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = ItemCache::new(10);
///     let item = StacItem::from_slice(
///         br#"{"type": "Feature", "id": "a", "bbox": [0, 0, 1, 1], "assets": {}}"#,
///     )
///     .unwrap();
///
///     cache.put("s3://bucket/a.json", Arc::new(item)).await;
///     assert!(cache.get("s3://bucket/a.json").await.is_some());
/// }
/// ```
pub struct ItemCache {
    cache: RwLock<LruCache<String, Arc<StacItem>>>,
    capacity: NonZeroUsize,
}

impl ItemCache {
    /// Create a cache holding up to `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            capacity,
        }
    }

    /// Get an item, marking it as recently used.
    pub async fn get(&self, url: &str) -> Option<Arc<StacItem>> {
        // LruCache::get updates recency, so it needs the write lock
        let mut cache = self.cache.write().await;
        cache.get(url).cloned()
    }

    pub async fn put(&self, url: impl Into<String>, item: Arc<StacItem>) {
        let mut cache = self.cache.write().await;
        cache.put(url.into(), item);
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_CACHE_CAPACITY)
    }
}
