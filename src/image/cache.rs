use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use moka::future::Cache;

/// Memoizes original URL -> proxy URL rewrites for the lifetime of the owner.
///
/// Unbounded and never expires. Cloning shares the underlying map.
#[derive(Clone)]
pub struct ProxyUrlCache {
    entries: Cache<String, String>,
    computed: Arc<AtomicU64>,
}

impl Default for ProxyUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyUrlCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
            computed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the cached rewrite for `original`, running `compute` only on the
    /// first request for that URL. Concurrent first requests share one run.
    pub async fn get_or_compute<F>(&self, original: &str, compute: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        let computed = Arc::clone(&self.computed);
        let key = original.to_string();

        self.entries
            .get_with(key.clone(), async move {
                computed.fetch_add(1, Ordering::Relaxed);
                compute(&key)
            })
            .await
    }

    pub async fn get(&self, original: &str) -> Option<String> {
        self.entries.get(original).await
    }

    /// Number of rewrites computed so far, i.e. cache misses.
    pub fn computed(&self) -> u64 {
        self.computed.load(Ordering::Relaxed)
    }
}
