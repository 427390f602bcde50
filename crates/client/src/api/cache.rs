//! Tag-based response cache for API reads.
//!
//! Read endpoints declare the tags their data belongs to; mutation endpoints
//! declare the tags they invalidate. A successful mutation drops every
//! cached read that shares one of its tags, so the next read refetches.

use std::time::Duration;

use moka::sync::Cache;

/// Labels connecting cached reads to the mutations that stale them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Marketplace product listings and details.
    Products,
    /// The user's orders.
    Orders,
    /// Saved soil locations and records.
    SoilRecords,
    /// Community feed posts.
    Posts,
    /// The user's own profile.
    Profile,
}

#[derive(Clone)]
struct CachedEntry {
    value: serde_json::Value,
    tags: Vec<CacheTag>,
}

/// In-memory cache of parsed read responses, keyed by request path.
pub struct ResponseCache {
    entries: Cache<String, CachedEntry>,
}

impl ResponseCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(1_024)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build(),
        }
    }

    /// Look up a cached response by request path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<serde_json::Value> {
        self.entries.get(path).map(|entry| entry.value)
    }

    /// Store a response under the given tags.
    pub fn insert(&self, path: &str, value: serde_json::Value, tags: &[CacheTag]) {
        self.entries.insert(
            path.to_owned(),
            CachedEntry {
                value,
                tags: tags.to_vec(),
            },
        );
    }

    /// Drop every entry labeled with any of the given tags.
    pub fn invalidate(&self, tags: &[CacheTag]) {
        if tags.is_empty() {
            return;
        }
        let tags = tags.to_vec();
        // The closure registry only fails if invalidation support was not
        // enabled at build time, which it always is here.
        if self
            .entries
            .invalidate_entries_if(move |_path, entry| {
                entry.tags.iter().any(|tag| tags.contains(tag))
            })
            .is_err()
        {
            tracing::warn!("cache invalidation closure rejected, clearing cache");
            self.entries.invalidate_all();
        }
    }

    /// Drop everything (used on logout).
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of live entries, pending maintenance included.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Whether the cache currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
