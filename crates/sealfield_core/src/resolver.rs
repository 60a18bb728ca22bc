//! Cached lookup of a collection's sensitive fields.

use crate::schema::SchemaSource;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves and caches the sensitive field names of each collection.
///
/// The schema is read once per handle for the lifetime of the resolver.
/// Schema changes are not detected automatically: whoever changes a schema
/// must call [`invalidate`](Self::invalidate). The cache is safe to share
/// across threads. A lookup that overlaps an invalidation of the same
/// handle returns its fresh read but does not cache it, so an invalidation
/// is never undone by a slower reader.
pub struct SensitiveFieldResolver {
    source: Arc<dyn SchemaSource>,
    cache: RwLock<Cache>,
}

#[derive(Default)]
struct Cache {
    entries: HashMap<String, Arc<[String]>>,
    /// Bumped per handle by `invalidate`.
    generations: HashMap<String, u64>,
    /// Bumped by `invalidate_all`.
    epoch: u64,
}

impl Cache {
    fn stamp(&self, handle: &str) -> (u64, u64) {
        (self.epoch, self.generations.get(handle).copied().unwrap_or(0))
    }
}

impl SensitiveFieldResolver {
    /// Creates a resolver over a schema source.
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// The underlying schema source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn SchemaSource> {
        &self.source
    }

    /// Ordered sensitive field names for `handle`.
    ///
    /// Returns an empty list, not an error, when the collection has no
    /// sensitive fields or is unknown.
    pub fn resolve(&self, handle: &str) -> Arc<[String]> {
        let stamp = {
            let cache = self.cache.read();
            if let Some(fields) = cache.entries.get(handle) {
                return Arc::clone(fields);
            }
            cache.stamp(handle)
        };

        let fields: Arc<[String]> = self.source.sensitive_field_names(handle).into();
        tracing::debug!(collection = handle, count = fields.len(), "resolved sensitive fields");

        let mut cache = self.cache.write();
        if cache.stamp(handle) != stamp {
            tracing::debug!(collection = handle, "invalidated during lookup, not caching");
            return fields;
        }
        cache
            .entries
            .entry(handle.to_string())
            .or_insert(fields)
            .clone()
    }

    /// Drops the cached entry for `handle`.
    pub fn invalidate(&self, handle: &str) {
        let mut cache = self.cache.write();
        cache.entries.remove(handle);
        *cache.generations.entry(handle.to_string()).or_insert(0) += 1;
    }

    /// Drops every cached entry.
    pub fn invalidate_all(&self) {
        let mut cache = self.cache.write();
        cache.entries.clear();
        cache.generations.clear();
        cache.epoch += 1;
    }

    /// Number of cached collections.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().entries.len()
    }
}

impl std::fmt::Debug for SensitiveFieldResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensitiveFieldResolver")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}
