//! Cache providers: who decides when merging happens and how long results
//! are retained.
//!
//! Both providers publish only complete, fully-built tables behind `Arc`s,
//! so concurrent readers never observe a partial table and invalidation
//! never disturbs a reader holding the previous one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::{
    error::Error,
    types::{LookupTable, fold},
};

/// Builds lookup tables on demand. Implemented by the resolution pipeline;
/// tests substitute counting fakes.
pub trait TableSource: Send + Sync {
    /// Builds the complete table for one requested culture.
    fn build(&self, culture_name: &str) -> Result<LookupTable, Error>;

    /// Every culture the underlying resources declare, used for eager
    /// warm-up. May be empty.
    fn known_cultures(&self) -> Vec<String>;
}

/// The one contract callers see; selected by the `static_cache` option.
pub trait CacheProvider: Send + Sync {
    /// Returns the table for a culture, building it if this provider's
    /// strategy calls for that.
    fn lookup_table(&self, culture_name: &str) -> Result<Arc<LookupTable>, Error>;

    /// Drops the cached entry for one culture, if the strategy supports
    /// invalidation at all.
    fn invalidate(&self, culture_name: &str);

    /// Drops every cached entry.
    fn invalidate_all(&self);
}

/// Eager provider: resolves every culture the source knows about once, at
/// construction, and never recomputes. Resource changes after warm-up are
/// not observed; invalidation is a no-op.
pub struct StaticCache<S: TableSource> {
    source: S,
    // Cultures requested after warm-up are built once and remembered, which
    // is why this is not a plain frozen map.
    tables: RwLock<HashMap<String, Arc<LookupTable>>>,
}

impl<S: TableSource> StaticCache<S> {
    /// Builds the provider and eagerly resolves all known cultures.
    pub fn new(source: S) -> Result<Self, Error> {
        let mut tables = HashMap::new();
        for culture in source.known_cultures() {
            let table = source.build(&culture)?;
            tables.insert(fold(&culture), Arc::new(table));
        }
        tracing::debug!(cultures = tables.len(), "static cache warmed");
        Ok(StaticCache {
            source,
            tables: RwLock::new(tables),
        })
    }
}

impl<S: TableSource> CacheProvider for StaticCache<S> {
    fn lookup_table(&self, culture_name: &str) -> Result<Arc<LookupTable>, Error> {
        let key = fold(culture_name);
        if let Some(table) = self.tables.read().expect("cache lock poisoned").get(&key) {
            return Ok(Arc::clone(table));
        }

        // First sight of a culture missing from warm-up; resolve it once.
        let table = Arc::new(self.source.build(culture_name)?);
        let mut tables = self.tables.write().expect("cache lock poisoned");
        Ok(Arc::clone(tables.entry(key).or_insert(table)))
    }

    fn invalidate(&self, _culture_name: &str) {}

    fn invalidate_all(&self) {}
}

// One lazily-built table. The mutex guarantees at most one in-flight build
// per culture; a failed build leaves `None` so the next request retries.
struct Slot {
    table: Mutex<Option<Arc<LookupTable>>>,
}

/// Lazy provider: a culture's table is built on first request, retained
/// until explicitly invalidated, and rebuilt on the next request after.
pub struct DynamicCache<S: TableSource> {
    source: S,
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl<S: TableSource> DynamicCache<S> {
    pub fn new(source: S) -> Self {
        DynamicCache {
            source,
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().expect("cache lock poisoned").get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().expect("cache lock poisoned");
        Arc::clone(slots.entry(key.to_string()).or_insert_with(|| {
            Arc::new(Slot {
                table: Mutex::new(None),
            })
        }))
    }
}

impl<S: TableSource> CacheProvider for DynamicCache<S> {
    fn lookup_table(&self, culture_name: &str) -> Result<Arc<LookupTable>, Error> {
        let slot = self.slot(&fold(culture_name));

        // Concurrent requesters for the same uncached culture serialize
        // here and reuse the winner's table instead of duplicating work.
        let mut table = slot.table.lock().expect("slot lock poisoned");
        if let Some(built) = table.as_ref() {
            return Ok(Arc::clone(built));
        }
        let built = Arc::new(self.source.build(culture_name)?);
        *table = Some(Arc::clone(&built));
        tracing::debug!(culture = %culture_name, entries = built.len(), "lookup table built");
        Ok(built)
    }

    fn invalidate(&self, culture_name: &str) {
        // Wholesale replacement: the slot is removed and the next request
        // creates a fresh one, so readers holding the old Arc are unaffected
        // and other cultures' entries stay untouched.
        let removed = self
            .slots
            .write()
            .expect("cache lock poisoned")
            .remove(&fold(culture_name));
        if removed.is_some() {
            tracing::debug!(culture = %culture_name, "lookup table invalidated");
        }
    }

    fn invalidate_all(&self) {
        self.slots.write().expect("cache lock poisoned").clear();
    }
}
