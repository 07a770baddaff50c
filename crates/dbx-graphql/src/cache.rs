//! Memoized client-schema construction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::introspection::IntrospectionResult;
use crate::schema::{ClientSchema, SchemaBuildError};

type Slot = Option<(Arc<IntrospectionResult>, Arc<ClientSchema>)>;

/// Single-slot schema cache keyed by the identity of the introspection
/// result.
///
/// Two structurally equal results held in different `Arc`s are different
/// keys. The slot keeps its key alive, so a pointer can never be reused by a
/// new allocation while it is cached.
#[derive(Debug, Default)]
pub struct SchemaCache {
    slot: Mutex<Slot>,
    hits: AtomicU64,
    builds: AtomicU64,
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCacheStats {
    /// Lookups answered from the slot.
    pub hits: u64,
    /// Successful builds.
    pub builds: u64,
}

impl SchemaCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the schema for `result`, building it on a miss.
    ///
    /// `None` in, `None` out. A failed build leaves the previous entry in
    /// place.
    pub fn get(
        &self,
        result: Option<&Arc<IntrospectionResult>>,
    ) -> Result<Option<Arc<ClientSchema>>, SchemaBuildError> {
        let Some(result) = result else {
            return Ok(None);
        };

        let mut slot = self.slot.lock();
        if let Some((key, schema)) = slot.as_ref() {
            if Arc::ptr_eq(key, result) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(Arc::clone(schema)));
            }
        }

        let schema = Arc::new(ClientSchema::from_introspection(result)?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(types = schema.types().len(), "built client schema");
        *slot = Some((Arc::clone(result), Arc::clone(&schema)));
        Ok(Some(schema))
    }

    /// Drop the cached entry.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Snapshot the counters.
    #[must_use]
    pub fn stats(&self) -> SchemaCacheStats {
        SchemaCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
        }
    }
}
