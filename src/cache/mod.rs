//! cache
//!
//! Object identity cache: one live instance per object id.
//!
//! # Design
//!
//! Each repository handle owns one [`IdentityCache`]. Entries are held
//! weakly, so the cache never keeps an object alive on its own, but as long
//! as any caller still holds an object, looking its id up again yields that
//! same `Arc`.
//!
//! Construction is single-flight per key. Concurrent misses on the same id
//! queue on a per-key gate; the first one runs the factory and the rest
//! wake up to find its result. Misses on different ids do not contend.
//!
//! # Invariants
//!
//! - Two lookups of one id that overlap in liveness return pointer-equal
//!   handles
//! - A failed factory leaves no entry behind
//! - The factory must not look up the same id on the same cache (it would
//!   wait on its own gate)

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use weak_table::WeakValueHashMap;

use crate::core::types::{Oid, RepositoryId};

/// Per-repository map from object id to its canonical live handle.
pub struct IdentityCache<T> {
    owner: RepositoryId,
    entries: Mutex<WeakValueHashMap<Oid, Weak<T>>>,
    gates: Mutex<WeakValueHashMap<Oid, Weak<Mutex<()>>>>,
}

impl<T> IdentityCache<T> {
    /// Create an empty cache owned by the repository `owner`.
    pub fn new(owner: RepositoryId) -> Self {
        Self {
            owner,
            entries: Mutex::new(WeakValueHashMap::new()),
            gates: Mutex::new(WeakValueHashMap::new()),
        }
    }

    /// The repository this cache belongs to.
    pub fn owner(&self) -> RepositoryId {
        self.owner
    }

    /// Return the live handle for `oid`, if any.
    pub fn get(&self, oid: &Oid) -> Option<Arc<T>> {
        self.entries().get(oid)
    }

    /// Return the live handle for `oid`, constructing it with `factory` if
    /// there is none.
    ///
    /// `factory` runs at most once per miss, and never while another
    /// construction for the same id is in progress.
    ///
    /// # Errors
    ///
    /// Returns whatever `factory` fails with; nothing is cached in that case
    /// and the next lookup tries again.
    pub fn get_or_create<E>(
        &self,
        oid: &Oid,
        factory: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(hit) = self.get(oid) {
            tracing::trace!(repo = %self.owner, %oid, "identity cache hit");
            return Ok(hit);
        }

        let gate = self.gate(oid);
        let _turn = gate.lock().unwrap_or_else(PoisonError::into_inner);

        // Whoever held the gate before us may have just built it.
        if let Some(hit) = self.get(oid) {
            tracing::trace!(repo = %self.owner, %oid, "identity cache hit after wait");
            return Ok(hit);
        }

        let object = Arc::new(factory()?);
        self.entries().insert(oid.clone(), Arc::clone(&object));
        tracing::debug!(repo = %self.owner, %oid, "identity cache populated");

        Ok(object)
    }

    /// Number of entries whose object is still alive.
    pub fn live_count(&self) -> usize {
        let mut entries = self.entries();
        entries.remove_expired();
        entries.len()
    }

    /// Forget every entry. Outstanding handles stay valid but are no longer
    /// canonical.
    pub fn clear(&self) {
        *self.entries() = WeakValueHashMap::new();
    }

    fn gate(&self, oid: &Oid) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(gate) = gates.get(oid) {
            return gate;
        }
        let gate = Arc::new(Mutex::new(()));
        gates.insert(oid.clone(), Arc::clone(&gate));
        gate
    }

    fn entries(&self) -> MutexGuard<'_, WeakValueHashMap<Oid, Weak<T>>> {
        // No user code runs under this lock.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for IdentityCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("owner", &self.owner)
            .field("live", &self.live_count())
            .finish()
    }
}
