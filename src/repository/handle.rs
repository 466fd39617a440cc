//! repository::handle
//!
//! The repository handle.
//!
//! # Lifecycle
//!
//! `Constructing -> Open -> Closed`. A [`Repository`] only comes into
//! existence after the backend reported success, so callers never observe
//! the constructing state; a failed open or init yields an error and
//! nothing else. [`Repository::close`] (or dropping the last clone)
//! releases the native handle. Operations on a closed handle fail with
//! [`Error::UseAfterClose`], including asynchronous ones that were queued
//! before the close but start after it.
//!
//! # Identity fields
//!
//! `path` and `bare` are fixed at construction and have no setters. `path`
//! is the exact string the caller passed, not a canonicalized form.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::IdentityCache;
use crate::core::types::{Oid, RepositoryId};
use crate::dispatch::{Completion, Dispatcher, Lane, Pending};
use crate::error::{translate, Error, Result, Target};
use crate::git::RawRepository;

use super::object::Object;

/// Observable state of a repository handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    Open,
    Closed,
}

/// A handle on an opened or newly created repository.
///
/// Clones share the same native handle, identity cache and execution
/// lane.
///
/// # Example
///
/// ```no_run
/// use gitteh::Session;
/// use gitteh::core::types::Oid;
///
/// let session = Session::with_defaults()?;
/// let repo = session.open("/srv/git/project.git")?;
///
/// let oid: Oid = "ce013625030ba8dba906f756967f9e9ca394464a".parse()?;
/// if repo.exists(&oid)? {
///     let blob = repo.object(&oid)?;
///     println!("{} bytes", blob.size());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Repository {
    shared: Arc<Shared>,
}

struct Shared {
    id: RepositoryId,
    path: String,
    bare: bool,
    raw: Mutex<Option<Box<dyn RawRepository>>>,
    cache: IdentityCache<Object>,
    lane: Arc<Lane>,
    dispatcher: Dispatcher,
}

impl Repository {
    pub(crate) fn new(
        dispatcher: Dispatcher,
        path: String,
        bare: bool,
        raw: Box<dyn RawRepository>,
    ) -> Self {
        let id = RepositoryId::new();
        tracing::debug!(repo = %id, %path, bare, "repository opened");

        Self {
            shared: Arc::new(Shared {
                id,
                lane: Lane::new(format!("repo-{}", id)),
                path,
                bare,
                raw: Mutex::new(Some(raw)),
                cache: IdentityCache::new(id),
                dispatcher,
            }),
        }
    }

    /// In-process identity of this handle.
    pub fn id(&self) -> RepositoryId {
        self.shared.id
    }

    /// The path exactly as passed to open or init.
    pub fn path(&self) -> &str {
        &self.shared.path
    }

    /// Whether the repository has no working tree.
    pub fn is_bare(&self) -> bool {
        self.shared.bare
    }

    pub fn state(&self) -> RepositoryState {
        if self.shared.raw().is_some() {
            RepositoryState::Open
        } else {
            RepositoryState::Closed
        }
    }

    /// Number of objects currently held in the identity cache.
    pub fn cached_objects(&self) -> usize {
        self.shared.cache.live_count()
    }

    // =========================================================================
    // Existence checks
    // =========================================================================

    /// Check whether `oid` resolves in the object database, blocking.
    ///
    /// Existence checks never touch the identity cache.
    pub fn exists(&self, oid: &Oid) -> Result<bool> {
        self.shared.dispatcher.run_sync(|| self.shared.exists(oid))
    }

    /// Check whether `oid` resolves, delivering the answer to `completion`.
    pub fn exists_with(
        &self,
        oid: &Oid,
        completion: impl FnOnce(Result<bool>) + Send + 'static,
    ) {
        let (shared, oid) = (Arc::clone(&self.shared), oid.clone());
        self.shared.dispatcher.run_async(
            Some(&self.shared.lane),
            move || shared.exists(&oid),
            Completion::callback(completion),
        );
    }

    /// Check whether `oid` resolves, as a future.
    pub fn exists_async(&self, oid: &Oid) -> Pending<bool> {
        let (shared, oid) = (Arc::clone(&self.shared), oid.clone());
        self.shared
            .dispatcher
            .spawn(Some(&self.shared.lane), move || shared.exists(&oid))
    }

    // =========================================================================
    // Object lookup
    // =========================================================================

    /// Look up an object, blocking.
    ///
    /// Returns the canonical handle for `oid`: while the returned `Arc` (or
    /// any clone of it) is alive, every lookup of `oid` through this
    /// repository returns the same instance.
    ///
    /// # Errors
    ///
    /// - [`Error::ObjectNotFound`] if the id does not resolve
    /// - [`Error::UseAfterClose`] if the handle was closed
    pub fn object(&self, oid: &Oid) -> Result<Arc<Object>> {
        self.shared.dispatcher.run_sync(|| self.shared.object(oid))
    }

    /// Look up an object, delivering the handle to `completion`.
    pub fn object_with(
        &self,
        oid: &Oid,
        completion: impl FnOnce(Result<Arc<Object>>) + Send + 'static,
    ) {
        let (shared, oid) = (Arc::clone(&self.shared), oid.clone());
        self.shared.dispatcher.run_async(
            Some(&self.shared.lane),
            move || shared.object(&oid),
            Completion::callback(completion),
        );
    }

    /// Look up an object, as a future.
    pub fn object_async(&self, oid: &Oid) -> Pending<Arc<Object>> {
        let (shared, oid) = (Arc::clone(&self.shared), oid.clone());
        self.shared
            .dispatcher
            .spawn(Some(&self.shared.lane), move || shared.object(&oid))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the native handle and empty the identity cache.
    ///
    /// Idempotent. Affects every clone of this handle. Object handles
    /// already returned stay readable.
    pub fn close(&self) {
        let released = self.shared.raw().take();
        if released.is_some() {
            self.shared.cache.clear();
            tracing::debug!(repo = %self.shared.id, "repository closed");
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.shared.id)
            .field("path", &self.shared.path)
            .field("bare", &self.shared.bare)
            .field("state", &self.state())
            .finish()
    }
}

impl Shared {
    fn raw(&self) -> MutexGuard<'_, Option<Box<dyn RawRepository>>> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the native handle, holding it exclusively.
    fn with_raw<T>(&self, f: impl FnOnce(&dyn RawRepository) -> Result<T>) -> Result<T> {
        let guard = self.raw();
        let raw = guard.as_deref().ok_or(Error::UseAfterClose)?;
        f(raw)
    }

    fn exists(&self, oid: &Oid) -> Result<bool> {
        self.with_raw(|raw| {
            raw.exists(oid)
                .map_err(|e| translate(e, Target::Object(oid)))
        })
    }

    fn object(&self, oid: &Oid) -> Result<Arc<Object>> {
        // A closed handle must not hand out objects, cached or not.
        if self.raw().is_none() {
            return Err(Error::UseAfterClose);
        }

        self.cache.get_or_create(oid, || {
            let raw = self.with_raw(|raw| {
                raw.lookup_object(oid)
                    .map_err(|e| translate(e, Target::Object(oid)))
            })?;
            Ok(Object::from_raw(raw))
        })
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let open = self
            .raw
            .get_mut()
            .map(|raw| raw.is_some())
            .unwrap_or(false);
        if open {
            tracing::debug!(repo = %self.id, "repository released");
        }
    }
}
