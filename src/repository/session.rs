//! repository::session
//!
//! Opening and creating repositories.
//!
//! A [`Session`] binds an object-store backend to a dispatcher. It is the
//! explicit context every repository operation is threaded through; there
//! is no process-wide default repository or registry.

use std::sync::Arc;

use crate::core::config::Config;
use crate::dispatch::{Completion, Dispatcher, Pending};
use crate::error::{translate, Error, Result, Target};
use crate::git::{Git2Store, ObjectStore};

use super::handle::Repository;

/// Entry point for opening and initializing repositories.
///
/// Cloning is cheap; clones share the backend and the worker pool.
///
/// # Example
///
/// ```no_run
/// use gitteh::Session;
///
/// let session = Session::with_defaults()?;
///
/// // Blocking
/// let repo = session.open("/srv/git/project.git")?;
/// assert!(repo.is_bare());
///
/// // Callback
/// session.open_with("/srv/git/project.git", |result| match result {
///     Ok(repo) => println!("opened {}", repo.path()),
///     Err(e) => eprintln!("error: {}", e),
/// });
/// # Ok::<(), gitteh::Error>(())
/// ```
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn ObjectStore>,
    dispatcher: Dispatcher,
}

impl Session {
    /// Bind `store` to `dispatcher`.
    pub fn new(store: Arc<dyn ObjectStore>, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// A libgit2-backed session with a pool sized from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(config)?;
        Ok(Self::new(Arc::new(Git2Store::new()), dispatcher))
    }

    /// A libgit2-backed session configured by [`Config::load`], which falls
    /// back to default settings when no configuration file exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a configuration file was found but
    /// could not be read or validated.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        tracing::debug!(loaded_from = ?config.loaded_from(), "session configured");
        Self::from_config(&config)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // =========================================================================
    // Open
    // =========================================================================

    /// Open an existing repository, blocking.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] if `path` is empty
    /// - [`Error::RepositoryNotFound`] if `path` is not a repository
    pub fn open(&self, path: &str) -> Result<Repository> {
        self.dispatcher.run_sync(self.open_op(path))
    }

    /// Open an existing repository, delivering the handle to `completion`.
    pub fn open_with(
        &self,
        path: &str,
        completion: impl FnOnce(Result<Repository>) + Send + 'static,
    ) {
        self.dispatcher
            .run_async(None, self.open_op(path), Completion::callback(completion));
    }

    /// Open an existing repository, as a future.
    pub fn open_async(&self, path: &str) -> Pending<Repository> {
        self.dispatcher.spawn(None, self.open_op(path))
    }

    fn open_op(&self, path: &str) -> impl FnOnce() -> Result<Repository> + Send + 'static {
        let (session, path) = (self.clone(), path.to_string());
        move || {
            if path.is_empty() {
                return Err(Error::InvalidPath);
            }

            let raw = session
                .store
                .open(&path)
                .map_err(|e| translate(e, Target::Open(&path)))?;
            let bare = raw.is_bare();

            Ok(Repository::new(session.dispatcher, path, bare, raw))
        }
    }

    // =========================================================================
    // Init
    // =========================================================================

    /// Create a repository, blocking.
    ///
    /// The handle's `is_bare()` reflects `bare` as requested.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] if `path` is empty
    /// - [`Error::PermissionDenied`] or [`Error::IoFailure`] if the layout
    ///   cannot be created
    pub fn init(&self, path: &str, bare: bool) -> Result<Repository> {
        self.dispatcher.run_sync(self.init_op(path, bare))
    }

    /// Create a repository, delivering the handle to `completion`.
    pub fn init_with(
        &self,
        path: &str,
        bare: bool,
        completion: impl FnOnce(Result<Repository>) + Send + 'static,
    ) {
        self.dispatcher.run_async(
            None,
            self.init_op(path, bare),
            Completion::callback(completion),
        );
    }

    /// Create a repository, as a future.
    pub fn init_async(&self, path: &str, bare: bool) -> Pending<Repository> {
        self.dispatcher.spawn(None, self.init_op(path, bare))
    }

    fn init_op(
        &self,
        path: &str,
        bare: bool,
    ) -> impl FnOnce() -> Result<Repository> + Send + 'static {
        let (session, path) = (self.clone(), path.to_string());
        move || {
            if path.is_empty() {
                return Err(Error::InvalidPath);
            }

            let raw = session
                .store
                .init(&path, bare)
                .map_err(|e| translate(e, Target::Init(&path)))?;

            Ok(Repository::new(session.dispatcher, path, bare, raw))
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
