//! gitteh - repository handles over the git object store
//!
//! gitteh opens, creates and queries git repositories through a blocking
//! call style and a non-blocking one (callback or future), on top of
//! libgit2.
//!
//! # Architecture
//!
//! The codebase is layered, leaf first:
//!
//! - [`git`] - Object store adapter; the only module that talks to libgit2
//! - [`error`] - Public error taxonomy and translation of backend failures
//! - [`cache`] - Per-repository object identity cache
//! - [`dispatch`] - Inline vs worker-pool execution with per-repository
//!   ordering
//! - [`repository`] - Sessions, repository handles and object handles
//! - [`core`] - Strong types and configuration
//!
//! # Guarantees
//!
//! 1. A failed open or init never yields a handle
//! 2. A handle's `path` and `bare` never change after construction
//! 3. While an object handle is alive, looking its id up again on the same
//!    repository handle yields the same instance
//! 4. At most one backend call per repository runs at a time; asynchronous
//!    calls on one repository run in issue order
//! 5. Every asynchronous operation completes exactly once
//!
//! # Example
//!
//! ```no_run
//! use gitteh::Session;
//!
//! # async fn demo() -> gitteh::Result<()> {
//! let session = Session::with_defaults()?;
//!
//! let repo = session.init_async("/tmp/scratch.git/", true).await?;
//! assert_eq!(repo.path(), "/tmp/scratch.git/");
//! assert!(repo.is_bare());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod git;
pub mod repository;

pub use error::{Error, Result};
pub use repository::{Object, Repository, RepositoryState, Session};
