//! repository
//!
//! Repository handles and the session that creates them.
//!
//! # Architecture
//!
//! - [`Session`] opens and initializes repositories through the object store
//!   adapter, in blocking, callback or future style
//! - [`Repository`] exposes a repository's fixed identity (`path`, `bare`)
//!   and its queries; object lookups go through the handle's identity cache
//! - [`Object`] is the canonical, shared handle for one object id
//!
//! Each operation is written once as a closure and handed to the
//! dispatcher, which alone decides whether it runs inline or on a worker.
//! Asynchronous operations on one repository run in issue order through
//! that repository's lane.

mod handle;
mod object;
mod session;

pub use handle::{Repository, RepositoryState};
pub use object::Object;
pub use session::Session;
