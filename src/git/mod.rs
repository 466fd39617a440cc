//! git
//!
//! Object store adapter.
//!
//! # Architecture
//!
//! This module is the **only doorway** to the native object store. The
//! [`ObjectStore`] and [`RawRepository`] traits describe the blocking calls
//! the access layer needs (`open`, `init`, `exists`, `lookup_object`);
//! [`Git2Store`] implements them over libgit2. No other module imports
//! `git2`.
//!
//! # Invariants
//!
//! - `open` never mutates anything on disk
//! - A `RawRepository` is only used from one thread at a time
//! - Every backend failure carries an [`AdapterCode`] plus its raw code

mod interface;
mod store;

pub use interface::Git2Store;
pub use store::{AdapterCode, AdapterError, ObjectStore, RawObject, RawRepository};
