//! git::store
//!
//! The object-store seam: what the access layer needs from a backend.
//!
//! Everything here is blocking. A [`RawRepository`] is `Send` but not
//! `Sync`; callers must never touch one from two threads at once. The
//! repository handle keeps it behind a mutex and the dispatcher serializes
//! jobs per repository on top of that.

use thiserror::Error;

use crate::core::types::{ObjectKind, Oid};

/// Failure categories a backend reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterCode {
    /// The repository or object does not exist.
    NotFound,
    /// On-disk data could not be decoded.
    Corrupt,
    /// The OS refused access.
    PermissionDenied,
    /// Any other filesystem-level failure.
    Io,
    /// A code the backend did not classify.
    Unknown,
}

/// An error reported by an object-store backend.
///
/// The raw backend code and message are kept so the translated error can
/// still be diagnosed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (code {raw_code})")]
pub struct AdapterError {
    pub code: AdapterCode,
    pub raw_code: i32,
    pub message: String,
}

impl AdapterError {
    pub fn new(code: AdapterCode, raw_code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            raw_code,
            message: message.into(),
        }
    }
}

/// Raw object contents as read from the object database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub oid: Oid,
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

/// A backend able to open and create repositories.
pub trait ObjectStore: Send + Sync {
    /// Open an existing repository. Performs no mutation.
    fn open(&self, path: &str) -> Result<Box<dyn RawRepository>, AdapterError>;

    /// Create a repository at `path`, bare or with a working tree.
    fn init(&self, path: &str, bare: bool) -> Result<Box<dyn RawRepository>, AdapterError>;
}

/// A native repository resource.
pub trait RawRepository: Send + std::fmt::Debug {
    /// Whether the repository has no working tree.
    fn is_bare(&self) -> bool;

    /// Whether `oid` resolves in the object database.
    fn exists(&self, oid: &Oid) -> Result<bool, AdapterError>;

    /// Read an object's kind and contents.
    fn lookup_object(&self, oid: &Oid) -> Result<RawObject, AdapterError>;
}
