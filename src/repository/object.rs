//! repository::object
//!
//! Object handles produced by repository lookups.

use crate::core::types::{ObjectKind, Oid};
use crate::git::RawObject;

/// An object read from a repository's object database.
///
/// Objects are only built by [`Repository::object`](super::Repository::object),
/// which routes through the repository's identity cache: while any caller
/// holds an `Arc<Object>`, looking the same id up again on the same
/// repository returns that very `Arc`.
#[derive(Debug, PartialEq, Eq)]
pub struct Object {
    oid: Oid,
    kind: ObjectKind,
    data: Vec<u8>,
}

impl Object {
    pub(crate) fn from_raw(raw: RawObject) -> Self {
        Self {
            oid: raw.oid,
            kind: raw.kind,
            data: raw.data,
        }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// The object's uncompressed contents, without the git header.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Contents as UTF-8, if they are valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}
