//! error
//!
//! The public error taxonomy and the translation from backend failures.
//!
//! # Translation
//!
//! [`translate`] is the single place where an [`AdapterError`] becomes an
//! [`Error`]. The mapping is total: every [`AdapterCode`] has a
//! destination, and codes without a specific meaning land in
//! [`Error::IoFailure`] with the raw backend code preserved.
//!
//! What a `NotFound` means depends on what the call addressed, so the
//! caller passes a [`Target`]:
//!
//! | code               | `Open(path)`         | `Init(path)`     | `Object(oid)`      |
//! |--------------------|----------------------|------------------|--------------------|
//! | `NotFound`         | `RepositoryNotFound` | `IoFailure`      | `ObjectNotFound`   |
//! | `Corrupt`          | `RepositoryCorrupt`  | `RepositoryCorrupt` | `RepositoryCorrupt` |
//! | `PermissionDenied` | `PermissionDenied`   | `PermissionDenied` | `PermissionDenied` |
//! | `Io` / `Unknown`   | `IoFailure`          | `IoFailure`      | `IoFailure`        |
//!
//! No error is ever retried: none of these conditions go away by asking
//! again.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::types::{Oid, TypeError};
use crate::git::{AdapterCode, AdapterError};

/// Result alias used across the public surface.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The path is not a repository.
    #[error("repository not found: {path}")]
    RepositoryNotFound {
        /// The path as given by the caller
        path: String,
    },

    /// Repository data could not be decoded.
    #[error("repository is corrupt: {message}")]
    RepositoryCorrupt {
        /// Backend diagnostic
        message: String,
    },

    /// The OS refused access.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Backend diagnostic
        message: String,
    },

    /// The object id does not resolve.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The id that was looked up
        oid: Oid,
    },

    /// Any other filesystem or backend failure.
    #[error("i/o failure (code {code}): {message}")]
    IoFailure {
        /// Raw backend error code
        code: i32,
        /// Backend diagnostic
        message: String,
    },

    /// The repository handle was closed before the operation ran.
    #[error("repository handle used after close")]
    UseAfterClose,

    /// An empty repository path was supplied.
    #[error("repository path cannot be empty")]
    InvalidPath,

    /// An object id failed validation.
    #[error(transparent)]
    InvalidOid(#[from] TypeError),

    /// The configuration file could not be read or is invalid.
    #[error("configuration error: {message}")]
    InvalidConfig {
        /// What was wrong with it
        message: String,
    },

    /// The operation never produced a result (worker panic or shutdown).
    #[error("operation aborted: {reason}")]
    OperationAborted {
        /// What went wrong
        reason: String,
    },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::InvalidConfig {
            message: err.to_string(),
        }
    }
}

/// What a failing adapter call was addressing.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Opening an existing repository at a path
    Open(&'a str),
    /// Creating a repository at a path
    Init(&'a str),
    /// Reading an object from an open repository
    Object(&'a Oid),
}

/// Normalize a backend failure into the public taxonomy.
pub fn translate(err: AdapterError, target: Target<'_>) -> Error {
    let AdapterError {
        code,
        raw_code,
        message,
    } = err;

    match code {
        AdapterCode::NotFound => match target {
            Target::Open(path) => Error::RepositoryNotFound {
                path: path.to_string(),
            },
            Target::Object(oid) => Error::ObjectNotFound { oid: oid.clone() },
            // A missing parent directory while creating is a filesystem problem.
            Target::Init(_) => Error::IoFailure {
                code: raw_code,
                message,
            },
        },
        AdapterCode::Corrupt => Error::RepositoryCorrupt { message },
        AdapterCode::PermissionDenied => Error::PermissionDenied { message },
        AdapterCode::Io | AdapterCode::Unknown => Error::IoFailure {
            code: raw_code,
            message,
        },
    }
}
