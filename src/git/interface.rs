//! git::interface
//!
//! Object-store backend implemented with git2.
//!
//! This is the **only** module that imports `git2`. Every libgit2 failure
//! is classified into an [`AdapterCode`] here, keeping the raw code and
//! message, so nothing above this layer has to know libgit2's error model.
//!
//! # Example
//!
//! ```no_run
//! use gitteh::git::{Git2Store, ObjectStore};
//!
//! let store = Git2Store::new();
//! let repo = store.open("/srv/git/project.git").unwrap();
//! assert!(repo.is_bare());
//! ```

use crate::core::types::{ObjectKind, Oid};

use super::store::{AdapterCode, AdapterError, ObjectStore, RawObject, RawRepository};

/// The production backend: libgit2 through the `git2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Store;

impl Git2Store {
    pub fn new() -> Self {
        Self
    }
}

impl ObjectStore for Git2Store {
    /// Open the repository at exactly `path`.
    ///
    /// Unlike discovery, parent directories are not searched: `path` must be
    /// the repository's git directory or its working tree root.
    fn open(&self, path: &str) -> Result<Box<dyn RawRepository>, AdapterError> {
        let repo = git2::Repository::open(path).map_err(|e| classify(&e))?;
        Ok(Box::new(Git2Repository { repo }))
    }

    fn init(&self, path: &str, bare: bool) -> Result<Box<dyn RawRepository>, AdapterError> {
        let repo = if bare {
            git2::Repository::init_bare(path)
        } else {
            git2::Repository::init(path)
        }
        .map_err(|e| classify(&e))?;

        Ok(Box::new(Git2Repository { repo }))
    }
}

/// A libgit2 repository handle.
struct Git2Repository {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git2Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git2Repository")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl RawRepository for Git2Repository {
    fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    fn exists(&self, oid: &Oid) -> Result<bool, AdapterError> {
        // An id this build of libgit2 cannot represent cannot be stored either.
        let Ok(git_oid) = git2::Oid::from_str(oid.as_str()) else {
            return Ok(false);
        };

        let odb = self.repo.odb().map_err(|e| classify(&e))?;
        Ok(odb.exists(git_oid))
    }

    fn lookup_object(&self, oid: &Oid) -> Result<RawObject, AdapterError> {
        let git_oid = git2::Oid::from_str(oid.as_str()).map_err(|e| {
            AdapterError::new(AdapterCode::NotFound, e.raw_code(), e.message())
        })?;

        let odb = self.repo.odb().map_err(|e| classify(&e))?;
        let object = odb.read(git_oid).map_err(|e| classify(&e))?;

        let kind = match object.kind() {
            git2::ObjectType::Commit => ObjectKind::Commit,
            git2::ObjectType::Tree => ObjectKind::Tree,
            git2::ObjectType::Blob => ObjectKind::Blob,
            git2::ObjectType::Tag => ObjectKind::Tag,
            git2::ObjectType::Any => {
                return Err(AdapterError::new(
                    AdapterCode::Corrupt,
                    -1,
                    format!("object {} has no concrete type", oid),
                ))
            }
        };

        Ok(RawObject {
            oid: oid.clone(),
            kind,
            data: object.data().to_vec(),
        })
    }
}

/// Classify a git2 error, keeping its raw code and message.
fn classify(err: &git2::Error) -> AdapterError {
    AdapterError::new(code_for(err), err.raw_code(), err.message())
}

fn code_for(err: &git2::Error) -> AdapterCode {
    use git2::{ErrorClass, ErrorCode};

    if err.code() == ErrorCode::NotFound {
        return AdapterCode::NotFound;
    }

    // libgit2 reports EACCES as a generic OS error; the message is the only
    // place the errno survives.
    if err.message().to_ascii_lowercase().contains("permission denied") {
        return AdapterCode::PermissionDenied;
    }

    match err.class() {
        ErrorClass::Zlib
        | ErrorClass::Odb
        | ErrorClass::Object
        | ErrorClass::Index
        | ErrorClass::Config
        | ErrorClass::Repository => AdapterCode::Corrupt,
        ErrorClass::Os => AdapterCode::Io,
        _ => AdapterCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_str(dir: &TempDir) -> String {
        dir.path().to_str().unwrap().to_string()
    }

    #[test]
    fn open_missing_is_not_found() {
        let err = Git2Store::new().open("/no/git/repo/here/").unwrap_err();
        assert_eq!(err.code, AdapterCode::NotFound);
    }

    #[test]
    fn open_plain_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Git2Store::new().open(&path_str(&dir)).unwrap_err();
        assert_eq!(err.code, AdapterCode::NotFound);
    }

    #[test]
    fn init_bare_then_open() {
        let dir = TempDir::new().unwrap();
        let store = Git2Store::new();

        let created = store.init(&path_str(&dir), true).unwrap();
        assert!(created.is_bare());

        let opened = store.open(&path_str(&dir)).unwrap();
        assert!(opened.is_bare());
        assert!(format!("{:?}", opened).starts_with("Git2Repository"));
    }

    #[test]
    fn init_with_worktree_is_not_bare() {
        let dir = TempDir::new().unwrap();
        let repo = Git2Store::new().init(&path_str(&dir), false).unwrap();
        assert!(!repo.is_bare());
    }

    #[test]
    fn blob_exists_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let native = git2::Repository::init_bare(dir.path()).unwrap();
        let blob = native.blob(b"hello\n").unwrap();
        drop(native);

        let repo = Git2Store::new().open(&path_str(&dir)).unwrap();
        let oid = Oid::new(blob.to_string()).unwrap();

        assert!(repo.exists(&oid).unwrap());
        let raw = repo.lookup_object(&oid).unwrap();
        assert_eq!(raw.kind, ObjectKind::Blob);
        assert_eq!(raw.data, b"hello\n");
    }

    #[test]
    fn missing_object() {
        let dir = TempDir::new().unwrap();
        let repo = Git2Store::new().init(&path_str(&dir), true).unwrap();
        let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();

        assert!(!repo.exists(&oid).unwrap());
        let err = repo.lookup_object(&oid).unwrap_err();
        assert_eq!(err.code, AdapterCode::NotFound);
    }

    #[test]
    fn unrepresentable_oid_does_not_exist() {
        let dir = TempDir::new().unwrap();
        let repo = Git2Store::new().init(&path_str(&dir), true).unwrap();
        let sha256 =
            Oid::new("abc123def4567890abc123def4567890abc123def4567890abc123def456789a").unwrap();

        assert!(!repo.exists(&sha256).unwrap());
        assert_eq!(
            repo.lookup_object(&sha256).unwrap_err().code,
            AdapterCode::NotFound
        );
    }
}
