//! Shared fixtures for integration tests.
//!
//! Fixture repositories are built with git2 directly, so the tests do not
//! depend on a `git` binary being installed.

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use gitteh::core::types::Oid;
use gitteh::Session;

/// A bare repository with one commit: a tree holding `README` and `LICENSE`.
pub struct FixtureRepo {
    dir: TempDir,
    pub path: String,
    pub first_commit: Oid,
    pub tree: Oid,
    pub readme_blob: Oid,
}

impl FixtureRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = format!("{}/", dir.path().display());

        let repo = git2::Repository::init_bare(dir.path()).expect("init fixture");
        let readme = repo.blob(b"# Fixture\n").unwrap();
        let license = repo.blob(b"MIT\n").unwrap();

        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert("README", readme, 0o100644).unwrap();
        builder.insert("LICENSE", license, 0o100644).unwrap();
        let tree_id = builder.write().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = git2::Signature::new(
            "Test User",
            "test@example.com",
            &git2::Time::new(1_700_000_000, 0),
        )
        .unwrap();
        let commit = repo
            .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        Self {
            path,
            first_commit: oid(commit),
            tree: oid(tree_id),
            readme_blob: oid(readme),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

fn oid(id: git2::Oid) -> Oid {
    Oid::new(id.to_string()).unwrap()
}

/// An id that no fixture contains.
pub fn missing_oid() -> Oid {
    Oid::new("0123456789abcdef0123456789abcdef01234567").unwrap()
}

/// A session with a small pool, logging to the test writer.
pub fn session() -> Session {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = gitteh::core::config::Config::parse("[dispatch]\nworkers = 2\n").unwrap();
    Session::from_config(&config).unwrap()
}
