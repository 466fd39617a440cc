//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. `$GITTEH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitteh/config.toml`
//! 3. `~/.gitteh/config.toml`
//!
//! Missing files are not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use gitteh::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("workers: {}", config.workers());
//! ```

pub mod schema;

pub use schema::{ConfigFile, DispatchConfig};

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 4;

/// Default worker thread name.
pub const DEFAULT_THREAD_NAME: &str = "gitteh-worker";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: ConfigFile,
    /// Path the file was loaded from (if any)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate(|key| std::env::var_os(key), dirs::home_dir()) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            loaded_from: None,
        })
    }

    /// Find the first existing config file.
    fn locate(
        env: impl Fn(&str) -> Option<OsString>,
        home: Option<PathBuf>,
    ) -> Option<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(path) = env("GITTEH_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("gitteh/config.toml"));
        }
        if let Some(home) = home {
            candidates.push(home.join(".gitteh/config.toml"));
        }

        candidates.into_iter().find(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Size of the worker pool.
    ///
    /// Defaults to [`DEFAULT_WORKERS`] if not configured.
    pub fn workers(&self) -> usize {
        self.file
            .dispatch
            .as_ref()
            .and_then(|d| d.workers)
            .unwrap_or(DEFAULT_WORKERS)
    }

    /// Name given to worker threads.
    ///
    /// Defaults to [`DEFAULT_THREAD_NAME`] if not configured.
    pub fn thread_name(&self) -> &str {
        self.file
            .dispatch
            .as_ref()
            .and_then(|d| d.thread_name.as_deref())
            .unwrap_or(DEFAULT_THREAD_NAME)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.workers(), DEFAULT_WORKERS);
        assert_eq!(config.thread_name(), DEFAULT_THREAD_NAME);
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [dispatch]
            workers = 2
            thread_name = "odb"
            "#,
        )
        .unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.workers(), 2);
        assert_eq!(config.thread_name(), "odb");
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::from_path(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let result = Config::parse(
            r#"
            [dispatch]
            workers = 2
            unknown_field = true
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_workers_rejected() {
        let result = Config::parse("[dispatch]\nworkers = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn locate_prefers_env_override() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("explicit.toml");
        fs::write(&explicit, "").unwrap();
        let home = temp.path().join("home");
        fs::create_dir_all(home.join(".gitteh")).unwrap();
        fs::write(home.join(".gitteh/config.toml"), "").unwrap();

        let env_path = explicit.clone();
        let found = Config::locate(
            |key| (key == "GITTEH_CONFIG").then(|| env_path.clone().into_os_string()),
            Some(home),
        );
        assert_eq!(found, Some(explicit));
    }

    #[test]
    fn locate_falls_back_to_home() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().to_path_buf();
        fs::create_dir_all(home.join(".gitteh")).unwrap();
        fs::write(home.join(".gitteh/config.toml"), "").unwrap();

        let found = Config::locate(|_| None, Some(home.clone()));
        assert_eq!(found, Some(home.join(".gitteh/config.toml")));
    }

    #[test]
    fn locate_skips_missing_files() {
        let temp = TempDir::new().unwrap();
        let found = Config::locate(
            |key| (key == "GITTEH_CONFIG").then(|| temp.path().join("nope.toml").into_os_string()),
            Some(temp.path().to_path_buf()),
        );
        assert!(found.is_none());
    }
}
