//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad worker count is
//! reported at load time instead of surfacing later as a runtime build
//! failure.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound on the worker pool size.
pub const MAX_WORKERS: usize = 256;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [dispatch]
/// workers = 8
/// thread_name = "gitteh-worker"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Worker pool settings
    pub dispatch: Option<DispatchConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dispatch) = &self.dispatch {
            dispatch.validate()?;
        }
        Ok(())
    }
}

/// Settings for the asynchronous worker pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Maximum number of worker threads running object-store calls
    pub workers: Option<usize>,

    /// Name given to worker threads
    pub thread_name: Option<String>,
}

impl DispatchConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(ConfigError::InvalidValue(format!(
                    "workers must be between 1 and {}, got {}",
                    MAX_WORKERS, workers
                )));
            }
        }

        if let Some(name) = &self.thread_name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "thread_name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_valid() {
        assert!(ConfigFile::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let config = DispatchConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn too_many_workers_rejected() {
        let config = DispatchConfig {
            workers: Some(MAX_WORKERS + 1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_thread_name_rejected() {
        let config = DispatchConfig {
            thread_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
