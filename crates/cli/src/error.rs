//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Every configured sensor failed to build
    #[error("All {count} sensors are degraded, nothing to sample")]
    AllSensorsDegraded { count: usize },

    /// Graceful shutdown error
    #[error("Error during shutdown: {message}")]
    Shutdown { message: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }
}

/// Fail with [`CliError::ConfigNotFound`] when `path` does not exist
pub fn ensure_config_exists(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config_not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ensure_config_exists(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Configuration file not found"));
    }

    #[test]
    fn test_existing_config_accepted() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_config_exists(file.path()).is_ok());
    }
}
