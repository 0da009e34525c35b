//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the configuration
//! from the configuration file (~/.config/oracle/config.toml).

use oracle_core::config::OracleConfig;
use oracle_core::error::{OracleError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const CONFIG_DIR: &str = "oracle";
const CONFIG_FILE: &str = "config.toml";

/// Configuration service that loads and caches the configuration.
///
/// A missing file yields the default configuration; a malformed one is an
/// error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<OracleConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the platform config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::default_path()?))
    }

    /// Creates a service reading from an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// `<config dir>/oracle/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or_else(|| OracleError::config("could not determine the config directory"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<OracleConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| OracleError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load()?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| OracleError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save(&self, config: &OracleConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(config)?)?;
        self.invalidate_cache();
        tracing::debug!("[ConfigService] saved {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<OracleConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                self.path.display()
            );
            return Ok(OracleConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] loaded {}", self.path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::config::ReplyOrdering;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), OracleConfig::default());
    }

    #[test]
    fn test_save_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("nested/config.toml"));

        let mut config = OracleConfig::default();
        config.agent.reply_timeout_ms = Some(8000);
        config.replies.ordering = ReplyOrdering::LastWriteWins;
        service.save(&config).unwrap();

        assert_eq!(service.get_config().unwrap(), config);
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(&path);
        assert_eq!(service.get_config().unwrap().agent.reply_timeout_ms, None);

        std::fs::write(&path, "[agent]\nreply_timeout_ms = 500\n").unwrap();
        assert_eq!(service.get_config().unwrap().agent.reply_timeout_ms, None);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().agent.reply_timeout_ms, Some(500));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[agent\nbroken").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, OracleError::Serialization { .. }));
    }
}
