//! Configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CageError, CageResult};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "sqlcage.toml";

/// Runtime configuration for the engine and CLI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database connection URL (`postgres://`, `mysql://`, `sqlite:`)
    pub database_url: Option<String>,

    /// Pool size
    pub max_connections: u32,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> CageResult<Self> {
        toml::from_str(text).map_err(|e| CageError::Config(e.to_string()))
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> CageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| CageError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Where configuration is looked for, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqlcage").join("config.toml"));
        }
        paths
    }

    /// Load the first configuration file found, or the defaults.
    pub fn load() -> CageResult<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Replace the database URL when one is given.
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.database_url = url;
        }
        self
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database URL
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Set the pool size
    pub fn max_connections(mut self, n: u32) -> Self {
        self.config.max_connections = n;
        self
    }

    /// Set the default log filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            database_url = "sqlite::memory:"
            max_connections = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Config::from_toml("max_connections = \"many\""),
            Err(CageError::Config(_))
        ));
    }

    #[test]
    fn test_override() {
        let config = Config::builder().database("postgres://a/b").build();
        let kept = config.clone().with_database_url(None);
        assert_eq!(kept.database_url.as_deref(), Some("postgres://a/b"));
        let replaced = config.with_database_url(Some("sqlite::memory:".into()));
        assert_eq!(replaced.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_search_paths_start_local() {
        assert_eq!(Config::search_paths()[0], PathBuf::from(LOCAL_CONFIG));
    }
}
