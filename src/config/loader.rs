//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::types::ResponderConfig;

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        // 1. Current directory: .knowledge-responder.toml
        search_paths.push(PathBuf::from(".knowledge-responder.toml"));

        // 2. User config directory: ~/.config/knowledge-responder/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("knowledge-responder").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or holds
    /// out-of-range values.
    pub fn load(&self) -> Result<ResponderConfig, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                let config = Self::load_from_path(path)?;
                validate(&config)?;
                return Ok(config);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(ResponderConfig::default())
    }

    /// Load configuration from a specific path.
    fn load_from_path(path: &Path) -> Result<ResponderConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the first config file that exists.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.exists()).cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject values the engine cannot use.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` naming the offending field.
pub fn validate(config: &ResponderConfig) -> Result<(), ConfigError> {
    let threshold = config.matcher.threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Invalid(format!(
            "matcher.threshold must be within 0.0..=1.0, got {threshold}"
        )));
    }
    if config.matcher.search_limit == 0 {
        return Err(ConfigError::Invalid(
            "matcher.search_limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::engine::FallbackPolicy;

    #[test]
    fn test_config_loader_default_paths() {
        let loader = ConfigLoader::new();
        assert!(!loader.search_paths().is_empty());
        assert!(loader.search_paths()[0].ends_with(".knowledge-responder.toml"));
    }

    #[test]
    fn test_config_loader_returns_defaults_when_no_file() {
        let loader = ConfigLoader::with_path(PathBuf::from("/nonexistent/path.toml"));
        let config = loader.load().unwrap();
        assert_eq!(config, ResponderConfig::default());
        assert!(loader.find_config_file().is_none());
    }

    #[test]
    fn test_config_loader_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [fallback]
            policy = "round_robin"
            seed = 42
            "#
        )
        .unwrap();

        let loader = ConfigLoader::with_path(file.path().to_path_buf());
        let config = loader.load().unwrap();
        assert_eq!(config.fallback.policy, FallbackPolicy::RoundRobin);
        assert_eq!(config.fallback.seed, Some(42));
        assert_eq!(loader.find_config_file(), Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[matcher\nthreshold = ").unwrap();

        let err = ConfigLoader::with_path(file.path().to_path_buf())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = ResponderConfig::default();
        config.matcher.threshold = 1.5;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));

        config.matcher.threshold = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_search_limit() {
        let mut config = ResponderConfig::default();
        config.matcher.search_limit = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("search_limit"));
    }
}
