//! Configuration loading for the GAMR CLI.

use anyhow::{Context, Result};
use gamr_core::config::{load_scoring_config, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the scoring configuration (tenant profiles and knowledge base).
    /// Relative paths resolve against the directory of this file.
    #[serde(default)]
    pub scoring_config: Option<PathBuf>,

    /// Tenant used when a command does not name one.
    #[serde(default = "default_tenant")]
    pub default_tenant: String,

    /// Sector used for suggestions when none is given.
    #[serde(default = "default_sector")]
    pub default_sector: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory the configuration was loaded from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_tenant() -> String {
    gamr_core::knowledge::DEFAULT_TENANT.to_string()
}

fn default_sector() -> String {
    gamr_core::knowledge::GENERAL_SECTOR.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring_config: None,
            default_tenant: default_tenant(),
            default_sector: default_sector(),
            logging: LoggingConfig::default(),
            base_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// Loads the configuration for a CLI run.
    ///
    /// An explicitly given path must load. Without one, the platform default
    /// path is used when it exists and built-in defaults otherwise; a default
    /// file that exists but fails to parse is still an error.
    pub fn resolve(explicit: Option<&Path>, default_path: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if default_path.exists() => Self::load(default_path),
            None => Ok(Self::default()),
        }
    }

    /// Returns the resolved scoring configuration path, if one is set.
    pub fn scoring_config_path(&self) -> Option<PathBuf> {
        let path = self.scoring_config.as_ref()?;
        if path.is_absolute() {
            return Some(path.clone());
        }
        Some(match &self.base_dir {
            Some(dir) => dir.join(path),
            None => path.clone(),
        })
    }

    /// Loads the scoring configuration, or the built-in defaults when no
    /// path is configured.
    pub fn load_scoring(&self) -> Result<ScoringConfig> {
        match self.scoring_config_path() {
            Some(path) => load_scoring_config(&path).with_context(|| {
                format!("Failed to load scoring config: {}", path.display())
            }),
            None => Ok(ScoringConfig::default()),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_tenant, "default");
        assert_eq!(config.default_sector, "general");
        assert_eq!(config.logging.level, "info");
        assert!(config.scoring_config_path().is_none());
        assert!(config.load_scoring().unwrap().tenants.is_empty());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
scoring_config: scoring.yaml
default_tenant: acme-corp
logging:
  level: debug
  json_format: true
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_tenant, "acme-corp");
        assert_eq!(config.default_sector, "general");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_relative_scoring_path_resolves_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let app_path = dir.path().join("config.yaml");
        std::fs::write(&app_path, "scoring_config: scoring.yaml\n").unwrap();

        let mut scoring = std::fs::File::create(dir.path().join("scoring.yaml")).unwrap();
        writeln!(scoring, "tenants:\n  - slug: acme\n    name: Acme").unwrap();

        let config = AppConfig::load(&app_path).unwrap();
        assert_eq!(
            config.scoring_config_path().unwrap(),
            dir.path().join("scoring.yaml")
        );
        let scoring = config.load_scoring().unwrap();
        assert!(scoring.profile("acme").is_some());
    }

    #[test]
    fn test_resolve_without_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(None, &dir.path().join("config.yaml")).unwrap();
        assert!(config.scoring_config.is_none());
        assert_eq!(config.default_tenant, "default");
    }

    #[test]
    fn test_resolve_rejects_malformed_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "logging: [oops\n").unwrap();

        let err = AppConfig::resolve(Some(&path), &dir.path().join("unused.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_resolve_rejects_missing_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = AppConfig::resolve(Some(&path), &path).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_resolve_rejects_malformed_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "default_tenant: [unclosed\n").unwrap();
        assert!(AppConfig::resolve(None, &path).is_err());
    }

    #[test]
    fn test_missing_scoring_file_is_an_error() {
        let config = AppConfig {
            scoring_config: Some(PathBuf::from("/nonexistent/scoring.yaml")),
            ..AppConfig::default()
        };
        let err = config.load_scoring().unwrap_err();
        assert!(err.to_string().contains("Failed to load scoring config"));
    }
}
