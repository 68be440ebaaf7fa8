//! YAML configuration loader for tenant scoring profiles and the suggestion
//! knowledge base.
//!
//! The file is read once at startup, environment references of the form
//! `${VAR_NAME}` are substituted, and the result is validated before use.

use std::collections::HashSet;
use std::env;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::knowledge::{KnowledgeBase, KnowledgeError, DEFAULT_TENANT};
use crate::risk::{Priority, RiskScoringEngine};
use crate::scale::RiskScales;
use crate::tenant::{TenantError, TenantProfile};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Tenant(#[from] TenantError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Top-level scoring configuration matching the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Per-tenant scales and modes.
    #[serde(default)]
    pub tenants: Vec<TenantProfile>,
    /// Suggestion rules keyed tenant -> sector.
    #[serde(default)]
    pub knowledge_base: KnowledgeBase,
}

impl ScoringConfig {
    /// Returns the profile for `slug`, if configured.
    pub fn profile(&self, slug: &str) -> Option<&TenantProfile> {
        self.tenants.iter().find(|t| t.slug == slug)
    }

    /// Builds the engine for `slug`.
    ///
    /// Tenants without a profile score with the default scales in raw mode.
    pub fn engine_for(&self, slug: &str) -> Result<RiskScoringEngine, ConfigError> {
        match self.profile(slug) {
            Some(profile) => Ok(profile.engine()?),
            None => {
                debug!(tenant = slug, "No scoring profile, using defaults");
                Ok(RiskScoringEngine::default())
            }
        }
    }

    /// Validates profiles and the knowledge base.
    ///
    /// Each tenant's rules, plus the shared `default` rules, must be valid on
    /// that tenant's scales. Rule sets without a profile are checked against
    /// the default scales.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut slugs = HashSet::new();
        for profile in &self.tenants {
            profile.validate()?;
            if !slugs.insert(profile.slug.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate tenant profile '{}'",
                    profile.slug
                )));
            }
        }

        let kb = &self.knowledge_base;
        for profile in &self.tenants {
            kb.validate_tenant(&profile.slug, &profile.scales)?;
            kb.validate_tenant(DEFAULT_TENANT, &profile.scales)?;
        }

        let defaults = RiskScales::default();
        for tenant in kb.tenants.keys() {
            if !slugs.contains(tenant.as_str()) {
                kb.validate_tenant(tenant, &defaults)?;
            }
        }

        Ok(())
    }

    /// Describes configurations that load but cannot produce every tier.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for profile in &self.tenants {
            let Ok(engine) = profile.engine() else {
                continue;
            };
            let unreachable: Vec<&str> = Priority::ALL
                .iter()
                .filter(|p| !engine.can_reach(**p))
                .map(|p| p.as_str())
                .collect();
            if !unreachable.is_empty() {
                warnings.push(format!(
                    "Tenant '{}' scores in {} mode with a maximum of {}; unreachable priorities: {}",
                    profile.slug,
                    profile.mode,
                    profile.scales.max_score(),
                    unreachable.join(", ")
                ));
            }
        }

        if self.knowledge_base.tenants.is_empty() {
            warnings.push("Knowledge base is empty; no suggestions will be produced".to_string());
        }

        warnings
    }
}

/// Substitutes environment variables in a string.
///
/// Replaces patterns like `${VAR_NAME}` with the corresponding environment variable value.
/// Full-line YAML comments are left untouched, so a commented-out reference
/// never has to resolve. References in trailing comments are still substituted.
fn substitute_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
    let mut missing = Vec::new();
    let mut result = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }
        let replaced = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.push(var_name.to_string());
                    String::new()
                }
            }
        });
        result.push_str(&replaced);
    }

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    Ok(result)
}

/// Parses and validates configuration from a YAML string.
pub fn parse_scoring_config(content: &str) -> Result<ScoringConfig, ConfigError> {
    let content = substitute_env_vars(content)?;
    let config: ScoringConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    for warning in config.warnings() {
        warn!("{}", warning);
    }

    Ok(config)
}

/// Loads and parses the scoring configuration from a YAML file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use gamr_core::config::load_scoring_config;
///
/// let config = load_scoring_config(Path::new("config/scoring.yaml")).unwrap();
/// let engine = config.engine_for("acme-corp").unwrap();
/// ```
pub fn load_scoring_config(path: &Path) -> Result<ScoringConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_scoring_config(&content)?;

    info!(
        path = %path.display(),
        tenants = config.tenants.len(),
        rules = config.knowledge_base.rule_count(),
        "Loaded scoring configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{RiskInput, ScoringMode};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_yaml() -> &'static str {
        r#"
tenants:
  - slug: acme-corp
    name: Acme Corporation
  - slug: globex
    name: Globex
    mode: normalized
    scales:
      probability: { min: 1, max: 5 }
      vulnerability: { min: 1, max: 5 }
      impact: { min: 1, max: 5 }

knowledge_base:
  tenants:
    default:
      sectors:
        general:
          - name: no-backup
            keywords: ["no backup", "backups are not tested"]
            scenario: Data loss after ransomware
            suggested: { probability: 2, vulnerability: 3, impact: 5 }
            recommendation: Set up tested offsite backups
    globex:
      sectors:
        energy:
          - name: scada-exposed
            keywords: ["scada", "ics"]
            scenario: Industrial control compromise
            suggested: { probability: 4, vulnerability: 5, impact: 5 }
"#
    }

    #[test]
    fn test_parse_valid_config() {
        let config = parse_scoring_config(create_valid_yaml()).unwrap();
        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.knowledge_base.rule_count(), 2);

        let globex = config.profile("globex").unwrap();
        assert_eq!(globex.mode, ScoringMode::Normalized);
        assert_eq!(globex.scales.max_score(), 125);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_yaml().as_bytes()).unwrap();

        let config = load_scoring_config(file.path()).unwrap();
        assert!(config.profile("acme-corp").is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = load_scoring_config(Path::new("/nonexistent/scoring.yaml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_scoring_config("tenants: [unclosed");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_engine_for() {
        let config = parse_scoring_config(create_valid_yaml()).unwrap();

        let globex = config.engine_for("globex").unwrap();
        let assessment = globex.assess(&RiskInput::new(4, 5, 5)).unwrap();
        assert_eq!(assessment.risk_score.value(), 100);
        assert_eq!(assessment.priority, Priority::Critical);

        let unknown = config.engine_for("initech").unwrap();
        assert_eq!(unknown, RiskScoringEngine::default());
    }

    #[test]
    fn test_tenant_rule_must_fit_tenant_scales() {
        // scada-exposed is valid for globex (1-5) but would not be for acme.
        let yaml = create_valid_yaml().replace("    globex:\n      sectors:", "    acme-corp:\n      sectors:");
        let err = parse_scoring_config(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Knowledge(KnowledgeError::InvalidSuggestion { .. })
        ));
    }

    #[test]
    fn test_default_rules_checked_against_every_tenant() {
        let yaml = r#"
tenants:
  - slug: tiny
    name: Tiny
    scales:
      probability: { min: 1, max: 2 }
      vulnerability: { min: 1, max: 2 }
      impact: { min: 1, max: 2 }
knowledge_base:
  tenants:
    default:
      sectors:
        general:
          - name: too-severe
            keywords: ["outage"]
            scenario: Outage
            suggested: { probability: 3, vulnerability: 1, impact: 1 }
"#;
        assert!(matches!(
            parse_scoring_config(yaml).unwrap_err(),
            ConfigError::Knowledge(_)
        ));
    }

    #[test]
    fn test_duplicate_profile() {
        let yaml = r#"
tenants:
  - slug: acme
    name: Acme
  - slug: acme
    name: Acme again
"#;
        let err = parse_scoring_config(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate tenant profile 'acme'"));
    }

    #[test]
    fn test_invalid_slug() {
        let yaml = "tenants:\n  - slug: Bad_Slug\n    name: Bad\n";
        assert!(matches!(
            parse_scoring_config(yaml).unwrap_err(),
            ConfigError::Tenant(TenantError::InvalidSlug(_))
        ));
    }

    #[test]
    fn test_warnings_flag_unreachable_critical() {
        let config = parse_scoring_config(create_valid_yaml()).unwrap();
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("acme-corp"));
        assert!(warnings[0].contains("CRITICAL"));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = parse_scoring_config("{}").unwrap();
        assert!(config.tenants.is_empty());
        assert!(config
            .warnings()
            .iter()
            .any(|w| w.contains("Knowledge base is empty")));
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("GAMR_TEST_TENANT_NAME", "Substituted Corp");
        let yaml = "tenants:\n  - slug: subst\n    name: ${GAMR_TEST_TENANT_NAME}\n";
        let config = parse_scoring_config(yaml).unwrap();
        assert_eq!(config.tenants[0].name, "Substituted Corp");
    }

    #[test]
    fn test_missing_env_var() {
        let yaml = "tenants:\n  - slug: subst\n    name: ${GAMR_TEST_DOES_NOT_EXIST}\n";
        let err = parse_scoring_config(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound(ref v) if v == "GAMR_TEST_DOES_NOT_EXIST"));
    }

    #[test]
    fn test_commented_env_var_is_not_substituted() {
        let yaml = "# name: ${GAMR_TEST_COMMENTED_OUT}\ntenants:\n  - slug: plain\n    # was ${GAMR_TEST_COMMENTED_OUT}\n    name: Plain Corp\n";
        let config = parse_scoring_config(yaml).unwrap();
        assert_eq!(config.tenants[0].name, "Plain Corp");
    }
}
