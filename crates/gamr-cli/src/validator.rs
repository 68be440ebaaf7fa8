//! Configuration validation for GAMR.
//!
//! Checks the application and scoring configuration up front so that scoring
//! commands never start with an unusable profile or rule table.

use crate::config::AppConfig;
use colored::Colorize;
use gamr_core::config::parse_scoring_config;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Errors that make the configuration unusable.
    pub errors: Vec<String>,
    /// Warnings that should be addressed but don't block scoring.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a new empty validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

/// Validates application configuration before scoring.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the application configuration and the scoring file it
    /// points at.
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_logging(config, &mut result);
        Self::validate_scoring(config, &mut result);

        result
    }

    /// Validates the log level name.
    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        if config.logging.level.parse::<tracing::Level>().is_err() {
            result.add_error(format!(
                "Invalid log level '{}'. Expected one of: trace, debug, info, warn, error",
                config.logging.level
            ));
        }
    }

    /// Validates the scoring configuration file exists, parses, and is
    /// consistent.
    fn validate_scoring(config: &AppConfig, result: &mut ValidationResult) {
        let Some(path) = config.scoring_config_path() else {
            result.add_warning(
                "No scoring_config set. All tenants score with the default scales \
                 (probability 1-3, vulnerability 1-4, impact 1-5) in raw mode, \
                 where CRITICAL is unreachable, and no suggestions are available.",
            );
            return;
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                result.add_error(format!(
                    "Failed to read scoring config '{}': {}",
                    path.display(),
                    e
                ));
                return;
            }
        };

        match parse_scoring_config(&contents) {
            Ok(scoring) => {
                for warning in scoring.warnings() {
                    result.add_warning(warning);
                }
                if scoring.profile(&config.default_tenant).is_none()
                    && config.default_tenant != gamr_core::knowledge::DEFAULT_TENANT
                {
                    result.add_warning(format!(
                        "Default tenant '{}' has no scoring profile; defaults will be used",
                        config.default_tenant
                    ));
                }
            }
            Err(e) => {
                result.add_error(format!(
                    "Invalid scoring config '{}': {}",
                    path.display(),
                    e
                ));
            }
        }
    }
}
