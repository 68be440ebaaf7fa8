//! Per-tenant scoring profiles.
//!
//! Tenants define their own rating label sets, so each one carries the axis
//! scales and scoring mode its risk sheets are evaluated with.
//!
//! # Example
//!
//! ```rust
//! use gamr_core::tenant::TenantProfile;
//! use gamr_core::{Priority, RiskInput};
//!
//! let profile = TenantProfile::new("acme-corp", "Acme Corporation").unwrap();
//! let engine = profile.engine().unwrap();
//!
//! let assessment = engine.assess(&RiskInput::new(3, 4, 5)).unwrap();
//! assert_eq!(assessment.priority, Priority::High);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ScoringError;
use crate::risk::{RiskScoringEngine, ScoringMode};
use crate::scale::RiskScales;

/// Errors that can occur when building a tenant profile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TenantError {
    /// Slug validation failed.
    #[error("Invalid tenant slug: {0}")]
    InvalidSlug(String),

    /// The profile's scales cannot be scored with.
    #[error("Invalid scoring profile for tenant '{slug}': {source}")]
    InvalidScoring {
        slug: String,
        #[source]
        source: ScoringError,
    },
}

/// Validates a tenant slug according to the following rules:
/// - Lowercase alphanumeric characters and hyphens only
/// - Must be 3-63 characters long
/// - Must start with a letter
/// - Cannot end with a hyphen
/// - No consecutive hyphens
pub fn validate_slug(slug: &str) -> Result<(), TenantError> {
    if slug.len() < 3 || slug.len() > 63 {
        return Err(TenantError::InvalidSlug(format!(
            "Slug must be between 3 and 63 characters, got {}",
            slug.len()
        )));
    }

    if !slug.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(TenantError::InvalidSlug(
            "Slug must start with a lowercase letter".to_string(),
        ));
    }

    if slug.ends_with('-') {
        return Err(TenantError::InvalidSlug(
            "Slug cannot end with a hyphen".to_string(),
        ));
    }

    let mut prev_hyphen = false;
    for ch in slug.chars() {
        if ch == '-' {
            if prev_hyphen {
                return Err(TenantError::InvalidSlug(
                    "Slug cannot contain consecutive hyphens".to_string(),
                ));
            }
            prev_hyphen = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            prev_hyphen = false;
        } else {
            return Err(TenantError::InvalidSlug(format!(
                "Slug contains invalid character '{}'. Only lowercase letters, digits, and hyphens are allowed",
                ch
            )));
        }
    }

    Ok(())
}

/// Scoring configuration for a single tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantProfile {
    /// URL-safe tenant identifier.
    pub slug: String,
    /// Display name of the organization.
    pub name: String,
    /// Axis bounds for this tenant's label sets.
    #[serde(default)]
    pub scales: RiskScales,
    /// Whether thresholds apply to raw or normalized scores.
    #[serde(default)]
    pub mode: ScoringMode,
}

impl TenantProfile {
    /// Creates a profile with the default scales and raw scoring.
    pub fn new(slug: &str, name: &str) -> Result<Self, TenantError> {
        validate_slug(slug)?;
        Ok(Self {
            slug: slug.to_string(),
            name: name.to_string(),
            scales: RiskScales::default(),
            mode: ScoringMode::default(),
        })
    }

    pub fn with_scales(mut self, scales: RiskScales) -> Self {
        self.scales = scales;
        self
    }

    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validates the slug and scales.
    pub fn validate(&self) -> Result<(), TenantError> {
        validate_slug(&self.slug)?;
        self.scales
            .validate()
            .map_err(|source| TenantError::InvalidScoring {
                slug: self.slug.clone(),
                source,
            })
    }

    /// Builds the scoring engine for this tenant.
    pub fn engine(&self) -> Result<RiskScoringEngine, TenantError> {
        RiskScoringEngine::new(self.scales, self.mode).map_err(|source| {
            TenantError::InvalidScoring {
                slug: self.slug.clone(),
                source,
            }
        })
    }
}
