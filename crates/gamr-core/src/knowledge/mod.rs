//! Suggestion knowledge base.
//!
//! A typed rule table, keyed tenant -> sector -> rules, that proposes risk
//! ratings for free-text questionnaire answers. The table is loaded once at
//! startup (see [`crate::config`]) and is read-only afterwards.
//!
//! ## Lookup
//!
//! For a `(tenant, sector)` request the first rule list that exists among
//! the following is used:
//! 1. `tenant / sector`
//! 2. `tenant / general`
//! 3. `default / sector`
//! 4. `default / general`

mod matcher;

pub use matcher::{match_keywords, Suggestion};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ScoringError;
use crate::risk::RiskInput;
use crate::scale::RiskScales;

/// Tenant key whose rules apply to tenants without their own entry.
pub const DEFAULT_TENANT: &str = "default";
/// Sector key whose rules apply to sectors without their own entry.
pub const GENERAL_SECTOR: &str = "general";

/// Errors found while validating a knowledge base.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnowledgeError {
    #[error("Rule in {tenant}/{sector} has an empty name")]
    EmptyRuleName { tenant: String, sector: String },

    #[error("Duplicate rule '{rule}' in {tenant}/{sector}")]
    DuplicateRule {
        tenant: String,
        sector: String,
        rule: String,
    },

    #[error("Rule '{rule}' in {tenant}/{sector} has no keywords")]
    NoKeywords {
        tenant: String,
        sector: String,
        rule: String,
    },

    #[error("Rule '{rule}' in {tenant}/{sector} suggests an invalid rating: {source}")]
    InvalidSuggestion {
        tenant: String,
        sector: String,
        rule: String,
        #[source]
        source: ScoringError,
    },
}

/// A keyword rule proposing a rating for a risk scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionRule {
    /// Unique name within its sector.
    pub name: String,
    /// Case-insensitive substrings that trigger the rule.
    pub keywords: Vec<String>,
    /// Risk scenario the rule points at.
    pub scenario: String,
    /// Proposed axis ratings.
    pub suggested: RiskInput,
    /// Corrective action to propose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Rules for one tenant, grouped by sector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TenantKnowledge {
    #[serde(default)]
    pub sectors: HashMap<String, Vec<SuggestionRule>>,
}

/// The full rule table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub tenants: HashMap<String, TenantKnowledge>,
}

impl KnowledgeBase {
    /// Returns the rule list used for a `(tenant, sector)` request.
    pub fn rules_for(&self, tenant: &str, sector: &str) -> &[SuggestionRule] {
        let candidates = [
            (tenant, sector),
            (tenant, GENERAL_SECTOR),
            (DEFAULT_TENANT, sector),
            (DEFAULT_TENANT, GENERAL_SECTOR),
        ];

        candidates
            .iter()
            .find_map(|(t, s)| {
                self.tenants
                    .get(*t)
                    .and_then(|k| k.sectors.get(*s))
                    .map(Vec::as_slice)
            })
            .unwrap_or(&[])
    }

    /// Total number of rules across all tenants and sectors.
    pub fn rule_count(&self) -> usize {
        self.tenants
            .values()
            .flat_map(|t| t.sectors.values())
            .map(Vec::len)
            .sum()
    }

    /// Checks rule structure and that every suggestion is valid on `scales`.
    pub fn validate(&self, scales: &RiskScales) -> Result<(), KnowledgeError> {
        for tenant in self.tenants.keys() {
            self.validate_tenant(tenant, scales)?;
        }
        Ok(())
    }

    /// Validates the rules of one tenant entry against `scales`.
    ///
    /// A missing entry is valid.
    pub fn validate_tenant(&self, tenant: &str, scales: &RiskScales) -> Result<(), KnowledgeError> {
        let Some(knowledge) = self.tenants.get(tenant) else {
            return Ok(());
        };

        for (sector, rules) in &knowledge.sectors {
            let mut names = HashSet::new();
            for rule in rules {
                validate_rule(tenant, sector, rule, scales)?;
                if !names.insert(rule.name.as_str()) {
                    return Err(KnowledgeError::DuplicateRule {
                        tenant: tenant.to_string(),
                        sector: sector.clone(),
                        rule: rule.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_rule(
    tenant: &str,
    sector: &str,
    rule: &SuggestionRule,
    scales: &RiskScales,
) -> Result<(), KnowledgeError> {
    if rule.name.trim().is_empty() {
        return Err(KnowledgeError::EmptyRuleName {
            tenant: tenant.to_string(),
            sector: sector.to_string(),
        });
    }

    if !rule.keywords.iter().any(|k| !k.trim().is_empty()) {
        return Err(KnowledgeError::NoKeywords {
            tenant: tenant.to_string(),
            sector: sector.to_string(),
            rule: rule.name.clone(),
        });
    }

    let s = rule.suggested;
    scales
        .check(s.probability, s.vulnerability, s.impact)
        .map_err(|source| KnowledgeError::InvalidSuggestion {
            tenant: tenant.to_string(),
            sector: sector.to_string(),
            rule: rule.name.clone(),
            source,
        })?;

    Ok(())
}
