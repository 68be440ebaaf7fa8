//! Risk scoring and prioritization.
//!
//! A risk scenario is rated on three ordinal axes. The raw score is the
//! product `probability * vulnerability * impact`, and a [`Priority`] tier is
//! derived from it through fixed thresholds evaluated top-down.
//!
//! Under the default scales the raw product tops out at 60, so the CRITICAL
//! tier (>= 80) cannot be reached in [`ScoringMode::Raw`]. Tenants that need
//! the full tier range score in [`ScoringMode::Normalized`], which maps the
//! product onto 0-100 before the thresholds apply.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScoringError, ScoringResult};
use crate::scale::{RiskAxis, RiskScales};

/// Lower bound of the CRITICAL tier.
pub const CRITICAL_THRESHOLD: f64 = 80.0;
/// Lower bound of the HIGH tier.
pub const HIGH_THRESHOLD: f64 = 60.0;
/// Lower bound of the MEDIUM tier.
pub const MEDIUM_THRESHOLD: f64 = 40.0;
/// Lower bound of the LOW tier.
pub const LOW_THRESHOLD: f64 = 20.0;

/// Discrete risk-severity tier.
///
/// Ordering follows severity, so `Priority::Critical > Priority::High`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Below every threshold
    VeryLow,
    /// Score of at least 20
    Low,
    /// Score of at least 40
    Medium,
    /// Score of at least 60
    High,
    /// Score of at least 80
    Critical,
}

impl Priority {
    /// All tiers from least to most severe.
    pub const ALL: [Priority; 5] = [
        Priority::VeryLow,
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Wire label of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::VeryLow => "VERY_LOW",
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }

    /// Inclusive lower bound of the tier, or `None` for the catch-all tier.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            Priority::VeryLow => None,
            Priority::Low => Some(LOW_THRESHOLD),
            Priority::Medium => Some(MEDIUM_THRESHOLD),
            Priority::High => Some(HIGH_THRESHOLD),
            Priority::Critical => Some(CRITICAL_THRESHOLD),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace(|c: char| c == '-' || c == ' ', "_").as_str() {
            "VERY_LOW" => Ok(Priority::VeryLow),
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Maps a score to its priority tier.
///
/// Thresholds are inclusive and checked from the top, so a score of exactly
/// 60 is HIGH. The mapping is total: NaN matches no threshold and lands in
/// VERY_LOW.
pub fn priority_from_score(score: f64) -> Priority {
    if score >= CRITICAL_THRESHOLD {
        Priority::Critical
    } else if score >= HIGH_THRESHOLD {
        Priority::High
    } else if score >= MEDIUM_THRESHOLD {
        Priority::Medium
    } else if score >= LOW_THRESHOLD {
        Priority::Low
    } else {
        Priority::VeryLow
    }
}

/// The three ordinal ratings of a risk scenario.
///
/// Values are carried as signed integers so that zero and negative ratings
/// reach validation and are reported as range errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RiskInput {
    pub probability: i64,
    pub vulnerability: i64,
    pub impact: i64,
}

impl RiskInput {
    /// Creates a new input. Range checks happen when it is scored.
    pub fn new(probability: i64, vulnerability: i64, impact: i64) -> Self {
        Self {
            probability,
            vulnerability,
            impact,
        }
    }

    /// Returns the rating for the given axis.
    pub fn axis(&self, axis: RiskAxis) -> i64 {
        match axis {
            RiskAxis::Probability => self.probability,
            RiskAxis::Vulnerability => self.vulnerability,
            RiskAxis::Impact => self.impact,
        }
    }

    /// Parses an input from an untyped JSON body.
    ///
    /// Every axis must be present and be a JSON integer; floats such as `2.0`
    /// and numeric strings are rejected.
    pub fn from_json(value: &serde_json::Value) -> ScoringResult<Self> {
        let field = |axis: RiskAxis| -> ScoringResult<i64> {
            let name = axis.as_str();
            match value.get(name) {
                None | Some(serde_json::Value::Null) => Err(ScoringError::MissingField {
                    field: name.to_string(),
                }),
                Some(v) => v.as_i64().ok_or_else(|| ScoringError::NotAnInteger {
                    field: name.to_string(),
                }),
            }
        };

        Ok(Self {
            probability: field(RiskAxis::Probability)?,
            vulnerability: field(RiskAxis::Vulnerability)?,
            impact: field(RiskAxis::Impact)?,
        })
    }
}

/// Raw product of the three axes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RiskScore(u64);

impl RiskScore {
    /// Returns the integer product.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the product as a float for threshold comparison.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the raw risk score using the default scales.
///
/// Fails with [`ScoringError::Validation`] when any axis is out of range.
pub fn compute_risk_score(
    probability: i64,
    vulnerability: i64,
    impact: i64,
) -> ScoringResult<RiskScore> {
    RiskScoringEngine::default().score(&RiskInput::new(probability, vulnerability, impact))
}

/// Which value the priority thresholds are applied to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Thresholds apply to the raw product.
    #[default]
    Raw,
    /// Thresholds apply to `100 * score / max_score`.
    Normalized,
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMode::Raw => write!(f, "raw"),
            ScoringMode::Normalized => write!(f, "normalized"),
        }
    }
}

/// Score and priority computed for one risk input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Raw product of the three axes.
    pub risk_score: RiskScore,
    /// Raw score mapped onto 0-100 against the scale maximum.
    pub normalized_score: f64,
    /// Priority tier.
    pub priority: Priority,
    /// Mode the priority was derived in.
    pub mode: ScoringMode,
}

/// Validates risk inputs against a set of scales and derives priorities.
///
/// The engine is plain data and holds no state between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskScoringEngine {
    scales: RiskScales,
    mode: ScoringMode,
}

impl RiskScoringEngine {
    /// Creates an engine after validating the scales.
    pub fn new(scales: RiskScales, mode: ScoringMode) -> ScoringResult<Self> {
        scales.validate()?;
        Ok(Self { scales, mode })
    }

    /// Returns the engine's axis scales.
    pub fn scales(&self) -> &RiskScales {
        &self.scales
    }

    /// Returns the engine's scoring mode.
    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Validates the input and returns the raw product.
    pub fn score(&self, input: &RiskInput) -> ScoringResult<RiskScore> {
        let (p, v, i) = self
            .scales
            .check(input.probability, input.vulnerability, input.impact)?;
        Ok(RiskScore(p * v * i))
    }

    /// Maps a raw score onto 0-100 against the scale maximum.
    pub fn normalize(&self, score: RiskScore) -> f64 {
        100.0 * score.as_f64() / self.scales.max_score() as f64
    }

    /// Returns the value the thresholds are applied to in this engine's mode.
    pub fn priority_basis(&self, score: RiskScore) -> f64 {
        match self.mode {
            ScoringMode::Raw => score.as_f64(),
            ScoringMode::Normalized => self.normalize(score),
        }
    }

    /// Validates the input and derives score and priority.
    pub fn assess(&self, input: &RiskInput) -> ScoringResult<RiskAssessment> {
        let risk_score = self.score(input)?;
        let priority = priority_from_score(self.priority_basis(risk_score));

        debug!(
            probability = input.probability,
            vulnerability = input.vulnerability,
            impact = input.impact,
            score = risk_score.value(),
            mode = %self.mode,
            priority = %priority,
            "Assessed risk input"
        );

        Ok(RiskAssessment {
            risk_score,
            normalized_score: self.normalize(risk_score),
            priority,
            mode: self.mode,
        })
    }

    /// Lists the tiers some valid input can produce, least severe first.
    pub fn reachable_priorities(&self) -> Vec<Priority> {
        let mut seen = BTreeSet::new();
        let (p, v, i) = (
            self.scales.probability,
            self.scales.vulnerability,
            self.scales.impact,
        );

        'outer: for a in p.min..=p.max {
            for b in v.min..=v.max {
                for c in i.min..=i.max {
                    let score = RiskScore(u64::from(a) * u64::from(b) * u64::from(c));
                    seen.insert(priority_from_score(self.priority_basis(score)));
                    if seen.len() == Priority::ALL.len() {
                        break 'outer;
                    }
                }
            }
        }

        seen.into_iter().collect()
    }

    /// Returns true if some valid input maps to `priority`.
    pub fn can_reach(&self, priority: Priority) -> bool {
        self.reachable_priorities().contains(&priority)
    }
}
