//! Ordinal axis scales for risk scoring.
//!
//! Each risk axis is rated on its own closed integer range. Tenants may define
//! label sets of different lengths, so the bounds are data rather than
//! constants. The defaults match the scenario catalog: probability 1-3,
//! vulnerability 1-4, impact 1-5.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Upper bound on the number of levels a single axis may carry.
pub const MAX_AXIS_LEVEL: u32 = 100;

/// One of the three rated dimensions of a risk scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskAxis {
    Probability,
    Vulnerability,
    Impact,
}

impl RiskAxis {
    /// All axes in validation order.
    pub const ALL: [RiskAxis; 3] = [
        RiskAxis::Probability,
        RiskAxis::Vulnerability,
        RiskAxis::Impact,
    ];

    /// Field name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskAxis::Probability => "probability",
            RiskAxis::Vulnerability => "vulnerability",
            RiskAxis::Impact => "impact",
        }
    }
}

impl std::fmt::Display for RiskAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed integer range `[min, max]` for one axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AxisScale {
    pub min: u32,
    pub max: u32,
}

impl AxisScale {
    /// Creates a scale starting at 1 with `levels` steps.
    pub const fn levels(levels: u32) -> Self {
        Self { min: 1, max: levels }
    }

    /// Returns true if `value` lies within the scale.
    pub fn contains(&self, value: i64) -> bool {
        value >= i64::from(self.min) && value <= i64::from(self.max)
    }

    /// Checks the scale is usable for multiplication-based scoring.
    pub fn validate(&self, axis: RiskAxis) -> Result<(), ScoringError> {
        if self.min < 1 {
            return Err(ScoringError::InvalidScale {
                axis,
                message: format!("minimum must be at least 1, got {}", self.min),
            });
        }
        if self.min > self.max {
            return Err(ScoringError::InvalidScale {
                axis,
                message: format!(
                    "minimum {} is greater than maximum {}",
                    self.min, self.max
                ),
            });
        }
        if self.max > MAX_AXIS_LEVEL {
            return Err(ScoringError::InvalidScale {
                axis,
                message: format!(
                    "maximum {} exceeds the supported limit of {}",
                    self.max, MAX_AXIS_LEVEL
                ),
            });
        }
        Ok(())
    }

    fn check(&self, axis: RiskAxis, value: i64) -> Result<u64, ScoringError> {
        if self.contains(value) {
            // Range check above guarantees a positive value.
            Ok(value as u64)
        } else {
            Err(ScoringError::Validation {
                axis,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Axis bounds used to validate and score a [`RiskInput`](crate::risk::RiskInput).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskScales {
    pub probability: AxisScale,
    pub vulnerability: AxisScale,
    pub impact: AxisScale,
}

impl Default for RiskScales {
    fn default() -> Self {
        Self {
            probability: AxisScale::levels(3),
            vulnerability: AxisScale::levels(4),
            impact: AxisScale::levels(5),
        }
    }
}

impl RiskScales {
    /// Returns the scale for the given axis.
    pub fn axis(&self, axis: RiskAxis) -> AxisScale {
        match axis {
            RiskAxis::Probability => self.probability,
            RiskAxis::Vulnerability => self.vulnerability,
            RiskAxis::Impact => self.impact,
        }
    }

    /// Validates all three axis scales.
    pub fn validate(&self) -> Result<(), ScoringError> {
        for axis in RiskAxis::ALL {
            self.axis(axis).validate(axis)?;
        }
        Ok(())
    }

    /// Smallest attainable product.
    pub fn min_score(&self) -> u64 {
        u64::from(self.probability.min)
            * u64::from(self.vulnerability.min)
            * u64::from(self.impact.min)
    }

    /// Largest attainable product.
    pub fn max_score(&self) -> u64 {
        u64::from(self.probability.max)
            * u64::from(self.vulnerability.max)
            * u64::from(self.impact.max)
    }

    /// Validates each axis value, reporting the first one out of range.
    ///
    /// Returns the checked `(probability, vulnerability, impact)` triple.
    pub fn check(
        &self,
        probability: i64,
        vulnerability: i64,
        impact: i64,
    ) -> Result<(u64, u64, u64), ScoringError> {
        Ok((
            self.probability.check(RiskAxis::Probability, probability)?,
            self.vulnerability
                .check(RiskAxis::Vulnerability, vulnerability)?,
            self.impact.check(RiskAxis::Impact, impact)?,
        ))
    }
}
