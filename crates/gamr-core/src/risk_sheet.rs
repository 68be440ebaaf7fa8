//! Risk sheets: named risk scenarios with their derived score.
//!
//! The score and priority of a sheet are derived from its three axes. They
//! are computed on creation and recomputed on every axis edit; there is no
//! way to set them directly. Deserialized sheets are re-scored against the
//! scales they carry, and a stored assessment that disagrees is rejected.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ScoringError, ScoringResult};
use crate::risk::{Priority, RiskAssessment, RiskInput, RiskScoringEngine};
use crate::scale::RiskScales;

/// Tolerance when comparing a stored normalized score with a recomputed one.
const NORMALIZED_EPSILON: f64 = 1e-9;

/// A named risk scenario belonging to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RiskSheetRecord")]
pub struct RiskSheet {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    input: RiskInput,
    scales: RiskScales,
    assessment: RiskAssessment,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Wire shape of a sheet before its assessment has been checked.
#[derive(Deserialize)]
struct RiskSheetRecord {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    input: RiskInput,
    scales: RiskScales,
    assessment: RiskAssessment,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RiskSheetRecord> for RiskSheet {
    type Error = ScoringError;

    fn try_from(record: RiskSheetRecord) -> ScoringResult<Self> {
        let engine = RiskScoringEngine::new(record.scales, record.assessment.mode)?;
        let expected = engine.assess(&record.input)?;
        let stored = record.assessment;

        if stored.risk_score != expected.risk_score
            || stored.priority != expected.priority
            || (stored.normalized_score - expected.normalized_score).abs() > NORMALIZED_EPSILON
        {
            return Err(ScoringError::InconsistentAssessment { name: record.name });
        }

        Ok(Self {
            id: record.id,
            tenant_id: record.tenant_id,
            name: record.name,
            description: record.description,
            input: record.input,
            scales: record.scales,
            assessment: expected,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl RiskSheet {
    /// Creates a sheet, validating and scoring `input` with `engine`.
    pub fn new(
        tenant_id: Uuid,
        name: impl Into<String>,
        input: RiskInput,
        engine: &RiskScoringEngine,
    ) -> ScoringResult<Self> {
        let assessment = engine.assess(&input)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            description: None,
            input,
            scales: *engine.scales(),
            assessment,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn input(&self) -> &RiskInput {
        &self.input
    }

    /// Scales the current assessment was computed against.
    pub fn scales(&self) -> &RiskScales {
        &self.scales
    }

    pub fn assessment(&self) -> &RiskAssessment {
        &self.assessment
    }

    pub fn priority(&self) -> Priority {
        self.assessment.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the axes and recomputes the assessment.
    ///
    /// On error the sheet is left unchanged.
    pub fn update_axes(&mut self, input: RiskInput, engine: &RiskScoringEngine) -> ScoringResult<()> {
        let assessment = engine.assess(&input)?;
        self.input = input;
        self.scales = *engine.scales();
        self.assessment = assessment;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Recomputes the assessment with the current axes, e.g. after the
    /// tenant's profile changed.
    pub fn rescore(&mut self, engine: &RiskScoringEngine) -> ScoringResult<()> {
        let input = self.input;
        self.update_axes(input, engine)
    }
}

/// Orders sheets for a corrective-action backlog: priority descending, then
/// raw score descending, then name.
pub fn rank_by_priority(sheets: &mut [RiskSheet]) {
    sheets.sort_by(|a, b| compare_severity(b, a).then_with(|| a.name.cmp(&b.name)));
}

fn compare_severity(a: &RiskSheet, b: &RiskSheet) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.assessment.risk_score.cmp(&b.assessment.risk_score))
}
