//! # gamr-core
//!
//! Risk scoring and evaluation roll-up for the GAMR risk-assessment platform.
//!
//! This crate provides the deterministic core used by the surrounding API:
//! the probability x vulnerability x impact risk score and its priority tier,
//! weighted aggregation of questionnaire responses, tenant scoring profiles,
//! risk-sheet records, and the keyword-driven suggestion knowledge base.
//!
//! Everything here is pure computation over plain data. Engines and loaded
//! configuration can be shared freely across threads.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod knowledge;
pub mod response;
pub mod risk;
pub mod risk_sheet;
pub mod scale;
pub mod tenant;

pub use aggregate::{aggregate_score, AggregateResult, WeightedValue};
pub use config::{load_scoring_config, ConfigError, ScoringConfig};
pub use error::{ScoringError, ScoringResult};
pub use evaluation::{
    roll_up, EvaluationScore, EvaluationTemplate, Objective, ObjectiveScore, Question,
};
pub use knowledge::{KnowledgeBase, KnowledgeError, Suggestion, SuggestionRule};
pub use response::{Response, ResponseValue};
pub use risk::{
    compute_risk_score, priority_from_score, Priority, RiskAssessment, RiskInput, RiskScore,
    RiskScoringEngine, ScoringMode,
};
pub use risk_sheet::{rank_by_priority, RiskSheet};
pub use scale::{AxisScale, RiskAxis, RiskScales};
pub use tenant::{TenantError, TenantProfile};
