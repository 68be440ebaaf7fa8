//! Evaluation templates and the objective/evaluation score roll-up.
//!
//! Question responses roll up in two weighted steps:
//! 1. Each objective's score is the weighted mean of its scorable answers.
//! 2. The evaluation score is the weighted mean of the objectives that have
//!    a score.
//!
//! An objective with no scorable answer reports `None` and is left out of
//! step 2 rather than counted as zero.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::{aggregate_score, WeightedValue, DEFAULT_WEIGHT};
use crate::error::{ScoringError, ScoringResult};
use crate::response::Response;

/// A single question within an objective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// A weighted group of questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Objective {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// The question hierarchy of an evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvaluationTemplate {
    #[serde(default)]
    pub name: String,
    pub objectives: Vec<Objective>,
}

fn check_weight(weight: Option<f64>, owner: &str) -> ScoringResult<()> {
    match weight {
        Some(w) if !w.is_finite() || w < 0.0 => Err(ScoringError::InvalidWeight(format!(
            "{} has weight {}, weights must be finite and non-negative",
            owner, w
        ))),
        _ => Ok(()),
    }
}

impl EvaluationTemplate {
    /// Checks IDs are non-empty and unique, and weights are usable.
    pub fn validate(&self) -> ScoringResult<()> {
        let mut objective_ids = HashSet::new();
        let mut question_ids = HashSet::new();

        for objective in &self.objectives {
            if objective.id.is_empty() {
                return Err(ScoringError::InvalidTemplate(
                    "objective id must not be empty".to_string(),
                ));
            }
            if !objective_ids.insert(objective.id.as_str()) {
                return Err(ScoringError::InvalidTemplate(format!(
                    "duplicate objective id '{}'",
                    objective.id
                )));
            }
            check_weight(objective.weight, &format!("objective '{}'", objective.id))?;

            for question in &objective.questions {
                if question.id.is_empty() {
                    return Err(ScoringError::InvalidTemplate(format!(
                        "question in objective '{}' has an empty id",
                        objective.id
                    )));
                }
                if !question_ids.insert(question.id.as_str()) {
                    return Err(ScoringError::InvalidTemplate(format!(
                        "duplicate question id '{}'",
                        question.id
                    )));
                }
                check_weight(question.weight, &format!("question '{}'", question.id))?;
            }
        }

        Ok(())
    }

    /// Total number of questions across all objectives.
    pub fn question_count(&self) -> usize {
        self.objectives.iter().map(|o| o.questions.len()).sum()
    }
}

/// Roll-up result for one objective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveScore {
    pub objective_id: String,
    pub title: String,
    /// Weighted mean of scorable answers, `None` when there are none.
    pub score: Option<f64>,
    pub weight: f64,
    /// Questions with any response.
    pub answered: usize,
    /// Questions whose response produced a numeric value.
    pub scorable: usize,
    pub total: usize,
}

/// Roll-up result for an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationScore {
    pub objectives: Vec<ObjectiveScore>,
    /// Weighted mean of scored objectives, `None` when no objective scored.
    pub overall: Option<f64>,
    /// Share of template questions that have a response (0.0 - 1.0).
    pub completion: f64,
}

/// Rolls responses up to objective and evaluation scores.
///
/// The template is validated first, so a negative or non-finite weight is
/// reported instead of skewing the means. When a question is answered more
/// than once the last response wins. Responses to questions missing from the
/// template are ignored.
pub fn roll_up(
    template: &EvaluationTemplate,
    responses: &[Response],
) -> ScoringResult<EvaluationScore> {
    template.validate()?;

    let known: HashSet<&str> = template
        .objectives
        .iter()
        .flat_map(|o| o.questions.iter().map(|q| q.id.as_str()))
        .collect();

    let mut by_question: HashMap<&str, &Response> = HashMap::new();
    for response in responses {
        if known.contains(response.question_id.as_str()) {
            by_question.insert(response.question_id.as_str(), response);
        } else {
            warn!(
                question_id = %response.question_id,
                template = %template.name,
                "Ignoring response to unknown question"
            );
        }
    }

    let objectives: Vec<ObjectiveScore> = template
        .objectives
        .iter()
        .map(|objective| {
            let mut answered = 0;
            let mut items = Vec::new();

            for question in &objective.questions {
                let Some(response) = by_question.get(question.id.as_str()) else {
                    continue;
                };
                answered += 1;
                if let Some(value) = response.value.numeric_value() {
                    items.push(WeightedValue {
                        value,
                        weight: question.weight,
                    });
                }
            }

            ObjectiveScore {
                objective_id: objective.id.clone(),
                title: objective.title.clone(),
                score: aggregate_score(&items),
                weight: objective.weight.unwrap_or(DEFAULT_WEIGHT),
                answered,
                scorable: items.len(),
                total: objective.questions.len(),
            }
        })
        .collect();

    let scored: Vec<WeightedValue> = objectives
        .iter()
        .filter_map(|o| o.score.map(|score| WeightedValue::new(score, o.weight)))
        .collect();
    let overall = aggregate_score(&scored);

    let total = template.question_count();
    let answered: usize = objectives.iter().map(|o| o.answered).sum();
    let completion = if total == 0 {
        0.0
    } else {
        answered as f64 / total as f64
    };

    debug!(
        template = %template.name,
        objectives = objectives.len(),
        scored_objectives = scored.len(),
        overall = ?overall,
        "Rolled up evaluation"
    );

    Ok(EvaluationScore {
        objectives,
        overall,
        completion,
    })
}
