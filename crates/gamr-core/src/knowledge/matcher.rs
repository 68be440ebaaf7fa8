//! Keyword matching of answer text against suggestion rules.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KnowledgeBase, SuggestionRule};
use crate::error::ScoringResult;
use crate::risk::{RiskAssessment, RiskInput, RiskScoringEngine};

/// A rule that matched an answer, with its scored suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub rule: String,
    pub scenario: String,
    pub matched_keywords: Vec<String>,
    pub suggested: RiskInput,
    pub assessment: RiskAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Returns the rule keywords that occur in `text`, ignoring case.
pub fn match_keywords(rule: &SuggestionRule, text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    rule.keywords
        .iter()
        .filter(|k| {
            let needle = k.trim().to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
        .cloned()
        .collect()
}

impl KnowledgeBase {
    /// Proposes risk ratings for an answer.
    ///
    /// Suggestions are scored with `engine` and sorted by number of matched
    /// keywords, most first, then by rule name.
    pub fn suggest(
        &self,
        tenant: &str,
        sector: &str,
        text: &str,
        engine: &RiskScoringEngine,
    ) -> ScoringResult<Vec<Suggestion>> {
        let rules = self.rules_for(tenant, sector);
        let mut suggestions = Vec::new();

        for rule in rules {
            let matched = match_keywords(rule, text);
            if matched.is_empty() {
                continue;
            }
            suggestions.push(Suggestion {
                rule: rule.name.clone(),
                scenario: rule.scenario.clone(),
                matched_keywords: matched,
                suggested: rule.suggested,
                assessment: engine.assess(&rule.suggested)?,
                recommendation: rule.recommendation.clone(),
            });
        }

        suggestions.sort_by(|a, b| {
            b.matched_keywords
                .len()
                .cmp(&a.matched_keywords.len())
                .then_with(|| a.rule.cmp(&b.rule))
        });

        debug!(
            tenant,
            sector,
            candidates = rules.len(),
            matched = suggestions.len(),
            "Matched answer against knowledge base"
        );

        Ok(suggestions)
    }
}
