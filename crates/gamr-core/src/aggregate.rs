//! Weighted aggregation for evaluation roll-ups.
//!
//! Aggregate scores measure evaluation maturity and are unrelated to the
//! risk-scenario score in [`crate::risk`].

use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Weight applied when an item does not specify one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A value and its optional weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightedValue {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl WeightedValue {
    /// Creates an item with an explicit weight.
    pub fn new(value: f64, weight: f64) -> Self {
        Self {
            value,
            weight: Some(weight),
        }
    }

    /// Creates an item carrying the default weight.
    pub fn unweighted(value: f64) -> Self {
        Self {
            value,
            weight: None,
        }
    }

    /// Returns the effective weight.
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_WEIGHT)
    }
}

/// Wire shape of an aggregation result. `None` serializes as `null`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub aggregate_score: Option<f64>,
}

impl From<Option<f64>> for AggregateResult {
    fn from(aggregate_score: Option<f64>) -> Self {
        Self { aggregate_score }
    }
}

/// Computes `Σ(value·weight) / Σ(weight)`.
///
/// Returns `None` when the total weight is zero (including an empty slice),
/// when any weight is negative or not finite, or when the mean is not finite.
/// A `None` means no score is available and must not be read as zero. Use
/// [`try_aggregate_score`] to learn which item was rejected.
pub fn aggregate_score(items: &[WeightedValue]) -> Option<f64> {
    if items.iter().any(|item| {
        let weight = item.effective_weight();
        !weight.is_finite() || weight < 0.0
    }) {
        return None;
    }

    let (weighted_sum, total_weight) = items.iter().fold((0.0, 0.0), |(sum, total), item| {
        let weight = item.effective_weight();
        (sum + item.value * weight, total + weight)
    });

    if total_weight == 0.0 {
        return None;
    }

    let mean = weighted_sum / total_weight;
    mean.is_finite().then_some(mean)
}

/// Rejects weights that are negative or not finite, and values that are not finite.
pub fn validate_items(items: &[WeightedValue]) -> ScoringResult<()> {
    for (index, item) in items.iter().enumerate() {
        if !item.value.is_finite() {
            return Err(ScoringError::InvalidWeight(format!(
                "item {} has a non-finite value",
                index
            )));
        }
        let weight = item.effective_weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(ScoringError::InvalidWeight(format!(
                "item {} has weight {}, weights must be finite and non-negative",
                index, weight
            )));
        }
    }
    Ok(())
}

/// Validates the items, then aggregates them.
pub fn try_aggregate_score(items: &[WeightedValue]) -> ScoringResult<Option<f64>> {
    validate_items(items)?;
    Ok(aggregate_score(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_item() {
        assert_eq!(aggregate_score(&[WeightedValue::new(5.0, 1.0)]), Some(5.0));
    }

    #[test]
    fn test_zero_weight_is_not_computable() {
        assert_eq!(aggregate_score(&[WeightedValue::new(0.0, 0.0)]), None);
        assert_eq!(
            aggregate_score(&[WeightedValue::new(3.0, 0.0), WeightedValue::new(4.0, 0.0)]),
            None
        );
    }

    #[test]
    fn test_empty_is_not_computable() {
        assert_eq!(aggregate_score(&[]), None);
    }

    #[test]
    fn test_weighted_mean() {
        let items = [
            WeightedValue::new(80.0, 2.0),
            WeightedValue::new(50.0, 1.0),
            WeightedValue::new(20.0, 1.0),
        ];
        // (160 + 50 + 20) / 4 = 57.5
        assert_eq!(aggregate_score(&items), Some(57.5));
    }

    #[test]
    fn test_default_weight() {
        let items = [WeightedValue::unweighted(2.0), WeightedValue::unweighted(4.0)];
        assert_eq!(aggregate_score(&items), Some(3.0));

        let mixed = [WeightedValue::unweighted(10.0), WeightedValue::new(40.0, 3.0)];
        // (10 + 120) / 4
        assert_eq!(aggregate_score(&mixed), Some(32.5));
    }

    #[test]
    fn test_zero_value_is_a_score() {
        assert_eq!(aggregate_score(&[WeightedValue::new(0.0, 1.0)]), Some(0.0));
    }

    #[test]
    fn test_non_finite_mean_is_not_computable() {
        assert_eq!(aggregate_score(&[WeightedValue::new(f64::NAN, 1.0)]), None);
    }

    #[test]
    fn test_invalid_weight_is_not_computable() {
        // A negative weight would otherwise pull the mean to 20, above every value.
        let items = [WeightedValue::new(10.0, 2.0), WeightedValue::new(0.0, -1.0)];
        assert_eq!(aggregate_score(&items), None);

        let items = [WeightedValue::new(10.0, 1.0), WeightedValue::new(5.0, f64::NAN)];
        assert_eq!(aggregate_score(&items), None);

        let items = [WeightedValue::new(10.0, f64::INFINITY)];
        assert_eq!(aggregate_score(&items), None);
    }

    #[test]
    fn test_validate_items() {
        assert!(validate_items(&[WeightedValue::new(1.0, 0.5)]).is_ok());
        assert!(validate_items(&[WeightedValue::new(1.0, -1.0)]).is_err());
        assert!(validate_items(&[WeightedValue::new(1.0, f64::INFINITY)]).is_err());
        assert!(validate_items(&[WeightedValue::new(f64::NAN, 1.0)]).is_err());

        let err = try_aggregate_score(&[WeightedValue::new(1.0, -2.0)]).unwrap_err();
        assert!(err.to_string().contains("item 0"));
    }

    #[test]
    fn test_wire_shapes() {
        let items: Vec<WeightedValue> =
            serde_json::from_str(r#"[{"value": 4}, {"value": 2, "weight": 3}]"#).unwrap();
        assert_eq!(items[0].weight, None);
        assert_eq!(aggregate_score(&items), Some(2.5));

        let json = serde_json::to_string(&AggregateResult::from(None)).unwrap();
        assert_eq!(json, r#"{"aggregateScore":null}"#);
        let json = serde_json::to_string(&AggregateResult::from(Some(5.0))).unwrap();
        assert_eq!(json, r#"{"aggregateScore":5.0}"#);
    }
}
