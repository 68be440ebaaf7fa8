//! Property tests for the risk scoring engine and aggregation.
//!
//! These walk the full default input grid rather than sampling, since the
//! domain is small (3 x 4 x 5 combinations).

use gamr_core::{
    aggregate_score, compute_risk_score, priority_from_score, Priority, RiskInput,
    RiskScoringEngine, RiskScales, ScoringError, ScoringMode, WeightedValue,
};

fn grid() -> impl Iterator<Item = (i64, i64, i64)> {
    (1..=3).flat_map(|p| (1..=4).flat_map(move |v| (1..=5).map(move |i| (p, v, i))))
}

fn score(p: i64, v: i64, i: i64) -> u64 {
    compute_risk_score(p, v, i).unwrap().value()
}

#[test]
fn score_is_strictly_monotonic_in_probability() {
    for v in 1..=4 {
        for i in 1..=5 {
            for p in 1..3 {
                assert!(score(p, v, i) < score(p + 1, v, i));
            }
        }
    }
}

#[test]
fn score_is_strictly_monotonic_in_vulnerability() {
    for p in 1..=3 {
        for i in 1..=5 {
            for v in 1..4 {
                assert!(score(p, v, i) < score(p, v + 1, i));
            }
        }
    }
}

#[test]
fn score_is_strictly_monotonic_in_impact() {
    for p in 1..=3 {
        for v in 1..=4 {
            for i in 1..5 {
                assert!(score(p, v, i) < score(p, v, i + 1));
            }
        }
    }
}

#[test]
fn doubling_an_axis_doubles_the_score() {
    assert_eq!(score(2, 3, 4), 2 * score(1, 3, 4));
    assert_eq!(score(3, 4, 5), 2 * score(3, 2, 5));
    assert_eq!(score(1, 1, 4), 2 * score(1, 1, 2));
}

#[test]
fn out_of_range_inputs_fail_validation() {
    for (p, v, i) in [
        (0, 1, 1),
        (4, 1, 1),
        (1, 0, 1),
        (1, 5, 1),
        (1, 1, 0),
        (1, 1, 6),
        (-1, -1, -1),
    ] {
        let err = compute_risk_score(p, v, i).unwrap_err();
        assert!(
            matches!(err, ScoringError::Validation { .. }),
            "({}, {}, {}) should fail validation, got {:?}",
            p,
            v,
            i,
            err
        );
    }
}

#[test]
fn documented_threshold_cases() {
    assert_eq!(priority_from_score(80.0), Priority::Critical);
    assert_eq!(priority_from_score(79.99), Priority::High);
    assert_eq!(priority_from_score(60.0), Priority::High);
    assert_eq!(priority_from_score(59.99), Priority::Medium);
    assert_eq!(priority_from_score(20.0), Priority::Low);
    assert_eq!(priority_from_score(19.99), Priority::VeryLow);

    assert_eq!(score(2, 3, 4), 24);
    assert_eq!(priority_from_score(24.0), Priority::Low);
    assert_eq!(score(2, 4, 5), 40);
    assert_eq!(priority_from_score(40.0), Priority::Medium);
    assert_eq!(score(3, 4, 5), 60);
    assert_eq!(priority_from_score(60.0), Priority::High);
}

#[test]
fn critical_is_unreachable_in_raw_mode_with_default_scales() {
    let engine = RiskScoringEngine::default();
    let max = grid().map(|(p, v, i)| score(p, v, i)).max().unwrap();
    assert_eq!(max, 60);
    assert_eq!(max, RiskScales::default().max_score());

    for (p, v, i) in grid() {
        let assessment = engine.assess(&RiskInput::new(p, v, i)).unwrap();
        assert_ne!(assessment.priority, Priority::Critical);
    }
    assert!(!engine.can_reach(Priority::Critical));
}

#[test]
fn normalized_mode_reaches_every_tier() {
    let engine = RiskScoringEngine::new(RiskScales::default(), ScoringMode::Normalized).unwrap();
    assert_eq!(engine.reachable_priorities(), Priority::ALL.to_vec());

    for (p, v, i) in grid() {
        let assessment = engine.assess(&RiskInput::new(p, v, i)).unwrap();
        assert!(assessment.normalized_score > 0.0 && assessment.normalized_score <= 100.0);
    }
}

#[test]
fn priority_is_monotonic_in_score() {
    let mut previous = Priority::VeryLow;
    for tenth in 0..=1000 {
        let priority = priority_from_score(f64::from(tenth) / 10.0);
        assert!(priority >= previous);
        previous = priority;
    }
}

#[test]
fn aggregation_edge_cases() {
    assert_eq!(aggregate_score(&[WeightedValue::new(5.0, 1.0)]), Some(5.0));
    assert_eq!(aggregate_score(&[WeightedValue::new(0.0, 0.0)]), None);
    assert_eq!(aggregate_score(&[]), None);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let engine = RiskScoringEngine::new(RiskScales::default(), ScoringMode::Normalized).unwrap();
    let input = RiskInput::new(2, 3, 5);
    let first = engine.assess(&input).unwrap();
    for _ in 0..100 {
        let again = engine.assess(&input).unwrap();
        assert_eq!(again.risk_score, first.risk_score);
        assert_eq!(
            again.normalized_score.to_bits(),
            first.normalized_score.to_bits()
        );
        assert_eq!(again.priority, first.priority);
    }

    let items = [
        WeightedValue::new(0.1, 0.3),
        WeightedValue::new(0.7, 1.9),
        WeightedValue::unweighted(2.2),
    ];
    let first = aggregate_score(&items).unwrap();
    for _ in 0..100 {
        assert_eq!(aggregate_score(&items).unwrap().to_bits(), first.to_bits());
    }
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = RiskScoringEngine::default();
    let expected: Vec<_> = grid()
        .map(|(p, v, i)| engine.assess(&RiskInput::new(p, v, i)).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let results: Vec<_> = grid()
                    .map(|(p, v, i)| engine.assess(&RiskInput::new(p, v, i)).unwrap())
                    .collect();
                assert_eq!(results, expected);
            });
        }
    });
}
