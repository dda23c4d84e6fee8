//! Pure index-aggregation core.
//!
//! One aggregation pass turns raw per-model benchmark scores plus a human
//! baseline vector into a `DatasetSnapshot`. The pass is synchronous and
//! side-effect free; collection, storage, and publication belong to the
//! caller. A failed pass aborts without producing a snapshot, so readers
//! keep the previously published document.

use thiserror::Error;

use crate::analysis::generate_analysis;
use crate::metrics::{MetricId, MetricVector};
use crate::snapshot::{
    AggregateMetric, AggregateSet, DatasetSnapshot, MetricExtreme, ModelRecord,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// A baseline is zero, negative, or non-finite; division is undefined.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A model is missing one or more of the six required metrics.
    #[error("incomplete data for model '{model}': missing metric {metric}")]
    IncompleteData { model: String, metric: &'static str },
    /// Snapshot assembly was given insufficient components.
    #[error("incomplete snapshot: {0}")]
    IncompleteSnapshot(String),
}

/// Raw benchmark scores for one model, canonical name already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawModelScores {
    pub name: String,
    pub scores: MetricVector,
}

/// Every metric must have a strictly positive, finite baseline before any
/// score is normalized. Checked once per run.
pub fn validate_baselines(baselines: &MetricVector) -> Result<(), AggregateError> {
    for (metric, baseline) in baselines.iter() {
        if !baseline.is_finite() || baseline <= 0.0 {
            return Err(AggregateError::Configuration(format!(
                "baseline for {} is {}, must be a positive finite number",
                metric.as_str(),
                baseline
            )));
        }
    }
    Ok(())
}

/// Raw score divided by the human baseline for the same metric.
/// 1.0 means human parity.
pub fn normalize(
    raw: f64,
    metric: MetricId,
    baselines: &MetricVector,
) -> Result<f64, AggregateError> {
    let baseline = baselines.get(metric);
    if !baseline.is_finite() || baseline <= 0.0 {
        return Err(AggregateError::Configuration(format!(
            "baseline for {} is {}, must be a positive finite number",
            metric.as_str(),
            baseline
        )));
    }
    Ok(raw / baseline)
}

/// Unweighted arithmetic mean of the six normalized scores.
///
/// The six-field vector makes a missing metric unrepresentable here;
/// records with fewer than six raw metrics are rejected at ingestion.
pub fn compute_composite(normalized: &MetricVector) -> f64 {
    normalized.mean()
}

/// Normalize one model's raw scores and derive its composite index.
pub fn normalize_record(
    raw: &RawModelScores,
    baselines: &MetricVector,
) -> Result<ModelRecord, AggregateError> {
    let normalized =
        MetricVector::try_from_fn(|m| normalize(raw.scores.get(m), m, baselines))?;
    Ok(ModelRecord {
        name: raw.name.clone(),
        composite: compute_composite(&normalized),
        normalized,
    })
}

/// Per-metric mean, max-holder, and min-holder across all models.
/// Ties go to the first model in input order.
pub fn compute_aggregates(records: &[ModelRecord]) -> Result<AggregateSet, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::IncompleteSnapshot(
            "no model records to aggregate".to_string(),
        ));
    }
    Ok(AggregateSet::from_fn(|metric| {
        let mut sum = 0.0;
        let mut max: &ModelRecord = &records[0];
        let mut min: &ModelRecord = &records[0];
        for record in records {
            let value = record.normalized.get(metric);
            sum += value;
            // Strict comparisons: the first-encountered holder wins ties.
            if value > max.normalized.get(metric) {
                max = record;
            }
            if value < min.normalized.get(metric) {
                min = record;
            }
        }
        AggregateMetric {
            mean: sum / records.len() as f64,
            max: MetricExtreme {
                model: max.name.clone(),
                value: max.normalized.get(metric),
            },
            min: MetricExtreme {
                model: min.name.clone(),
                value: min.normalized.get(metric),
            },
        }
    }))
}

/// Order by composite index descending; equal composites order by canonical
/// name ascending so rank numbers are reproducible across runs.
pub fn rank(mut records: Vec<ModelRecord>) -> Vec<ModelRecord> {
    records.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    records
}

/// Mean composite index across all models.
pub fn overall_mean(records: &[ModelRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.composite).sum::<f64>() / records.len() as f64
}

/// Pure assembly. Only checks that all required components are present.
pub fn build_snapshot(
    ranked: Vec<ModelRecord>,
    aggregates: AggregateSet,
    overall: f64,
    analysis: String,
    timestamp: String,
) -> Result<DatasetSnapshot, AggregateError> {
    if ranked.is_empty() {
        return Err(AggregateError::IncompleteSnapshot(
            "model list is empty".to_string(),
        ));
    }
    if analysis.is_empty() {
        return Err(AggregateError::IncompleteSnapshot(
            "analysis text is empty".to_string(),
        ));
    }
    if timestamp.is_empty() {
        return Err(AggregateError::IncompleteSnapshot(
            "timestamp is empty".to_string(),
        ));
    }
    Ok(DatasetSnapshot {
        overall_mean: overall,
        timestamp,
        models: ranked,
        aggregates,
        analysis,
    })
}

/// One full aggregation pass: validate, normalize, aggregate, rank, narrate.
pub fn aggregate(
    raw: &[RawModelScores],
    baselines: &MetricVector,
    timestamp: String,
) -> Result<DatasetSnapshot, AggregateError> {
    validate_baselines(baselines)?;
    let mut records = Vec::with_capacity(raw.len());
    for model in raw {
        records.push(normalize_record(model, baselines)?);
    }
    // Aggregates see input order (tie-break rule); ranking happens after.
    let aggregates = compute_aggregates(&records)?;
    let overall = overall_mean(&records);
    let ranked = rank(records);
    let analysis = generate_analysis(&ranked, overall, &aggregates);
    build_snapshot(ranked, aggregates, overall, analysis, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, scores: [f64; 6]) -> RawModelScores {
        RawModelScores {
            name: name.to_string(),
            scores: MetricVector {
                ifeval: scores[0],
                bbh: scores[1],
                math: scores[2],
                gpqa: scores[3],
                musr: scores[4],
                mmlu_pro: scores[5],
            },
        }
    }

    fn unit_baselines() -> MetricVector {
        MetricVector::splat(1.0)
    }

    #[test]
    fn test_single_model_composite_scenario() {
        // baseline 1.0 everywhere, scores 0.9..0.4 -> composite 0.65
        let snapshot = aggregate(
            &[raw("solo", [0.9, 0.8, 0.7, 0.6, 0.5, 0.4])],
            &unit_baselines(),
            "t0".to_string(),
        )
        .unwrap();
        assert!((snapshot.models[0].composite - 0.65).abs() < 1e-12);
        assert!((snapshot.overall_mean - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_two_model_ranking_and_mean_scenario() {
        // A composite 1.2, B composite 0.8 -> rank [A, B], overall mean 1.0
        let snapshot = aggregate(
            &[raw("b", [0.8; 6]), raw("a", [1.2; 6])],
            &unit_baselines(),
            "t0".to_string(),
        )
        .unwrap();
        let names: Vec<&str> = snapshot.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!((snapshot.overall_mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_baseline_is_configuration_error() {
        let mut baselines = unit_baselines();
        baselines.math = 0.0;
        let err = aggregate(&[raw("m", [1.0; 6])], &baselines, "t0".to_string()).unwrap_err();
        assert!(matches!(err, AggregateError::Configuration(_)));
    }

    #[test]
    fn test_normalize_divides_by_baseline() {
        let baselines = MetricVector::splat(100.0);
        let v = normalize(85.0, MetricId::Gpqa, &baselines).unwrap();
        assert!((v - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_rank_is_a_permutation() {
        let inputs = vec![
            raw("c", [0.5; 6]),
            raw("a", [0.9; 6]),
            raw("b", [0.7; 6]),
            raw("d", [0.1; 6]),
        ];
        let records: Vec<ModelRecord> = inputs
            .iter()
            .map(|r| normalize_record(r, &unit_baselines()).unwrap())
            .collect();
        let ranked = rank(records.clone());
        assert_eq!(ranked.len(), records.len());
        let mut input_names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        let mut ranked_names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        input_names.sort_unstable();
        ranked_names.sort_unstable();
        assert_eq!(input_names, ranked_names);
    }

    #[test]
    fn test_rank_ties_resolve_by_name() {
        let records: Vec<ModelRecord> = [raw("zeta", [0.5; 6]), raw("alpha", [0.5; 6])]
            .iter()
            .map(|r| normalize_record(r, &unit_baselines()).unwrap())
            .collect();
        let ranked = rank(records);
        assert_eq!(ranked[0].name, "alpha");
        assert_eq!(ranked[1].name, "zeta");
    }

    #[test]
    fn test_composite_within_score_bounds() {
        let record = normalize_record(
            &raw("m", [0.31, 0.97, 0.55, 0.42, 0.88, 0.63]),
            &unit_baselines(),
        )
        .unwrap();
        assert!(record.composite >= record.normalized.min());
        assert!(record.composite <= record.normalized.max());
    }

    #[test]
    fn test_aggregates_report_true_extrema() {
        let inputs = vec![
            raw("low", [0.2, 0.3, 0.4, 0.5, 0.6, 0.7]),
            raw("high", [0.9, 0.8, 0.9, 0.8, 0.9, 0.8]),
            raw("mid", [0.5; 6]),
        ];
        let records: Vec<ModelRecord> = inputs
            .iter()
            .map(|r| normalize_record(r, &unit_baselines()).unwrap())
            .collect();
        let aggregates = compute_aggregates(&records).unwrap();
        for metric in MetricId::ALL {
            let agg = aggregates.get(metric);
            let true_max = records
                .iter()
                .map(|r| r.normalized.get(metric))
                .fold(f64::NEG_INFINITY, f64::max);
            let true_min = records
                .iter()
                .map(|r| r.normalized.get(metric))
                .fold(f64::INFINITY, f64::min);
            assert_eq!(agg.max.value, true_max, "{}", metric.as_str());
            assert_eq!(agg.min.value, true_min, "{}", metric.as_str());
            let mean: f64 = records.iter().map(|r| r.normalized.get(metric)).sum::<f64>()
                / records.len() as f64;
            assert!((agg.mean - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_aggregate_ties_go_to_first_in_input_order() {
        let inputs = vec![raw("first", [0.5; 6]), raw("second", [0.5; 6])];
        let records: Vec<ModelRecord> = inputs
            .iter()
            .map(|r| normalize_record(r, &unit_baselines()).unwrap())
            .collect();
        let aggregates = compute_aggregates(&records).unwrap();
        for metric in MetricId::ALL {
            assert_eq!(aggregates.get(metric).max.model, "first");
            assert_eq!(aggregates.get(metric).min.model, "first");
        }
    }

    #[test]
    fn test_idempotent_except_timestamp() {
        let inputs = vec![
            raw("gamma", [0.6, 0.7, 0.4, 0.9, 0.3, 0.8]),
            raw("beta", [0.8, 0.5, 0.6, 0.7, 0.9, 0.2]),
        ];
        let a = aggregate(&inputs, &unit_baselines(), "run-1".to_string()).unwrap();
        let b = aggregate(&inputs, &unit_baselines(), "run-2".to_string()).unwrap();
        let mut va = serde_json::to_value(&a).unwrap();
        let mut vb = serde_json::to_value(&b).unwrap();
        assert_ne!(va["timestamp"], vb["timestamp"]);
        va["timestamp"] = serde_json::Value::Null;
        vb["timestamp"] = serde_json::Value::Null;
        assert_eq!(va, vb);
    }

    #[test]
    fn test_empty_input_is_incomplete_snapshot() {
        let err = aggregate(&[], &unit_baselines(), "t0".to_string()).unwrap_err();
        assert!(matches!(err, AggregateError::IncompleteSnapshot(_)));
    }

    #[test]
    fn test_build_snapshot_rejects_missing_components() {
        let record = normalize_record(&raw("m", [0.5; 6]), &unit_baselines()).unwrap();
        let aggregates = compute_aggregates(std::slice::from_ref(&record)).unwrap();
        let err = build_snapshot(
            vec![record],
            aggregates,
            0.5,
            String::new(),
            "t0".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, AggregateError::IncompleteSnapshot(_)));
    }
}
