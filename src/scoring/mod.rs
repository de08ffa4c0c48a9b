use std::path::Path;

use anyhow::Result;

use crate::model::{GroundTruthItem, PredictionItem};

mod index;
mod join;
mod metrics;
pub mod normalize;

pub use index::{GroundTruthIndex, ResultsIndex, load_ground_truth, load_predictions};
pub use join::{ConfusionCounts, JoinOutcome, join};
pub use metrics::{MetricsRecord, ZeroMatchPolicy, derive_metrics, overall_yes_percentage};

pub fn score(
    ground_truth: &[GroundTruthItem],
    predictions: &[PredictionItem],
) -> Result<JoinOutcome> {
    let ground_truth = GroundTruthIndex::build(ground_truth)?;
    let results = ResultsIndex::build(predictions);
    Ok(join(&ground_truth, &results))
}

pub fn score_files(ground_truth_path: &Path, results_path: &Path) -> Result<JoinOutcome> {
    let ground_truth = load_ground_truth(ground_truth_path)?;
    let predictions = load_predictions(results_path)?;
    score(&ground_truth, &predictions)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::error::{EvalError, InputRole};

    fn ground_truth_fixture() -> Vec<GroundTruthItem> {
        serde_json::from_value(json!([
            {
                "scene_id": "s1",
                "conversations": [
                    { "from": "human", "value": "is there a chair\n<image>" },
                    { "from": "gpt", "value": "Yes" }
                ],
                "ground_truth_answer": "Yes"
            },
            {
                "scene_id": "s1",
                "conversations": [{ "from": "human", "value": "<image>is there a lamp" }],
                "ground_truth_answer": "no"
            }
        ]))
        .expect("ground truth fixture")
    }

    fn flat_predictions() -> Vec<PredictionItem> {
        serde_json::from_value(json!([
            { "scene_id": "s1", "instruction": "is there a chair", "response": "Yes." },
            { "scene_id": "s1", "instruction": "is there a lamp", "response": "Yes." }
        ]))
        .expect("prediction fixture")
    }

    #[test]
    fn chair_and_lamp_scenario_produces_expected_metrics() {
        let outcome = score(&ground_truth_fixture(), &flat_predictions()).expect("score");

        assert_eq!(outcome.counts.true_positives, 1);
        assert_eq!(outcome.counts.false_negatives, 0);
        assert_eq!(outcome.counts.false_positives, 1);
        assert_eq!(outcome.counts.true_negatives, 0);

        let metrics = derive_metrics(&outcome, ZeroMatchPolicy::Omit).expect("metrics");
        assert!((metrics.accuracy - 0.5).abs() < 1e-12);
        assert!((metrics.precision - 0.5).abs() < 1e-12);
        assert!((metrics.recall - 1.0).abs() < 1e-12);
        assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.yes_percentage - 100.0).abs() < 1e-12);
    }

    #[test]
    fn scoring_is_order_independent_and_idempotent() {
        let ground_truth = ground_truth_fixture();
        let mut predictions = flat_predictions();

        let first = score(&ground_truth, &predictions).expect("score");
        let second = score(&ground_truth, &predictions).expect("score");
        assert_eq!(first, second);

        predictions.reverse();
        let mut reversed_truth = ground_truth.clone();
        reversed_truth.reverse();
        let reordered = score(&reversed_truth, &predictions).expect("score");
        assert_eq!(reordered.counts, first.counts);
        assert_eq!(reordered.matched_count, first.matched_count);
        assert_eq!(
            derive_metrics(&reordered, ZeroMatchPolicy::Zeroed),
            derive_metrics(&first, ZeroMatchPolicy::Zeroed)
        );
    }

    #[test]
    fn empty_results_take_the_zero_match_path() {
        let outcome = score(&ground_truth_fixture(), &[]).expect("score");

        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.missing_count, 2);
        assert_eq!(outcome.missing_examples.len(), 2);
        assert_eq!(derive_metrics(&outcome, ZeroMatchPolicy::Omit), None);
        assert_eq!(
            derive_metrics(&outcome, ZeroMatchPolicy::Zeroed),
            Some(MetricsRecord::default())
        );
        assert_eq!(overall_yes_percentage(&outcome), 0.0);
    }

    #[test]
    fn object_of_arrays_matches_like_flat_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gt_path = dir.path().join("gt.json");
        let grouped_path = dir.path().join("grouped.json");
        let flat_path = dir.path().join("flat.json");

        fs::write(
            &gt_path,
            serde_json::to_vec(&ground_truth_fixture()).expect("serialize gt"),
        )
        .expect("write gt");
        fs::write(
            &grouped_path,
            serde_json::to_vec(&json!({
                "run_a": [{ "scene_id": "s1", "instruction": "is there a chair", "response": "Yes." }],
                "run_b": [{ "scene_id": "s1", "instruction": "is there a lamp", "response": "Yes." }]
            }))
            .expect("serialize grouped"),
        )
        .expect("write grouped");
        fs::write(
            &flat_path,
            serde_json::to_vec(&flat_predictions()).expect("serialize flat"),
        )
        .expect("write flat");

        let grouped = score_files(&gt_path, &grouped_path).expect("grouped score");
        let flat = score_files(&gt_path, &flat_path).expect("flat score");
        assert_eq!(grouped.matched_count, 2);
        assert_eq!(grouped.counts, flat.counts);
    }

    #[test]
    fn score_files_reports_missing_ground_truth_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = score_files(&dir.path().join("gt.json"), &dir.path().join("res.json"))
            .expect_err("missing files should fail");

        match err.downcast_ref::<EvalError>() {
            Some(EvalError::FileNotFound { role, .. }) => {
                assert_eq!(*role, InputRole::GroundTruth)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
