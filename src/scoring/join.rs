use serde::Serialize;

use crate::scoring::index::{GroundTruthIndex, QuestionKey, ResultsIndex};
use crate::scoring::normalize::is_affirmative;

pub const MISSING_EXAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    #[serde(rename = "tp")]
    pub true_positives: usize,
    #[serde(rename = "tn")]
    pub true_negatives: usize,
    #[serde(rename = "fp")]
    pub false_positives: usize,
    #[serde(rename = "fn")]
    pub false_negatives: usize,
}

impl ConfusionCounts {
    pub fn record(&mut self, expected_yes: bool, predicted_yes: bool) {
        match (expected_yes, predicted_yes) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_negatives += 1,
            (false, true) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinOutcome {
    pub counts: ConfusionCounts,
    pub ground_truth_count: usize,
    pub matched_count: usize,
    pub missing_count: usize,
    pub matched_affirmative: usize,
    pub missing_examples: Vec<QuestionKey>,
    pub response_count: usize,
    pub affirmative_response_count: usize,
}

pub fn join(ground_truth: &GroundTruthIndex, results: &ResultsIndex) -> JoinOutcome {
    let mut outcome = JoinOutcome {
        ground_truth_count: ground_truth.len(),
        response_count: results.response_count(),
        affirmative_response_count: results.affirmative_count(),
        ..JoinOutcome::default()
    };

    for (key, answer) in ground_truth.iter() {
        let Some(response) = results.latest(key) else {
            outcome.missing_count += 1;
            if outcome.missing_examples.len() < MISSING_EXAMPLE_LIMIT {
                outcome.missing_examples.push(key.clone());
            }
            continue;
        };

        outcome.matched_count += 1;
        let predicted_yes = is_affirmative(response);
        if predicted_yes {
            outcome.matched_affirmative += 1;
        }
        outcome.counts.record(is_affirmative(answer), predicted_yes);
    }

    outcome
}
