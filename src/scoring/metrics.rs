use serde::Serialize;

use crate::scoring::join::{ConfusionCounts, JoinOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub yes_percentage: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ZeroMatchPolicy {
    Zeroed,
    Omit,
}

impl MetricsRecord {
    pub fn from_counts(counts: &ConfusionCounts, matched_affirmative: usize) -> Option<Self> {
        let total = counts.total();
        if total == 0 {
            return None;
        }

        let precision = ratio(
            counts.true_positives,
            counts.true_positives + counts.false_positives,
        );
        let recall = ratio(
            counts.true_positives,
            counts.true_positives + counts.false_negatives,
        );
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Some(Self {
            accuracy: ratio(counts.true_positives + counts.true_negatives, total),
            precision,
            recall,
            f1,
            yes_percentage: ratio(matched_affirmative, total) * 100.0,
        })
    }

    pub fn mean(records: &[MetricsRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let count = records.len() as f64;
        let sum = records.iter().fold(Self::default(), |acc, record| Self {
            accuracy: acc.accuracy + record.accuracy,
            precision: acc.precision + record.precision,
            recall: acc.recall + record.recall,
            f1: acc.f1 + record.f1,
            yes_percentage: acc.yes_percentage + record.yes_percentage,
        });

        Some(Self {
            accuracy: sum.accuracy / count,
            precision: sum.precision / count,
            recall: sum.recall / count,
            f1: sum.f1 / count,
            yes_percentage: sum.yes_percentage / count,
        })
    }
}

pub fn derive_metrics(outcome: &JoinOutcome, policy: ZeroMatchPolicy) -> Option<MetricsRecord> {
    match MetricsRecord::from_counts(&outcome.counts, outcome.matched_affirmative) {
        Some(metrics) => Some(metrics),
        None => match policy {
            ZeroMatchPolicy::Zeroed => Some(MetricsRecord::default()),
            ZeroMatchPolicy::Omit => None,
        },
    }
}

pub fn overall_yes_percentage(outcome: &JoinOutcome) -> f64 {
    ratio(outcome.affirmative_response_count, outcome.response_count) * 100.0
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
