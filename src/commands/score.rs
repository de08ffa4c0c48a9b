use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::ScoreArgs;
use crate::error::EvalError;
use crate::scoring::{
    ConfusionCounts, JoinOutcome, MetricsRecord, ZeroMatchPolicy, derive_metrics,
    overall_yes_percentage, score_files,
};

#[derive(Debug, Clone)]
pub struct ScoreDefaults {
    pub results_path: PathBuf,
    pub gt_path: PathBuf,
}

impl Default for ScoreDefaults {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from(
                "eval_results/leo-sft_noact_adversarial_template_1/probe/results.json",
            ),
            gt_path: PathBuf::from("scannet_scannet200/adversarial_template_1.json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    results_file: String,
    ground_truth_file: String,
    ground_truth_count: usize,
    matched_count: usize,
    missing_count: usize,
    counts: ConfusionCounts,
    metrics: Option<MetricsRecord>,
    yes_percentage_all: f64,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    let (results_path, gt_path) = resolve_paths(&args, &ScoreDefaults::default());

    info!(path = %results_path.display(), "using results file");
    info!(path = %gt_path.display(), "using ground truth file");

    let outcome = score_files(&gt_path, &results_path)?;
    for key in &outcome.missing_examples {
        warn!(
            scene_id = %key.scene_id,
            question = %key.question,
            "missing result for ground-truth item"
        );
    }

    let metrics = derive_metrics(&outcome, ZeroMatchPolicy::Omit);
    if metrics.is_none() {
        let err = EvalError::NoMatches {
            ground_truth: outcome.ground_truth_count,
        };
        warn!(error = %err, "metrics omitted");
    }

    let report = build_report(&results_path, &gt_path, &outcome, metrics);
    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &report)
            .context("failed to serialize score json output")?;
        writeln!(output)?;
    } else {
        write_text_report(&mut output, &report)?;
    }
    output.flush()?;

    Ok(())
}

fn resolve_paths(args: &ScoreArgs, defaults: &ScoreDefaults) -> (PathBuf, PathBuf) {
    let results = args
        .results
        .clone()
        .or_else(|| args.results_file.clone())
        .unwrap_or_else(|| defaults.results_path.clone());
    let gt = args
        .gt
        .clone()
        .or_else(|| args.gt_file.clone())
        .unwrap_or_else(|| defaults.gt_path.clone());
    (results, gt)
}

fn build_report(
    results_path: &Path,
    gt_path: &Path,
    outcome: &JoinOutcome,
    metrics: Option<MetricsRecord>,
) -> ScoreReport {
    ScoreReport {
        results_file: results_path.display().to_string(),
        ground_truth_file: gt_path.display().to_string(),
        ground_truth_count: outcome.ground_truth_count,
        matched_count: outcome.matched_count,
        missing_count: outcome.missing_count,
        counts: outcome.counts,
        metrics,
        yes_percentage_all: overall_yes_percentage(outcome),
    }
}

fn write_text_report<W: Write>(output: &mut W, report: &ScoreReport) -> Result<()> {
    let rule = "-".repeat(30);

    writeln!(output, "Ground Truth items: {}", report.ground_truth_count)?;
    writeln!(output, "Matched items: {}", report.matched_count)?;
    writeln!(output, "GT items missing in Results: {}", report.missing_count)?;

    let Some(metrics) = report.metrics else {
        writeln!(output, "No predictions matched with ground truth.")?;
        return Ok(());
    };

    writeln!(output, "{rule}")?;
    writeln!(output, "Metrics (on matched data):")?;
    writeln!(output, "Precision: {:.4}", metrics.precision)?;
    writeln!(output, "Recall: {:.4}", metrics.recall)?;
    writeln!(output, "F1 Score: {:.4}", metrics.f1)?;
    writeln!(output, "Accuracy: {:.4}", metrics.accuracy)?;
    writeln!(output, "Yes (%): {:.2}%", metrics.yes_percentage)?;
    writeln!(
        output,
        "Yes (%) (All results in file): {:.2}%",
        report.yes_percentage_all
    )?;
    writeln!(output, "{rule}")?;
    writeln!(
        output,
        "TP: {}, TN: {}, FP: {}, FN: {}",
        report.counts.true_positives,
        report.counts.true_negatives,
        report.counts.false_positives,
        report.counts.false_negatives
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(
        results_file: Option<&str>,
        gt_file: Option<&str>,
        results: Option<&str>,
        gt: Option<&str>,
    ) -> ScoreArgs {
        ScoreArgs {
            results_file: results_file.map(PathBuf::from),
            gt_file: gt_file.map(PathBuf::from),
            results: results.map(PathBuf::from),
            gt: gt.map(PathBuf::from),
            json: false,
        }
    }

    #[test]
    fn resolve_paths_prefers_flags_then_positionals_then_defaults() {
        let defaults = ScoreDefaults::default();

        let (results, gt) = resolve_paths(
            &args(Some("pos_res.json"), Some("pos_gt.json"), Some("flag_res.json"), None),
            &defaults,
        );
        assert_eq!(results, PathBuf::from("flag_res.json"));
        assert_eq!(gt, PathBuf::from("pos_gt.json"));

        let (results, gt) = resolve_paths(&args(None, None, None, None), &defaults);
        assert_eq!(results, defaults.results_path);
        assert_eq!(gt, defaults.gt_path);
    }

    #[test]
    fn text_report_prints_metrics_and_counts() {
        let outcome = JoinOutcome {
            counts: ConfusionCounts {
                true_positives: 1,
                true_negatives: 0,
                false_positives: 1,
                false_negatives: 0,
            },
            ground_truth_count: 2,
            matched_count: 2,
            matched_affirmative: 2,
            response_count: 2,
            affirmative_response_count: 2,
            ..JoinOutcome::default()
        };
        let metrics = derive_metrics(&outcome, ZeroMatchPolicy::Omit);
        let report = build_report(Path::new("r.json"), Path::new("g.json"), &outcome, metrics);

        let mut buffer = Vec::new();
        write_text_report(&mut buffer, &report).expect("report should render");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.contains("Matched items: 2"));
        assert!(text.contains("Precision: 0.5000"));
        assert!(text.contains("Recall: 1.0000"));
        assert!(text.contains("F1 Score: 0.6667"));
        assert!(text.contains("Yes (%): 100.00%"));
        assert!(text.contains("TP: 1, TN: 0, FP: 1, FN: 0"));
    }

    #[test]
    fn text_report_omits_metrics_without_matches() {
        let outcome = JoinOutcome {
            ground_truth_count: 4,
            missing_count: 4,
            ..JoinOutcome::default()
        };
        let report = build_report(Path::new("r.json"), Path::new("g.json"), &outcome, None);

        let mut buffer = Vec::new();
        write_text_report(&mut buffer, &report).expect("report should render");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.contains("GT items missing in Results: 4"));
        assert!(text.contains("No predictions matched with ground truth."));
        assert!(!text.contains("Precision"));
    }
}
