use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pope-eval",
    version,
    about = "Yes/no probe scoring for 3D vision-language models"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one results file against one ground-truth file.
    Score(ScoreArgs),
    /// Score every discovered results file and write a summary table.
    Summarize(SummarizeArgs),
    /// Launch the external inference job for a ground-truth file.
    Probe(ProbeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Results JSON file
    pub results_file: Option<PathBuf>,

    /// Ground-truth JSON file
    pub gt_file: Option<PathBuf>,

    /// Results JSON file; takes precedence over the positional argument
    #[arg(long = "results")]
    pub results: Option<PathBuf>,

    /// Ground-truth JSON file; takes precedence over the positional argument
    #[arg(long = "gt")]
    pub gt: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    /// Directory holding results files; may contain `{dataset}`
    #[arg(long, default_value = "eval_results")]
    pub results_dir: String,

    /// Directory holding ground-truth files; may contain `{dataset}`
    #[arg(long, default_value = "scannet_{dataset}")]
    pub gt_dir: String,

    /// Results filename prefix before `_<type>_<template>.json`; may contain `{dataset}`
    #[arg(long, default_value = "leo-sft_noact_{dataset}")]
    pub prefix: String,

    /// Dataset to summarize, in report order. Repeat for several datasets.
    #[arg(long = "dataset", default_values_t = [String::from("scannet200")])]
    pub datasets: Vec<String>,

    #[arg(long, default_value = "validation_summary.csv")]
    pub output: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Ground-truth JSON file whose questions are sent to the model
    pub json_file: PathBuf,

    /// Directory the launcher runs in
    #[arg(long, default_value = "embodied-generalist")]
    pub launcher_dir: PathBuf,

    #[arg(long, default_value = "sft_noact")]
    pub model_name: String,

    /// Checkpoint directory; defaults to `<launcher-dir>/<model-name>`
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    #[arg(long, default_value = "python")]
    pub python: String,

    #[arg(long, default_value = "lmsys/vicuna-7b-v1.1")]
    pub llm_config: String,

    #[arg(long, default_value = "./pointnetpp_vil3dref.pth")]
    pub backbone_path: String,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
