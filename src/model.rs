use serde::{Deserialize, Serialize};

use crate::scoring::MetricsRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub from: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthItem {
    pub scene_id: String,
    pub conversations: Vec<ConversationTurn>,
    pub ground_truth_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionItem {
    pub scene_id: String,
    pub instruction: String,
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSourceItem {
    #[serde(default)]
    pub scene_id: Option<String>,
    #[serde(default)]
    pub conversations: Option<Vec<ConversationTurn>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryConfig {
    pub datasets: Vec<String>,
    pub results_dir: String,
    pub gt_dir: String,
    pub prefix: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRowRecord {
    pub dataset: Option<String>,
    pub file: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub template: String,
    pub is_average: bool,
    pub metrics: MetricsRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredSource {
    pub dataset: String,
    pub results_file: String,
    pub results_sha256: String,
    pub ground_truth_file: String,
    pub ground_truth_sha256: String,
    pub ground_truth_count: usize,
    pub matched_count: usize,
    pub missing_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub dataset: String,
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub config: SummaryConfig,
    pub row_count: usize,
    pub rows: Vec<SummaryRowRecord>,
    pub sources: Vec<ScoredSource>,
    pub skipped: Vec<SkippedSource>,
}
