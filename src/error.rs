use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    GroundTruth,
    Results,
}

impl InputRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GroundTruth => "ground truth",
            Self::Results => "results",
        }
    }
}

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("{} file not found: {}", .role.as_str(), .path.display())]
    FileNotFound { role: InputRole, path: PathBuf },

    #[error(
        "unsupported results format in {}: expected array or object of arrays, found {found}",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf, found: &'static str },

    #[error("no predictions matched the {ground_truth} ground-truth items")]
    NoMatches { ground_truth: usize },

    #[error("filename does not match expected pattern: {filename}")]
    PatternMismatch { filename: String },

    #[error("failed to read results entry {}: {reason}", .path.display())]
    UnreadableEntry { path: PathBuf, reason: String },
}
