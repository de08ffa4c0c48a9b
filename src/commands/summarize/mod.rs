use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use regex::Regex;
use tracing::{info, warn};

use crate::cli::SummarizeArgs;
use crate::error::EvalError;
use crate::model::{ScoredSource, SkippedSource, SummaryConfig, SummaryManifest, SummaryRowRecord};
use crate::scoring::{MetricsRecord, ZeroMatchPolicy, derive_metrics, score_files};
use crate::util::{ensure_parent_directory, now_utc_string, sha256_file, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

mod aggregate;
mod discovery;
mod output;
mod run;

pub use run::run;

use aggregate::*;
use discovery::*;
use output::*;
