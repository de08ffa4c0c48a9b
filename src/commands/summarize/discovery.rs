use super::*;

const DATASET_PLACEHOLDER: &str = "{dataset}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub dataset: String,
    pub results_dir: PathBuf,
    pub gt_dir: PathBuf,
    pub prefix: String,
}

impl DatasetLayout {
    pub fn resolve(args: &SummarizeArgs, dataset: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            results_dir: PathBuf::from(expand_dataset(&args.results_dir, dataset)),
            gt_dir: PathBuf::from(expand_dataset(&args.gt_dir, dataset)),
            prefix: expand_dataset(&args.prefix, dataset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub dataset: String,
    pub filename: String,
    pub question_type: String,
    pub template: String,
    pub results_path: PathBuf,
    pub gt_path: PathBuf,
}

pub fn expand_dataset(template: &str, dataset: &str) -> String {
    template.replace(DATASET_PLACEHOLDER, dataset)
}

pub fn result_filename_regex(prefix: &str) -> Result<Regex> {
    Regex::new(&format!(
        r"^{}_(.+?)_(template_\d+)\.json$",
        regex::escape(prefix)
    ))
    .with_context(|| format!("failed to compile results filename regex for prefix {prefix}"))
}

pub fn parse_result_filename(
    filename: &str,
    pattern: &Regex,
) -> std::result::Result<(String, String), EvalError> {
    let captures = pattern
        .captures(filename)
        .ok_or_else(|| EvalError::PatternMismatch {
            filename: filename.to_string(),
        })?;

    match (captures.get(1), captures.get(2)) {
        (Some(question_type), Some(template)) => Ok((
            question_type.as_str().to_string(),
            template.as_str().to_string(),
        )),
        _ => Err(EvalError::PatternMismatch {
            filename: filename.to_string(),
        }),
    }
}

pub fn discover_pairs(
    layout: &DatasetLayout,
) -> Result<Vec<std::result::Result<FilePair, EvalError>>> {
    let results_dir = layout.results_dir.display().to_string();
    let glob_pattern = format!(
        "{}/{}_*.json",
        Pattern::escape(&results_dir),
        Pattern::escape(&layout.prefix)
    );
    let filename_pattern = result_filename_regex(&layout.prefix)?;

    let entries = glob::glob(&glob_pattern)
        .with_context(|| format!("invalid results glob pattern: {glob_pattern}"))?
        .map(|entry| {
            entry.map_err(|err| EvalError::UnreadableEntry {
                path: err.path().to_path_buf(),
                reason: err.error().to_string(),
            })
        });

    Ok(pair_entries(layout, &filename_pattern, entries))
}

pub fn pair_entries(
    layout: &DatasetLayout,
    filename_pattern: &Regex,
    entries: impl IntoIterator<Item = std::result::Result<PathBuf, EvalError>>,
) -> Vec<std::result::Result<FilePair, EvalError>> {
    let mut pairs = Vec::new();
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => {
                warn!(
                    dataset = %layout.dataset,
                    error = %err,
                    "skipping unreadable results entry"
                );
                pairs.push(Err(err));
            }
        }
    }
    paths.sort();

    for path in paths {
        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            warn!(path = %path.display(), "skipping results file with non UTF-8 name");
            continue;
        };
        let filename = filename.to_string();

        let entry = parse_result_filename(&filename, filename_pattern).map(
            |(question_type, template)| FilePair {
                dataset: layout.dataset.clone(),
                gt_path: layout
                    .gt_dir
                    .join(format!("{question_type}_{template}.json")),
                results_path: path.clone(),
                filename,
                question_type,
                template,
            },
        );
        pairs.push(entry);
    }

    pairs
}
