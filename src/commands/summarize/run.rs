use super::*;

#[derive(Debug, Default)]
struct SummaryState {
    rows: Vec<SummaryRow>,
    sources: Vec<ScoredSource>,
    skipped: Vec<SkippedSource>,
}

pub fn run(args: SummarizeArgs) -> Result<()> {
    let include_dataset = args.datasets.len() > 1;
    let mut state = SummaryState::default();

    for dataset in &args.datasets {
        let layout = DatasetLayout::resolve(&args, dataset);
        let discovered = match discover_pairs(&layout) {
            Ok(discovered) => discovered,
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(dataset = %dataset, error = %reason, "skipping dataset");
                state.skipped.push(SkippedSource {
                    dataset: dataset.clone(),
                    file: String::new(),
                    reason,
                });
                continue;
            }
        };
        info!(
            dataset = %dataset,
            results_dir = %layout.results_dir.display(),
            count = discovered.len(),
            "found result files"
        );

        for entry in discovered {
            match entry {
                Ok(pair) => score_discovered_pair(&pair, &mut state),
                Err(err) => {
                    warn!(dataset = %dataset, error = %err, "skipping file");
                    state.skipped.push(SkippedSource {
                        dataset: dataset.clone(),
                        file: match &err {
                            EvalError::PatternMismatch { filename } => filename.clone(),
                            EvalError::UnreadableEntry { path, .. } => {
                                path.display().to_string()
                            }
                            _ => String::new(),
                        },
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    let mut rows = with_averages(std::mem::take(&mut state.rows), include_dataset);
    sort_rows(&mut rows, &args.datasets);

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = build_manifest(&args, &rows, state, include_dataset);
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote summary manifest");
    }

    if rows.is_empty() {
        warn!("no data to summarize");
        return Ok(());
    }

    write_csv(&args.output, &rows, include_dataset)?;
    info!(path = %args.output.display(), rows = rows.len(), "summary saved");

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_table(&mut output, &rows, include_dataset)?;
    output.flush()?;

    Ok(())
}

fn score_discovered_pair(pair: &FilePair, state: &mut SummaryState) {
    info!(
        file = %pair.filename,
        gt = %pair.gt_path.display(),
        "processing results file"
    );

    match score_pair(pair) {
        Ok((row, source)) => {
            state.rows.push(row);
            state.sources.push(source);
        }
        Err(err) => {
            let reason = format!("{err:#}");
            warn!(file = %pair.filename, error = %reason, "failed to calculate metrics");
            state.skipped.push(SkippedSource {
                dataset: pair.dataset.clone(),
                file: pair.filename.clone(),
                reason,
            });
        }
    }
}

fn score_pair(pair: &FilePair) -> Result<(SummaryRow, ScoredSource)> {
    let outcome = score_files(&pair.gt_path, &pair.results_path)?;
    if outcome.matched_count == 0 {
        let err = EvalError::NoMatches {
            ground_truth: outcome.ground_truth_count,
        };
        warn!(file = %pair.filename, error = %err, "reporting zero metrics");
    }

    let metrics = derive_metrics(&outcome, ZeroMatchPolicy::Zeroed).unwrap_or_default();
    let source = ScoredSource {
        dataset: pair.dataset.clone(),
        results_file: pair.results_path.display().to_string(),
        results_sha256: sha256_file(&pair.results_path)?,
        ground_truth_file: pair.gt_path.display().to_string(),
        ground_truth_sha256: sha256_file(&pair.gt_path)?,
        ground_truth_count: outcome.ground_truth_count,
        matched_count: outcome.matched_count,
        missing_count: outcome.missing_count,
    };

    Ok((SummaryRow::scored(pair, metrics), source))
}

fn build_manifest(
    args: &SummarizeArgs,
    rows: &[SummaryRow],
    state: SummaryState,
    include_dataset: bool,
) -> SummaryManifest {
    SummaryManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        config: SummaryConfig {
            datasets: args.datasets.clone(),
            results_dir: args.results_dir.clone(),
            gt_dir: args.gt_dir.clone(),
            prefix: args.prefix.clone(),
            output_path: args.output.display().to_string(),
        },
        row_count: rows.len(),
        rows: rows
            .iter()
            .map(|row| row.to_record(include_dataset))
            .collect(),
        sources: state.sources,
        skipped: state.skipped,
    }
}
