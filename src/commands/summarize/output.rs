use super::*;

const CSV_COLUMNS: [&str; 8] = [
    "File",
    "Type",
    "Template",
    "Precision",
    "Recall",
    "F1 Score",
    "Accuracy",
    "Yes (%)",
];

pub fn csv_header(include_dataset: bool) -> Vec<&'static str> {
    let mut header = Vec::with_capacity(CSV_COLUMNS.len() + 1);
    if include_dataset {
        header.push("Dataset");
    }
    header.extend(CSV_COLUMNS);
    header
}

pub fn write_csv(path: &Path, rows: &[SummaryRow], include_dataset: bool) -> Result<()> {
    ensure_parent_directory(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer
        .write_record(csv_header(include_dataset))
        .with_context(|| format!("failed to write header to {}", path.display()))?;

    for row in rows {
        let mut record = Vec::with_capacity(CSV_COLUMNS.len() + 1);
        if include_dataset {
            record.push(row.dataset.clone());
        }
        record.extend([
            row.file.clone(),
            row.question_type.clone(),
            row.template.clone(),
            format!("{:?}", row.metrics.precision),
            format!("{:?}", row.metrics.recall),
            format!("{:?}", row.metrics.f1),
            format!("{:?}", row.metrics.accuracy),
            format!("{:?}", row.metrics.yes_percentage),
        ]);
        writer
            .write_record(&record)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

pub fn write_table<W: Write>(
    output: &mut W,
    rows: &[SummaryRow],
    include_dataset: bool,
) -> Result<()> {
    let dataset_header = if include_dataset {
        format!("{:<12} ", "Dataset")
    } else {
        String::new()
    };
    let header = format!(
        "{dataset_header}{:<55} {:<15} {:<15} {:<10} {:<10} {:<10} {:<10} {:<10}",
        "File", "Type", "Template", "Prec", "Rec", "F1", "Acc", "Yes%"
    );
    writeln!(output, "{header}")?;
    writeln!(output, "{}", "-".repeat(header.len()))?;

    for row in rows {
        if include_dataset {
            write!(output, "{:<12} ", row.dataset)?;
        }
        writeln!(
            output,
            "{:<55} {:<15} {:<15} {:<10.4} {:<10.4} {:<10.4} {:<10.4} {:.2}",
            row.file,
            row.question_type,
            row.template,
            row.metrics.precision,
            row.metrics.recall,
            row.metrics.f1,
            row.metrics.accuracy,
            row.metrics.yes_percentage
        )?;
    }

    Ok(())
}
