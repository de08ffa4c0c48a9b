use super::*;

pub const AVERAGE_TEMPLATE: &str = "AVERAGE";
pub const ALL_DATASETS: &str = "ALL";

const QUESTION_TYPE_ORDER: [&str; 3] = ["random", "popular", "adversarial"];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub dataset: String,
    pub file: String,
    pub question_type: String,
    pub template: String,
    pub is_average: bool,
    pub metrics: MetricsRecord,
}

impl SummaryRow {
    pub fn scored(pair: &FilePair, metrics: MetricsRecord) -> Self {
        Self {
            dataset: pair.dataset.clone(),
            file: pair.filename.clone(),
            question_type: pair.question_type.clone(),
            template: pair.template.clone(),
            is_average: false,
            metrics,
        }
    }

    fn average(dataset: &str, question_type: &str, metrics: MetricsRecord) -> Self {
        Self {
            dataset: dataset.to_string(),
            file: format!("AVERAGE_{question_type}"),
            question_type: question_type.to_string(),
            template: AVERAGE_TEMPLATE.to_string(),
            is_average: true,
            metrics,
        }
    }

    pub fn to_record(&self, include_dataset: bool) -> SummaryRowRecord {
        SummaryRowRecord {
            dataset: include_dataset.then(|| self.dataset.clone()),
            file: self.file.clone(),
            question_type: self.question_type.clone(),
            template: self.template.clone(),
            is_average: self.is_average,
            metrics: self.metrics,
        }
    }
}

pub fn with_averages(mut rows: Vec<SummaryRow>, cross_dataset: bool) -> Vec<SummaryRow> {
    let scored = rows
        .iter()
        .filter(|row| !row.is_average)
        .collect::<Vec<_>>();

    let per_dataset = group_metrics(
        scored
            .iter()
            .map(|row| ((row.dataset.clone(), row.question_type.clone()), row.metrics)),
    );
    let per_type = if cross_dataset {
        group_metrics(
            scored
                .iter()
                .map(|row| (row.question_type.clone(), row.metrics)),
        )
    } else {
        Vec::new()
    };

    let mut averages = Vec::new();
    for ((dataset, question_type), metrics) in per_dataset {
        if let Some(mean) = MetricsRecord::mean(&metrics) {
            averages.push(SummaryRow::average(&dataset, &question_type, mean));
        }
    }
    for (question_type, metrics) in per_type {
        if let Some(mean) = MetricsRecord::mean(&metrics) {
            averages.push(SummaryRow::average(ALL_DATASETS, &question_type, mean));
        }
    }

    rows.extend(averages);
    rows
}

fn group_metrics<K>(
    entries: impl Iterator<Item = (K, MetricsRecord)>,
) -> Vec<(K, Vec<MetricsRecord>)>
where
    K: Clone + Eq + std::hash::Hash,
{
    let mut positions = HashMap::<K, usize>::new();
    let mut groups = Vec::<(K, Vec<MetricsRecord>)>::new();
    for (key, metrics) in entries {
        match positions.get(&key) {
            Some(&slot) => groups[slot].1.push(metrics),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, vec![metrics]));
            }
        }
    }
    groups
}

pub fn sort_rows(rows: &mut [SummaryRow], dataset_order: &[String]) {
    rows.sort_by_key(|row| {
        (
            dataset_rank(&row.dataset, dataset_order),
            question_type_rank(&row.question_type),
            template_rank(row),
        )
    });
}

fn dataset_rank(dataset: &str, dataset_order: &[String]) -> usize {
    if dataset == ALL_DATASETS {
        return usize::MAX;
    }
    dataset_order
        .iter()
        .position(|known| known == dataset)
        .unwrap_or(dataset_order.len())
}

pub fn question_type_rank(question_type: &str) -> usize {
    QUESTION_TYPE_ORDER
        .iter()
        .position(|known| *known == question_type)
        .unwrap_or(QUESTION_TYPE_ORDER.len())
}

fn template_rank(row: &SummaryRow) -> u64 {
    if row.is_average {
        return u64::MAX;
    }
    row.template
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}
