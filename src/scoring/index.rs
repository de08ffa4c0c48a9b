use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::error::{EvalError, InputRole};
use crate::model::{GroundTruthItem, PredictionItem};
use crate::scoring::normalize;
use crate::util::read_json;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QuestionKey {
    pub scene_id: String,
    pub question: String,
}

impl QuestionKey {
    pub fn new(scene_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            question: question.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GroundTruthIndex {
    entries: Vec<(QuestionKey, String)>,
    positions: HashMap<QuestionKey, usize>,
}

impl GroundTruthIndex {
    pub fn build(items: &[GroundTruthItem]) -> Result<Self> {
        let mut index = Self::default();
        for (position, item) in items.iter().enumerate() {
            let first_turn = item.conversations.first().with_context(|| {
                format!(
                    "ground-truth item {position} (scene {}) has no conversations",
                    item.scene_id
                )
            })?;
            let key = QuestionKey::new(
                item.scene_id.clone(),
                normalize::ground_truth_question(&first_turn.value),
            );
            index.insert(key, normalize::ground_truth_answer(&item.ground_truth_answer));
        }
        Ok(index)
    }

    pub fn insert(&mut self, key: QuestionKey, answer: String) -> Option<String> {
        match self.positions.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, answer)),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, answer));
                None
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &QuestionKey) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionKey, &str)> {
        self.entries
            .iter()
            .map(|(key, answer)| (key, answer.as_str()))
    }
}

#[derive(Debug, Default)]
pub struct ResultsIndex {
    responses: HashMap<QuestionKey, Vec<String>>,
    response_count: usize,
}

impl ResultsIndex {
    pub fn build(predictions: &[PredictionItem]) -> Self {
        let mut index = Self::default();
        for prediction in predictions {
            index.push(
                QuestionKey::new(
                    prediction.scene_id.clone(),
                    normalize::prediction_question(&prediction.instruction),
                ),
                normalize::prediction_response(&prediction.response),
            );
        }
        index
    }

    pub fn push(&mut self, key: QuestionKey, response: String) {
        self.responses.entry(key).or_default().push(response);
        self.response_count += 1;
    }

    pub fn latest(&self, key: &QuestionKey) -> Option<&str> {
        self.responses
            .get(key)
            .and_then(|responses| responses.last())
            .map(String::as_str)
    }

    #[cfg(test)]
    pub fn responses(&self, key: &QuestionKey) -> Option<&[String]> {
        self.responses.get(key).map(Vec::as_slice)
    }

    pub fn response_count(&self) -> usize {
        self.response_count
    }

    pub fn affirmative_count(&self) -> usize {
        self.responses
            .values()
            .flatten()
            .filter(|response| normalize::is_affirmative(response))
            .count()
    }
}

pub fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruthItem>> {
    read_json(path, InputRole::GroundTruth)
}

pub fn load_predictions(path: &Path) -> Result<Vec<PredictionItem>> {
    let payload: Value = read_json(path, InputRole::Results)?;
    flatten_predictions(payload, path)
}

pub fn flatten_predictions(payload: Value, source: &Path) -> Result<Vec<PredictionItem>> {
    let raw_items = match payload {
        Value::Array(items) => items,
        Value::Object(groups) => groups
            .into_iter()
            .filter_map(|(_, group)| match group {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .flatten()
            .collect(),
        other => {
            return Err(EvalError::UnsupportedFormat {
                path: source.to_path_buf(),
                found: json_kind(&other),
            }
            .into());
        }
    };

    raw_items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            serde_json::from_value::<PredictionItem>(item).with_context(|| {
                format!(
                    "invalid prediction at position {position} in {}",
                    source.display()
                )
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
