// ============================================================
// Layer 4 — Tokenized Dataset
// ============================================================
// Wraps a prepared table and a configured tokenizer into an
// indexable collection. Row i is tokenized when it is asked
// for, so worker threads do the tokenizing in parallel.
//
// Labels are validated once, up front: a dataset never holds
// a row that cannot become a training sample.

use std::sync::Arc;

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::record::{parse_label, PreparedTable, LABEL};
use crate::domain::traits::TextEncoder;
use crate::error::{DataError, Result};

/// One tokenized row: ids, parallel attention mask and class id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextClsSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          i64,
}

impl TextClsSample {
    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }

    /// Number of non-padding positions.
    pub fn real_tokens(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

pub struct TextClsDataset {
    texts:   Vec<String>,
    labels:  Vec<i64>,
    encoder: Arc<dyn TextEncoder>,
}

impl TextClsDataset {
    /// Fails if any label is missing or not an integer class id.
    pub fn new(prepared: &PreparedTable, encoder: Arc<dyn TextEncoder>) -> Result<Self> {
        let labels = prepared
            .table()
            .require_column(LABEL)?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                raw.and_then(parse_label).ok_or_else(|| DataError::InvalidLabel {
                    row,
                    value: raw.map(str::to_string),
                })
            })
            .collect::<Result<Vec<i64>>>()?;

        Ok(Self {
            texts: prepared.texts().to_vec(),
            labels,
            encoder,
        })
    }

    /// Tokenize row `index`.
    pub fn sample(&self, index: usize) -> Result<TextClsSample> {
        let (text, &label) = self
            .texts
            .get(index)
            .zip(self.labels.get(index))
            .ok_or_else(|| {
                DataError::Config(format!(
                    "sample index {} is out of range for {} rows",
                    index,
                    self.texts.len()
                ))
            })?;

        let enc = self.encoder.encode(text)?;
        Ok(TextClsSample {
            input_ids:      enc.ids,
            attention_mask: enc.attention_mask,
            label,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.texts.len()
    }
}

impl Dataset<TextClsSample> for TextClsDataset {
    fn get(&self, index: usize) -> Option<TextClsSample> {
        match self.sample(index) {
            Ok(sample) => Some(sample),
            Err(DataError::Config(_)) => None,
            Err(e) => {
                tracing::warn!("Cannot tokenize row {}: {}", index, e);
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.texts.len()
    }
}
