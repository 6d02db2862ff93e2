// Shared fixtures for unit tests.

use crate::domain::record::{RecordTable, DESCRIPTION, LABEL, TITLE};
use crate::domain::traits::{Encoded, PaddingPolicy, TextEncoder};
use crate::error::Result;

/// Build a (label, title, description) table from literal cells.
pub fn table(rows: &[(Option<&str>, Option<&str>, Option<&str>)]) -> RecordTable {
    let columns = vec![LABEL.to_string(), TITLE.to_string(), DESCRIPTION.to_string()];
    let rows = rows
        .iter()
        .map(|(l, t, d)| {
            vec![
                l.map(str::to_string),
                t.map(str::to_string),
                d.map(str::to_string),
            ]
        })
        .collect();
    RecordTable::new(columns, rows).expect("fixture rows match columns")
}

/// A clean table with `per_label` rows for each of `labels` classes.
/// Every title and description is unique.
pub fn balanced_table(labels: usize, per_label: usize) -> RecordTable {
    let columns = vec![LABEL.to_string(), TITLE.to_string(), DESCRIPTION.to_string()];
    let mut rows = Vec::new();
    for i in 0..per_label {
        for label in 0..labels {
            rows.push(vec![
                Some(label.to_string()),
                Some(format!("title {label}-{i}")),
                Some(format!("description {label}-{i}")),
            ]);
        }
    }
    RecordTable::new(columns, rows).expect("fixture rows match columns")
}

/// Encoder whose token id is the character length of each word.
/// Truncates to `max_length` and pads with 0 under `MaxLength`.
pub struct WordLengthEncoder {
    max_length: usize,
    padding:    PaddingPolicy,
}

impl WordLengthEncoder {
    pub fn new(max_length: usize, padding: PaddingPolicy) -> Self {
        Self { max_length, padding }
    }
}

impl TextEncoder for WordLengthEncoder {
    fn encode(&self, text: &str) -> Result<Encoded> {
        let mut ids: Vec<u32> = text
            .split_whitespace()
            .map(|w| w.chars().count() as u32)
            .take(self.max_length)
            .collect();
        let mut attention_mask = vec![1; ids.len()];
        if self.padding == PaddingPolicy::MaxLength {
            ids.resize(self.max_length, 0);
            attention_mask.resize(self.max_length, 0);
        }
        Ok(Encoded { ids, attention_mask })
    }

    fn pad_id(&self) -> u32 {
        0
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    fn padding(&self) -> PaddingPolicy {
        self.padding
    }
}
