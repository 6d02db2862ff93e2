// ============================================================
// Layer 2 — Preparation Configuration
// ============================================================
// Every tunable of a preparation run in one serialisable
// struct. Saved next to the frozen split so a later run can
// rebuild exactly the same loaders.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::dataloader::LoaderOptions;
use crate::data::splitter::{SplitOptions, TRAIN_CSV, VAL_CSV};
use crate::domain::record::{DESCRIPTION, LABEL, TITLE};
use crate::domain::traits::PaddingPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    // ── Paths ─────────────────────────────────────────────────────────────────
    pub input_csv:     PathBuf,
    pub split_json:    PathBuf,
    pub processed_dir: PathBuf,
    pub train_csv:     PathBuf,
    pub val_csv:       PathBuf,

    // ── Split ─────────────────────────────────────────────────────────────────
    pub seed:        u64,
    pub train_ratio: f64,
    pub val_ratio:   f64,
    pub label_field: String,

    // ── Text ──────────────────────────────────────────────────────────────────
    pub text_fields: Vec<String>,
    pub sep:         String,
    pub lowercase:   bool,

    // ── Tokenizer ─────────────────────────────────────────────────────────────
    /// Path or hub name. None builds a word-level tokenizer from the
    /// training texts under `tokenizer_dir`.
    pub tokenizer:     Option<String>,
    pub tokenizer_dir: PathBuf,
    pub vocab_size:    usize,
    pub max_length:    usize,
    pub padding:       PaddingPolicy,

    // ── Loaders ───────────────────────────────────────────────────────────────
    pub batch_size:    usize,
    pub num_workers:   usize,
    pub shuffle_train: bool,
    pub shuffle_seed:  u64,
}

impl Default for PrepConfig {
    fn default() -> Self {
        let processed = PathBuf::from("data/processed");
        Self {
            input_csv:     PathBuf::from("data/raw/train.csv"),
            split_json:    PathBuf::from("data/splits/split.json"),
            train_csv:     processed.join(TRAIN_CSV),
            val_csv:       processed.join(VAL_CSV),
            processed_dir: processed,

            seed:        42,
            train_ratio: 0.90,
            val_ratio:   0.10,
            label_field: LABEL.to_string(),

            text_fields: vec![TITLE.to_string(), DESCRIPTION.to_string()],
            sep:         " ".to_string(),
            lowercase:   false,

            tokenizer:     None,
            tokenizer_dir: PathBuf::from("data/tokenizer"),
            vocab_size:    30_000,
            max_length:    256,
            padding:       PaddingPolicy::MaxLength,

            batch_size:    32,
            num_workers:   2,
            shuffle_train: true,
            shuffle_seed:  42,
        }
    }
}

impl From<&PrepConfig> for SplitOptions {
    fn from(c: &PrepConfig) -> Self {
        SplitOptions {
            seed:        c.seed,
            train_ratio: c.train_ratio,
            val_ratio:   c.val_ratio,
            label_field: c.label_field.clone(),
        }
    }
}

impl From<&PrepConfig> for LoaderOptions {
    fn from(c: &PrepConfig) -> Self {
        LoaderOptions {
            text_fields:   c.text_fields.clone(),
            sep:           c.sep.clone(),
            lowercase:     c.lowercase,
            batch_size:    c.batch_size,
            num_workers:   c.num_workers,
            shuffle_train: c.shuffle_train,
            shuffle_seed:  c.shuffle_seed,
        }
    }
}
