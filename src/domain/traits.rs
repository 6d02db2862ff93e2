// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between the pipeline and the outside world:
//
//   RecordSource - anything that can produce a record table
//                  (CsvLoader today)
//   TextEncoder  - anything that turns text into a padded,
//                  truncated id sequence with an attention mask
//                  (HfEncoder over the `tokenizers` crate)
//
// The dataset and batch loader only ever see these traits, so
// tests can plug in a tiny tokenizer built on the fly.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use serde::{Deserialize, Serialize};

use crate::domain::record::RecordTable;
use crate::error::Result;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load a record table.
pub trait RecordSource {
    /// Load the full table. Fails if the source is missing or
    /// lacks the required columns.
    fn load(&self) -> Result<RecordTable>;
}

// ─── TextEncoder ──────────────────────────────────────────────────────────────
/// How encoded sequences are padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingPolicy {
    /// Every sequence is padded to exactly `max_length`.
    #[default]
    MaxLength,
    /// Sequences are left unpadded; the batcher pads each batch
    /// to its longest member.
    Longest,
}

/// Token ids and the parallel attention mask (1 = real token, 0 = padding).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    pub ids:            Vec<u32>,
    pub attention_mask: Vec<u32>,
}

/// A configured tokenizer: fixed truncation length and padding policy.
pub trait TextEncoder: Send + Sync {
    /// Encode one text, truncated to `max_length()` and padded per `padding()`.
    fn encode(&self, text: &str) -> Result<Encoded>;

    /// Id written into padded positions.
    fn pad_id(&self) -> u32;

    fn max_length(&self) -> usize;

    fn padding(&self) -> PaddingPolicy;
}
