// ============================================================
// Layer 2 — Loader Use Case
// ============================================================
// Builds the train and validation loaders from the frozen
// split's derived tables:
//
//   Step 1: Resolve or build the tokenizer  (Layer 6 - infra)
//   Step 2: Configure truncation/padding    (Layer 6 - infra)
//   Step 3: Build both loaders              (Layer 4 - data)
//
// The encoder is returned with the loaders so a training loop
// can read its vocabulary and pad id.

use std::sync::Arc;

use anyhow::{Context, Result};
use burn::prelude::*;
use tokenizers::Tokenizer;

use crate::application::prep_config::PrepConfig;
use crate::data::dataloader::{make_loaders, BatchLoader, LoaderOptions};
use crate::data::loader::load_csv;
use crate::data::preprocessor::prepare_table;
use crate::domain::traits::TextEncoder;
use crate::infra::tokenizer_store::{HfEncoder, TokenizerStore};

pub type Loaders<B> = (Arc<dyn TextEncoder>, BatchLoader<B>, BatchLoader<B>);

pub fn build_loaders<B: Backend>(cfg: &PrepConfig, device: &B::Device) -> Result<Loaders<B>> {
    // ── Step 1: Tokenizer ─────────────────────────────────────────────────────
    let tokenizer = resolve_tokenizer(cfg)?;

    // ── Step 2: Encoder ───────────────────────────────────────────────────────
    let encoder: Arc<dyn TextEncoder> = Arc::new(HfEncoder::new(tokenizer, cfg.max_length, cfg.padding)?);

    // ── Step 3: Loaders ───────────────────────────────────────────────────────
    let (train, val) = make_loaders::<B>(
        &cfg.train_csv,
        &cfg.val_csv,
        Arc::clone(&encoder),
        &LoaderOptions::from(cfg),
        device,
    )
    .context("Cannot build the train/validation loaders")?;

    tracing::info!(
        "Loaders ready: {} train batches, {} val batches (batch_size={})",
        train.num_batches(),
        val.num_batches(),
        cfg.batch_size
    );
    Ok((encoder, train, val))
}

/// The named tokenizer, or a word-level one built from the training texts.
fn resolve_tokenizer(cfg: &PrepConfig) -> Result<Tokenizer> {
    let store = TokenizerStore::new(&cfg.tokenizer_dir);

    if let Some(name) = &cfg.tokenizer {
        return store
            .resolve(name)
            .with_context(|| format!("Cannot resolve tokenizer '{name}'"));
    }

    let table    = load_csv(&cfg.train_csv)?;
    let prepared = prepare_table(&table, &cfg.text_fields, &cfg.sep, cfg.lowercase)?;
    store
        .load_or_build(prepared.texts(), cfg.vocab_size)
        .with_context(|| format!("Cannot build tokenizer under '{}'", store.dir().display()))
}

/// Counts gathered over one pass of a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub batches:     usize,
    pub samples:     usize,
    /// [batch_size, seq_len] of the first batch
    pub first_shape: Option<[usize; 2]>,
}

/// Run one full pass and summarise what it produced.
pub fn summarize_pass<B: Backend>(loader: &BatchLoader<B>) -> Result<PassSummary> {
    let mut summary = PassSummary {
        batches:     0,
        samples:     0,
        first_shape: None,
    };

    for batch in loader.iter() {
        let batch = batch?;
        let dims  = batch.input_ids.dims();
        summary.batches += 1;
        summary.samples += dims[0];
        if summary.first_shape.is_none() {
            summary.first_shape = Some(dims);
        }
    }
    Ok(summary)
}
