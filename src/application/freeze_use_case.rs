// ============================================================
// Layer 2 — FreezeUseCase
// ============================================================
// Creates the one frozen split every later run reuses:
//
//   Step 1: Load the raw table          (Layer 4 - data)
//   Step 2: Freeze the stratified split (Layer 4 - data)
//   Step 3: Save the config beside it   (Layer 6 - infra)

use anyhow::{Context, Result};

use crate::application::prep_config::PrepConfig;
use crate::data::loader::CsvLoader;
use crate::data::splitter::{freeze_train_val_split, SplitOptions, TRAIN_CSV, VAL_CSV};
use crate::domain::split::SplitPartition;
use crate::domain::traits::RecordSource;
use crate::infra::config_store::{save_config, CONFIG_FILE};

pub struct FreezeUseCase {
    config: PrepConfig,
}

impl FreezeUseCase {
    pub fn new(config: PrepConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SplitPartition> {
        let cfg = &self.config;

        // ── Step 1: Load the raw table ────────────────────────────────────────
        let table = CsvLoader::new(&cfg.input_csv)
            .load()
            .with_context(|| format!("Cannot load input table '{}'", cfg.input_csv.display()))?;
        tracing::info!("Loaded {} rows from '{}'", table.len(), cfg.input_csv.display());

        // ── Step 2: Freeze the split ──────────────────────────────────────────
        let partition = freeze_train_val_split(
            &table,
            &cfg.split_json,
            &cfg.processed_dir,
            &SplitOptions::from(cfg),
        )
        .context("Cannot freeze the train/validation split")?;

        // ── Step 3: Record the config the split was made with ─────────────────
        // The derived tables now live under processed_dir; point at them.
        let saved = PrepConfig {
            train_csv: cfg.processed_dir.join(TRAIN_CSV),
            val_csv:   cfg.processed_dir.join(VAL_CSV),
            ..cfg.clone()
        };
        let config_path = cfg
            .split_json
            .parent()
            .map(|p| p.join(CONFIG_FILE))
            .unwrap_or_else(|| CONFIG_FILE.into());
        save_config(&saved, &config_path)?;

        Ok(partition)
    }
}
