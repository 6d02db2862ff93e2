// ============================================================
// Layer 2 — CheckUseCase
// ============================================================
// Loads the raw table and its frozen split, then runs the
// sanity checks. A failing report is returned, not raised.

use anyhow::{Context, Result};

use crate::application::prep_config::PrepConfig;
use crate::data::checks::run_sanity_checks;
use crate::data::loader::CsvLoader;
use crate::data::splitter::load_frozen_split;
use crate::domain::report::SanityReport;
use crate::domain::traits::RecordSource;

pub struct CheckUseCase {
    config: PrepConfig,
}

impl CheckUseCase {
    pub fn new(config: PrepConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SanityReport> {
        let cfg = &self.config;

        let table = CsvLoader::new(&cfg.input_csv)
            .load()
            .with_context(|| format!("Cannot load input table '{}'", cfg.input_csv.display()))?;

        let split = load_frozen_split(&cfg.split_json)
            .with_context(|| format!("Cannot load frozen split '{}'", cfg.split_json.display()))?;

        if split.meta.n_total != table.len() {
            tracing::warn!(
                "Split was frozen over {} rows but '{}' has {}",
                split.meta.n_total,
                cfg.input_csv.display(),
                table.len()
            );
        }

        let report = run_sanity_checks(&table, &split).context("Split does not fit the table")?;

        tracing::info!(
            "Sanity check: ok={} ({} train, {} val, {} duplicates, {} leaked pairs)",
            report.ok,
            report.details.n_train,
            report.details.n_val,
            report.details.duplicate_rows_total,
            report.details.leakage_exact_train_val
        );
        Ok(report)
    }
}
