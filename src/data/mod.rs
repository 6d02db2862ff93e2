// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw CSV export and tensor batches.
//
//   raw .csv
//       │
//       ▼
//   loader         → reads the table, checks required columns
//       │
//       ▼
//   splitter       → freezes a stratified train/val partition
//       │            (JSON record + train.csv / val.csv)
//       ▼
//   checks         → sanity report: missing values, label
//       │            distributions, duplicates, leakage
//       ▼
//   preprocessor   → one normalized text per row
//       │
//       ▼
//   dataset        → tokenizes rows on demand (Burn Dataset)
//       │
//       ▼
//   batcher        → stacks samples into tensors (Burn Batcher)
//       │
//       ▼
//   dataloader     → ordered, prefetching passes over a dataset
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads and writes CSV tables
pub mod loader;

/// Builds and normalizes the per-row text
pub mod preprocessor;

/// Freezes and reloads the stratified train/validation split
pub mod splitter;

/// Sanity checks a table against its frozen split
pub mod checks;

/// Implements Burn's Dataset trait for tokenized rows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Ordered multi-worker batch iteration
pub mod dataloader;
