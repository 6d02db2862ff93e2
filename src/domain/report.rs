// ============================================================
// Layer 3 — Sanity Report
// ============================================================
// The result of checking a table against its frozen split.
// Produced on demand and never persisted.
//
// `ok` is true only when both splits are non-empty and none of
// the required columns has a missing value. Everything else in
// `details` (duplicates, leakage, label skew) is informational.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label histogram: class id -> row count, ascending by class id.
pub type LabelHistogram = BTreeMap<i64, usize>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelDistributions {
    pub total: LabelHistogram,
    pub train: LabelHistogram,
    pub val:   LabelHistogram,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SanityDetails {
    pub n_total: usize,
    pub n_train: usize,
    pub n_val:   usize,

    /// Missing-value count per required column.
    pub missing: BTreeMap<String, usize>,

    pub label_dist: LabelDistributions,

    /// Rows whose (title, description) pair occurs more than once.
    pub duplicate_rows_total: usize,

    /// Distinct (title, description) pairs found in both splits.
    pub leakage_exact_train_val: usize,

    /// Distinct titles found in both splits.
    pub leakage_same_title_train_val: usize,

    /// Present labels that are not integer class ids.
    pub invalid_labels: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityReport {
    pub ok:      bool,
    pub details: SanityDetails,
}

impl SanityReport {
    /// Total missing values across the required columns.
    pub fn missing_total(&self) -> usize {
        self.details.missing.values().sum()
    }

    pub fn has_leakage(&self) -> bool {
        self.details.leakage_exact_train_val > 0
    }
}
