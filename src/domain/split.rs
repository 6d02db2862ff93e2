// ============================================================
// Layer 3 — Split Partition
// ============================================================
// The frozen train/validation partition of a record table.
//
// On disk it is a pretty-printed JSON document:
//
//   {
//     "meta":   { "seed": 42, "strategy": "stratified_train_val",
//                 "train_ratio": 0.9, "val_ratio": 0.1, "n_total": 1000 },
//     "splits": { "train": [17, 3, ...], "val": [8, 941, ...] }
//   }
//
// Invariant: train and val are disjoint and together cover
// [0, n_total) exactly once. Once written, a partition is read
// back rather than recomputed; it is always passed around as an
// explicit value, never cached globally.

use serde::{Deserialize, Serialize};

/// Strategy tag written into every stratified partition.
pub const STRATIFIED_TRAIN_VAL: &str = "stratified_train_val";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitMeta {
    pub seed:        u64,
    pub strategy:    String,
    pub train_ratio: f64,
    pub val_ratio:   f64,
    pub n_total:     usize,
}

/// Row indices of each split, in sampling order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Splits {
    pub train: Vec<usize>,
    pub val:   Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPartition {
    pub meta:   SplitMeta,
    pub splits: Splits,
}

impl SplitPartition {
    pub fn train(&self) -> &[usize] {
        &self.splits.train
    }

    pub fn val(&self) -> &[usize] {
        &self.splits.val
    }

    /// True when train and val are disjoint and cover [0, n_total) once.
    pub fn is_exact_cover(&self) -> bool {
        let n = self.meta.n_total;
        if self.splits.train.len() + self.splits.val.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &i in self.splits.train.iter().chain(&self.splits.val) {
            match seen.get_mut(i) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}
