// ============================================================
// Layer 4 — Sanity Checker
// ============================================================
// Checks a full table against its frozen partition before any
// training run uses it. Read-only: nothing is fixed, dropped
// or written. The caller decides what a failing report means.
//
// Steps, in order:
//   1. row counts (train/val taken from the partition itself)
//   2. missing values in label, title, description
//   3. label histograms for the full table, train and val
//   4. exact duplicates on the (title, description) pair
//   5. exact leakage: pairs present in both train and val
//   6. title leakage: titles present in both train and val
//   7. verdict: both splits non-empty and nothing missing
//
// The duplicate key is a structural pair of trimmed strings,
// so "a||b" + "c" and "a" + "b||c" are different keys.

use std::collections::{HashMap, HashSet};

use crate::domain::record::{parse_label, RecordTable, DESCRIPTION, LABEL, REQUIRED_COLUMNS, TITLE};
use crate::domain::report::{LabelDistributions, LabelHistogram, SanityDetails, SanityReport};
use crate::domain::split::SplitPartition;
use crate::error::{DataError, Result};

/// Exact-match key of one row: (trimmed title, trimmed description).
type PairKey<'a> = (&'a str, &'a str);

/// Run every sanity check and return the report.
///
/// Only a partition index that does not exist in `table` is an error;
/// every data problem is reported through the returned value.
pub fn run_sanity_checks(table: &RecordTable, split: &SplitPartition) -> Result<SanityReport> {
    let train_idx = split.train();
    let val_idx   = split.val();

    if let Some(&bad) = train_idx.iter().chain(val_idx).find(|&&i| i >= table.len()) {
        return Err(DataError::Config(format!(
            "split index {} is out of range for a table of {} rows",
            bad,
            table.len()
        )));
    }

    let labels       = table.require_column(LABEL)?;
    let titles       = trimmed(table.require_column(TITLE)?);
    let descriptions = trimmed(table.require_column(DESCRIPTION)?);

    // ── Step 1-2: counts and missing values ───────────────────────────────────
    let mut details = SanityDetails {
        n_total: table.len(),
        n_train: train_idx.len(),
        n_val:   val_idx.len(),
        ..SanityDetails::default()
    };

    details.missing = REQUIRED_COLUMNS
        .iter()
        .map(|c| (c.to_string(), table.missing_count(c)))
        .collect();

    // ── Step 3: label distributions ───────────────────────────────────────────
    let parsed: Vec<Option<i64>> = labels.iter().map(|l| l.and_then(parse_label)).collect();
    details.invalid_labels = labels
        .iter()
        .zip(&parsed)
        .filter(|(raw, id)| raw.is_some() && id.is_none())
        .count();

    let all_rows: Vec<usize> = (0..table.len()).collect();
    details.label_dist = LabelDistributions {
        total: histogram(&parsed, &all_rows),
        train: histogram(&parsed, train_idx),
        val:   histogram(&parsed, val_idx),
    };

    // ── Step 4: exact duplicates ──────────────────────────────────────────────
    let keys: Vec<PairKey> = titles
        .iter()
        .zip(&descriptions)
        .map(|(t, d)| (*t, *d))
        .collect();

    let mut key_counts: HashMap<PairKey, usize> = HashMap::new();
    for key in &keys {
        *key_counts.entry(*key).or_insert(0) += 1;
    }
    details.duplicate_rows_total = keys.iter().filter(|k| key_counts[*k] > 1).count();

    // ── Step 5-6: leakage between splits ──────────────────────────────────────
    details.leakage_exact_train_val      = overlap(&keys, train_idx, val_idx);
    details.leakage_same_title_train_val = overlap(&titles, train_idx, val_idx);

    // ── Step 7: verdict ───────────────────────────────────────────────────────
    let ok = details.n_train > 0
        && details.n_val > 0
        && details.missing.values().all(|&m| m == 0);

    if !ok {
        tracing::warn!(
            "Sanity check failed: {} train, {} val, missing={:?}",
            details.n_train,
            details.n_val,
            details.missing
        );
    }
    if details.leakage_exact_train_val > 0 {
        tracing::warn!(
            "{} identical title/description pairs appear in both train and val",
            details.leakage_exact_train_val
        );
    }

    Ok(SanityReport { ok, details })
}

fn trimmed(values: Vec<Option<&str>>) -> Vec<&str> {
    values.into_iter().map(|v| v.unwrap_or("").trim()).collect()
}

fn histogram(labels: &[Option<i64>], rows: &[usize]) -> LabelHistogram {
    let mut hist = LabelHistogram::new();
    for label in rows.iter().filter_map(|&i| labels[i]) {
        *hist.entry(label).or_insert(0) += 1;
    }
    hist
}

/// Number of distinct values present in both the `a` rows and the `b` rows.
fn overlap<K: Eq + std::hash::Hash>(values: &[K], a: &[usize], b: &[usize]) -> usize {
    let left: HashSet<&K>  = a.iter().map(|&i| &values[i]).collect();
    let right: HashSet<&K> = b.iter().map(|&i| &values[i]).collect();
    left.intersection(&right).count()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::split::{SplitMeta, Splits, STRATIFIED_TRAIN_VAL};
    use crate::test_support::{balanced_table, table};

    fn split(train: Vec<usize>, val: Vec<usize>) -> SplitPartition {
        SplitPartition {
            meta: SplitMeta {
                seed:        42,
                strategy:    STRATIFIED_TRAIN_VAL.to_string(),
                train_ratio: 0.5,
                val_ratio:   0.5,
                n_total:     train.len() + val.len(),
            },
            splits: Splits { train, val },
        }
    }

    #[test]
    fn test_clean_data_passes() {
        let t = balanced_table(2, 4);
        let r = run_sanity_checks(&t, &split(vec![0, 1, 2, 3, 4, 5], vec![6, 7])).unwrap();

        assert!(r.ok);
        assert_eq!(r.details.n_total, 8);
        assert_eq!(r.details.n_train, 6);
        assert_eq!(r.details.n_val, 2);
        assert_eq!(r.missing_total(), 0);
        assert_eq!(r.details.duplicate_rows_total, 0);
        assert_eq!(r.details.leakage_exact_train_val, 0);
        assert_eq!(r.details.label_dist.total.get(&0), Some(&4));
        assert_eq!(r.details.label_dist.total.get(&1), Some(&4));
    }

    #[test]
    fn test_one_missing_title_fails() {
        let t = table(&[
            (Some("0"), Some("a"), Some("x")),
            (Some("1"), None, Some("y")),
            (Some("0"), Some("c"), Some("z")),
            (Some("1"), Some("d"), Some("w")),
        ]);
        let r = run_sanity_checks(&t, &split(vec![0, 1], vec![2, 3])).unwrap();
        assert!(!r.ok);
        assert_eq!(r.details.missing["title"], 1);
        assert_eq!(r.details.missing["label"], 0);
        assert_eq!(r.details.missing["description"], 0);
    }

    #[test]
    fn test_empty_split_fails() {
        let t = balanced_table(2, 2);
        let r = run_sanity_checks(&t, &split(vec![0, 1, 2, 3], vec![])).unwrap();
        assert!(!r.ok);
    }

    #[test]
    fn test_duplicate_pair_counts_both_rows() {
        let t = table(&[
            (Some("0"), Some("A"), Some("B")),
            (Some("1"), Some("C"), Some("D")),
            (Some("0"), Some(" A "), Some("B")),
        ]);
        let r = run_sanity_checks(&t, &split(vec![0, 1], vec![2])).unwrap();
        assert_eq!(r.details.duplicate_rows_total, 2);
    }

    #[test]
    fn test_exact_and_title_leakage() {
        let t = table(&[
            (Some("0"), Some("A"), Some("B")),
            (Some("1"), Some("T"), Some("one")),
            (Some("0"), Some("A"), Some("B")),
            (Some("1"), Some("T"), Some("two")),
        ]);
        let r = run_sanity_checks(&t, &split(vec![0, 1], vec![2, 3])).unwrap();
        assert_eq!(r.details.leakage_exact_train_val, 1);
        assert_eq!(r.details.leakage_same_title_train_val, 2);
        assert!(r.has_leakage());
        // leakage is informational only
        assert!(r.ok);
    }

    #[test]
    fn test_separator_inside_fields_does_not_collide() {
        let t = table(&[
            (Some("0"), Some("a||b"), Some("c")),
            (Some("0"), Some("a"), Some("b||c")),
        ]);
        let r = run_sanity_checks(&t, &split(vec![0], vec![1])).unwrap();
        assert_eq!(r.details.duplicate_rows_total, 0);
        assert_eq!(r.details.leakage_exact_train_val, 0);
    }

    #[test]
    fn test_missing_text_is_keyed_as_empty() {
        let t = table(&[
            (Some("0"), Some("A"), None),
            (Some("1"), Some("A"), Some("  ")),
        ]);
        let r = run_sanity_checks(&t, &split(vec![0], vec![1])).unwrap();
        assert_eq!(r.details.duplicate_rows_total, 2);
        assert_eq!(r.details.leakage_exact_train_val, 1);
        assert!(!r.ok);
    }

    #[test]
    fn test_label_histograms_follow_split_indices() {
        let t = table(&[
            (Some("2"), Some("a"), Some("a")),
            (Some("0"), Some("b"), Some("b")),
            (Some("2"), Some("c"), Some("c")),
            (Some("oops"), Some("d"), Some("d")),
        ]);
        let r = run_sanity_checks(&t, &split(vec![0, 1, 3], vec![2])).unwrap();
        let dist = &r.details.label_dist;

        let pairs = |h: &LabelHistogram| h.iter().map(|(k, v)| (*k, *v)).collect::<Vec<(i64, usize)>>();
        assert_eq!(pairs(&dist.total), vec![(0, 1), (2, 2)]);
        assert_eq!(pairs(&dist.train), vec![(0, 1), (2, 1)]);
        assert_eq!(pairs(&dist.val), vec![(2, 1)]);
        assert_eq!(r.details.invalid_labels, 1);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let t = balanced_table(1, 2);
        let err = run_sanity_checks(&t, &split(vec![0], vec![5])).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }
}
