// ============================================================
// Layer 4 — Split Freezer / Split Loader
// ============================================================
// Partitions a table's row indices into train and validation
// sets, stratified by label, and freezes the result to disk:
//
//   <split_json>          the partition record (meta + indices)
//   <out_dir>/train.csv   rows selected by splits.train
//   <out_dir>/val.csv     rows selected by splits.val
//
// Every later run loads the frozen partition instead of
// recomputing it.
//
// Stratified sampling with proportional allocation:
//   n_val   = ceil(val_ratio * n)
//   n_train = n - n_val
//   1. group row indices by label (ascending label key)
//   2. allocate n_train rows across groups: floor of each
//      group's proportional share, leftovers to the groups
//      with the largest remainder (seeded tie-break)
//   3. allocate n_val rows the same way over what is left
//   4. permute each group; its first n_i rows go to train,
//      the next t_i rows go to validation
//   5. permute train and validation once more
//
// The seed feeds one ChaCha8 generator that drives every
// random choice above, so the same seed, ratios and input
// always produce byte-identical output files.
//
// Reference: rand / rand_chacha crate documentation

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::loader::write_csv;
use crate::domain::record::{parse_label, RecordTable, LABEL};
use crate::domain::split::{SplitMeta, SplitPartition, Splits, STRATIFIED_TRAIN_VAL};
use crate::error::{DataError, Result};

/// Maximum allowed drift of train_ratio + val_ratio from 1.0.
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// File names of the derived tables inside the output directory.
pub const TRAIN_CSV: &str = "train.csv";
pub const VAL_CSV: &str = "val.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub seed:        u64,
    pub train_ratio: f64,
    pub val_ratio:   f64,
    pub label_field: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            seed:        42,
            train_ratio: 0.90,
            val_ratio:   0.10,
            label_field: LABEL.to_string(),
        }
    }
}

/// Reject ratios that do not sum to 1.0 within `RATIO_TOLERANCE`.
///
/// The tolerance is inclusive: the extra epsilon absorbs the
/// representation error of the float sum itself.
pub fn check_ratios(train_ratio: f64, val_ratio: f64) -> Result<()> {
    if !train_ratio.is_finite() || !val_ratio.is_finite() {
        return Err(DataError::Config(format!(
            "split ratios must be finite (train_ratio={train_ratio}, val_ratio={val_ratio})"
        )));
    }
    let drift = (train_ratio + val_ratio - 1.0).abs();
    if drift > RATIO_TOLERANCE + f64::EPSILON {
        return Err(DataError::Config(format!(
            "train_ratio + val_ratio must equal 1.0 (got {train_ratio} + {val_ratio})"
        )));
    }
    if val_ratio <= 0.0 || val_ratio >= 1.0 {
        return Err(DataError::Config(format!(
            "val_ratio must be strictly between 0 and 1 (got {val_ratio})"
        )));
    }
    Ok(())
}

/// Create the stratified split of `table`, write it to disk and return it.
///
/// Ratios are validated before anything is computed or written.
pub fn freeze_train_val_split(
    table:          &RecordTable,
    out_split_json: &Path,
    out_dir:        &Path,
    options:        &SplitOptions,
) -> Result<SplitPartition> {
    check_ratios(options.train_ratio, options.val_ratio)?;

    let labels = table.require_column(&options.label_field)?;
    let (train, val) = stratified_split(&labels, options.val_ratio, options.seed)?;

    let partition = SplitPartition {
        meta: SplitMeta {
            seed:        options.seed,
            strategy:    STRATIFIED_TRAIN_VAL.to_string(),
            train_ratio: options.train_ratio,
            val_ratio:   options.val_ratio,
            n_total:     table.len(),
        },
        splits: Splits { train, val },
    };

    if let Some(parent) = out_split_json.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }
    }
    fs::create_dir_all(out_dir).map_err(|e| DataError::io(out_dir, e))?;

    let json = serde_json::to_string_pretty(&partition)?;
    fs::write(out_split_json, json).map_err(|e| DataError::io(out_split_json, e))?;

    write_csv(&table.select(partition.train())?, &out_dir.join(TRAIN_CSV))?;
    write_csv(&table.select(partition.val())?, &out_dir.join(VAL_CSV))?;

    tracing::info!(
        "Froze split (seed={}): {} train, {} val -> '{}'",
        options.seed,
        partition.train().len(),
        partition.val().len(),
        out_split_json.display()
    );
    Ok(partition)
}

/// Read a previously frozen partition. Its invariants are not re-checked;
/// run the sanity checker when stronger guarantees are needed.
pub fn load_frozen_split(split_json: &Path) -> Result<SplitPartition> {
    if !split_json.exists() {
        return Err(DataError::NotFound {
            path: split_json.to_path_buf(),
        });
    }
    let json = fs::read_to_string(split_json).map_err(|e| DataError::io(split_json, e))?;
    Ok(serde_json::from_str(&json)?)
}

/// Stratified split of row indices `[0, labels.len())`.
///
/// Returns `(train, val)` in sampling order. Rows with the same class id
/// form one stratum ("1" and "1.0" included); labels that are not class ids
/// group by trimmed text, and missing labels form their own stratum.
pub fn stratified_split(
    labels:    &[Option<&str>],
    val_ratio: f64,
    seed:      u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n       = labels.len();
    let n_val   = ((val_ratio * n as f64).ceil() as usize).min(n);
    let n_train = n - n_val;

    if n_train == 0 || n_val == 0 {
        return Err(DataError::Config(format!(
            "a split of {n} rows with val_ratio={val_ratio} leaves an empty side \
             ({n_train} train, {n_val} val)"
        )));
    }

    // ── Group rows by label ───────────────────────────────────────────────────
    let mut strata: BTreeMap<StratumKey, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        strata.entry(stratum_key(*label)).or_default().push(i);
    }
    let groups: Vec<Vec<usize>> = strata.into_values().collect();

    if let Some(smallest) = groups.iter().map(Vec::len).min() {
        if smallest < 2 {
            return Err(DataError::Config(
                "the least populated label has only 1 row; every label needs at least 2 \
                 to be stratified"
                    .to_string(),
            ));
        }
    }
    if n_train < groups.len() || n_val < groups.len() {
        return Err(DataError::Config(format!(
            "{n_train} train / {n_val} val rows cannot cover {} labels",
            groups.len()
        )));
    }

    // ── Allocate rows per group ───────────────────────────────────────────────
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let counts: Vec<usize> = groups.iter().map(Vec::len).collect();
    let n_i = approximate_mode(&counts, n_train, &mut rng);
    let left: Vec<usize> = counts.iter().zip(&n_i).map(|(c, t)| c - t).collect();
    let t_i = approximate_mode(&left, n_val, &mut rng);

    // ── Draw rows ─────────────────────────────────────────────────────────────
    let mut train = Vec::with_capacity(n_train);
    let mut val   = Vec::with_capacity(n_val);

    for (k, group) in groups.iter().enumerate() {
        let mut perm = group.clone();
        perm.shuffle(&mut rng);
        train.extend_from_slice(&perm[..n_i[k]]);
        val.extend_from_slice(&perm[n_i[k]..n_i[k] + t_i[k]]);
    }

    train.shuffle(&mut rng);
    val.shuffle(&mut rng);

    tracing::debug!(
        "Stratified split over {} labels: {} train, {} val",
        groups.len(),
        train.len(),
        val.len()
    );
    Ok((train, val))
}

/// Stratum of one row: its class id, or the trimmed raw text when the
/// label does not parse, or neither when it is missing.
type StratumKey<'a> = (Option<i64>, Option<&'a str>);

fn stratum_key(label: Option<&str>) -> StratumKey<'_> {
    match label {
        Some(raw) => match parse_label(raw) {
            Some(id) => (Some(id), None),
            None => (None, Some(raw.trim())),
        },
        None => (None, None),
    }
}

/// Spread `draws` over groups of sizes `counts`, proportionally.
///
/// Each group gets the floor of its exact share; the remaining draws go to
/// the groups with the largest fractional remainder, breaking ties with `rng`.
/// Shares are computed in integer arithmetic, so no float rounding leaks in.
fn approximate_mode(counts: &[usize], draws: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let total = counts.iter().sum::<usize>() as u128;
    if total == 0 {
        return vec![0; counts.len()];
    }

    let scaled: Vec<u128> = counts.iter().map(|&c| c as u128 * draws as u128).collect();
    let mut alloc: Vec<usize> = scaled.iter().map(|&s| (s / total) as usize).collect();
    let remainders: Vec<u128> = scaled.iter().map(|&s| s % total).collect();

    let mut need = draws.saturating_sub(alloc.iter().sum());

    let mut levels = remainders.clone();
    levels.sort_unstable_by(|a, b| b.cmp(a));
    levels.dedup();

    for level in levels {
        if need == 0 {
            break;
        }
        let tied: Vec<usize> = (0..counts.len()).filter(|&k| remainders[k] == level).collect();
        let take = need.min(tied.len());
        for &k in tied.choose_multiple(rng, take) {
            alloc[k] += 1;
        }
        need -= take;
    }

    alloc
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv;
    use crate::test_support::{balanced_table, table};
    use std::collections::HashSet;

    fn labels_of(t: &RecordTable) -> Vec<Option<&str>> {
        t.column(LABEL).unwrap()
    }

    #[test]
    fn test_partition_covers_every_row_once() {
        let t = balanced_table(4, 25);
        let (train, val) = stratified_split(&labels_of(&t), 0.1, 42).unwrap();

        let train_set: HashSet<usize> = train.iter().copied().collect();
        assert!(val.iter().all(|i| !train_set.contains(i)));

        let mut all: Vec<usize> = train.iter().chain(&val).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_validation_size_rounds_up() {
        // 10 rows * 0.25 = 2.5 -> 3 validation rows
        let t = balanced_table(2, 5);
        let (train, val) = stratified_split(&labels_of(&t), 0.25, 7).unwrap();
        assert_eq!(val.len(), 3);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn test_label_proportions_are_preserved() {
        // 50 / 30 / 20 rows per label
        let mut rows = Vec::new();
        for (label, count) in [("0", 50), ("1", 30), ("2", 20)] {
            for i in 0..count {
                rows.push((label, format!("t{label}-{i}")));
            }
        }
        let cells: Vec<(Option<&str>, Option<&str>, Option<&str>)> = rows
            .iter()
            .map(|(l, t)| (Some(*l), Some(t.as_str()), Some("d")))
            .collect();
        let t = table(&cells);
        let labels = labels_of(&t);

        let (train, val) = stratified_split(&labels, 0.1, 42).unwrap();
        assert_eq!(val.len(), 10);

        for label in ["0", "1", "2"] {
            let full  = labels.iter().filter(|l| **l == Some(label)).count() as f64 / 100.0;
            let in_tr = train.iter().filter(|&&i| labels[i] == Some(label)).count() as f64
                / train.len() as f64;
            assert!((in_tr - full).abs() < 0.05, "label {label}: {in_tr} vs {full}");
        }
    }

    #[test]
    fn test_same_seed_same_split_other_seed_differs() {
        let t = balanced_table(3, 40);
        let a = stratified_split(&labels_of(&t), 0.2, 42).unwrap();
        let b = stratified_split(&labels_of(&t), 0.2, 42).unwrap();
        let c = stratified_split(&labels_of(&t), 0.2, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_label_spellings_of_one_class_share_a_stratum() {
        // class 1 is written "1" once and "1.0" five times
        let mut cells = vec![(Some("0"), Some("a"), Some("d")); 6];
        cells.push((Some("1"), Some("b"), Some("d")));
        cells.extend(vec![(Some("1.0"), Some("b"), Some("d")); 5]);
        let t = table(&cells);

        let (train, val) = stratified_split(&labels_of(&t), 0.25, 42).unwrap();
        assert_eq!(val.len(), 3);
        assert_eq!(train.len(), 9);

        let class_one = |rows: &[usize]| rows.iter().filter(|&&i| i >= 6).count();
        assert!((1..=2).contains(&class_one(&val)));
        assert_eq!(class_one(&train) + class_one(&val), 6);
    }

    #[test]
    fn test_stratum_key_groups_by_class_id() {
        assert_eq!(stratum_key(Some(" 1 ")), stratum_key(Some("1.0")));
        assert_eq!(stratum_key(Some(" x ")), (None, Some("x")));
        assert_eq!(stratum_key(None), (None, None));
    }

    #[test]
    fn test_singleton_label_is_rejected() {
        let t = table(&[
            (Some("0"), Some("a"), Some("a")),
            (Some("0"), Some("b"), Some("b")),
            (Some("0"), Some("c"), Some("c")),
            (Some("1"), Some("d"), Some("d")),
        ]);
        let err = stratified_split(&labels_of(&t), 0.5, 42).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_ratio_validation() {
        assert!(check_ratios(0.9, 0.100000001).is_ok());
        assert!(check_ratios(0.5, 0.500000001).is_ok());
        assert!(matches!(check_ratios(0.9, 0.2), Err(DataError::Config(_))));
        assert!(matches!(check_ratios(1.0, 0.0), Err(DataError::Config(_))));
        assert!(check_ratios(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_bad_ratios_write_nothing() {
        let dir  = tempfile::tempdir().unwrap();
        let json = dir.path().join("splits").join("split.json");
        let out  = dir.path().join("processed");
        let opts = SplitOptions {
            train_ratio: 0.9,
            val_ratio: 0.2,
            ..SplitOptions::default()
        };

        let err = freeze_train_val_split(&balanced_table(2, 10), &json, &out, &opts).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
        assert!(!json.exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_freeze_writes_partition_and_tables() {
        let dir   = tempfile::tempdir().unwrap();
        let json  = dir.path().join("splits").join("split.json");
        let out   = dir.path().join("processed");
        let t     = balanced_table(4, 10);
        let opts  = SplitOptions::default();

        let p = freeze_train_val_split(&t, &json, &out, &opts).unwrap();
        assert!(p.is_exact_cover());
        assert_eq!(p.meta.n_total, 40);
        assert_eq!(p.meta.strategy, STRATIFIED_TRAIN_VAL);
        assert_eq!(p.val().len(), 4);

        assert_eq!(load_frozen_split(&json).unwrap(), p);
        assert_eq!(load_csv(&out.join(TRAIN_CSV)).unwrap(), t.select(p.train()).unwrap());
        assert_eq!(load_csv(&out.join(VAL_CSV)).unwrap(), t.select(p.val()).unwrap());
    }

    #[test]
    fn test_freeze_is_byte_identical_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let t   = balanced_table(3, 20);
        let opts = SplitOptions::default();

        let a = dir.path().join("a");
        let b = dir.path().join("b");
        freeze_train_val_split(&t, &a.join("split.json"), &a, &opts).unwrap();
        freeze_train_val_split(&t, &b.join("split.json"), &b, &opts).unwrap();

        for name in ["split.json", TRAIN_CSV, VAL_CSV] {
            let left  = fs::read(a.join(name)).unwrap();
            let right = fs::read(b.join(name)).unwrap();
            assert_eq!(left, right, "{name} differs between runs");
        }
    }

    #[test]
    fn test_missing_label_field_is_schema_error() {
        let dir  = tempfile::tempdir().unwrap();
        let opts = SplitOptions {
            label_field: "category".into(),
            ..SplitOptions::default()
        };
        let err = freeze_train_val_split(
            &balanced_table(2, 10),
            &dir.path().join("s.json"),
            dir.path(),
            &opts,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Schema { .. }));
    }

    #[test]
    fn test_load_missing_split_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_frozen_split(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[test]
    fn test_approximate_mode_sums_to_draws() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let alloc = approximate_mode(&[5, 5, 5], 7, &mut rng);
        assert_eq!(alloc.iter().sum::<usize>(), 7);
        assert!(alloc.iter().all(|&a| a == 2 || a == 3));

        let exact = approximate_mode(&[50, 30, 20], 90, &mut rng);
        assert_eq!(exact, vec![45, 27, 18]);
    }
}
