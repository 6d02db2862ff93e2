// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads a comma-delimited file with a header row into a
// RecordTable and verifies the required columns are present.
//
// Cell handling:
//   - empty cells and the usual NA markers ("NA", "NaN",
//     "null", ...) become missing values (None)
//   - everything else is kept verbatim, including surrounding
//     whitespace; trimming is the text builder's job
//   - extra columns are preserved in their original position
//
// No type or range validation happens here. A non-integer
// label is the sanity checker's problem, not the loader's.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::path::{Path, PathBuf};

use crate::domain::record::{RecordTable, REQUIRED_COLUMNS};
use crate::domain::traits::RecordSource;
use crate::error::{DataError, Result};

/// Cell spellings read as a missing value.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Loads a record table from one CSV file.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvLoader {
    fn load(&self) -> Result<RecordTable> {
        load_csv(&self.path)
    }
}

/// Load a CSV file and fail fast if it lacks `label`, `title` or `description`.
pub fn load_csv(path: &Path) -> Result<RecordTable> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    let table = RecordTable::new(columns, rows)?;

    let missing = table.missing_columns(&REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(DataError::Schema {
            path: path.to_path_buf(),
            missing,
            found: table.columns().to_vec(),
        });
    }

    tracing::debug!(
        "Loaded '{}': {} rows, {} columns",
        path.display(),
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Write a table as CSV: header row first, missing values as empty cells.
/// Parent directories must already exist.
pub fn write_csv(table: &RecordTable, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;

    tracing::debug!("Wrote {} rows to '{}'", table.len(), path.display());
    Ok(())
}

fn parse_cell(raw: &str) -> Option<String> {
    if NA_MARKERS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{DESCRIPTION, LABEL, TITLE};
    use std::fs;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[test]
    fn test_missing_columns_are_named() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "label,headline\n1,foo\n").unwrap();

        match load_csv(&path).unwrap_err() {
            DataError::Schema { missing, found, .. } => {
                assert_eq!(missing, vec!["title".to_string(), "description".to_string()]);
                assert_eq!(found, vec!["label".to_string(), "headline".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_na_cells_are_missing() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            "label,title,description,source\n1,Foo ,,web\n2,NaN,\"a, b\",\n",
        )
        .unwrap();

        let t = load_csv(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column(TITLE).unwrap(), vec![Some("Foo "), None]);
        assert_eq!(t.column(DESCRIPTION).unwrap(), vec![None, Some("a, b")]);
        assert_eq!(t.column(LABEL).unwrap(), vec![Some("1"), Some("2")]);
        assert_eq!(t.column("source").unwrap(), vec![Some("web"), None]);
    }

    #[test]
    fn test_ragged_file_is_a_csv_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "label,title,description\n1,a\n").unwrap();
        assert!(matches!(load_csv(&path).unwrap_err(), DataError::Csv(_)));
    }

    #[test]
    fn test_write_then_load_preserves_columns_and_missing() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let table = crate::test_support::table(&[
            (Some("0"), Some("Hello, world"), None),
            (Some("1"), None, Some("body")),
        ]);
        write_csv(&table, &path).unwrap();

        let back = CsvLoader::new(&path).load().unwrap();
        assert_eq!(back, table);
    }
}
