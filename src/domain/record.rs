// ============================================================
// Layer 3 — Record Table
// ============================================================
// An ordered table of rows over an ordered list of columns.
// Every cell is Option<String>: None is a missing value.
//
// Row position is the identity used by split indices, so a
// table is never reordered or mutated in place. Derived
// tables (subsets, prepared text) are always copies.
//
//   columns:  [label, title, description, ...extra]
//   rows[i]:  [Some("2"), Some("Foo"), None, ...]

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Column holding the integer class id.
pub const LABEL: &str = "label";
/// Column holding the headline text.
pub const TITLE: &str = "title";
/// Column holding the body text.
pub const DESCRIPTION: &str = "description";

/// Columns every loaded table must contain.
pub const REQUIRED_COLUMNS: [&str; 3] = [LABEL, TITLE, DESCRIPTION];

/// A row-ordered table of optional string cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordTable {
    columns: Vec<String>,
    rows:    Vec<Vec<Option<String>>>,
}

impl RecordTable {
    /// Build a table, checking that every row has one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(DataError::Config(format!(
                "row {} has {} cells but the table has {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Names from `required` that this table lacks, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    /// All values of one column, top to bottom.
    /// Returns None when the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_deref()).collect())
    }

    /// Like `column`, but an absent column is a schema error.
    pub fn require_column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        self.column(name).ok_or_else(|| DataError::Schema {
            path:    "<in-memory table>".into(),
            missing: vec![name.to_string()],
            found:   self.columns.clone(),
        })
    }

    /// Number of missing cells in a column (0 if the column is absent).
    pub fn missing_count(&self, name: &str) -> usize {
        self.column(name)
            .map(|values| values.iter().filter(|v| v.is_none()).count())
            .unwrap_or(0)
    }

    /// Copy the rows at `indices`, in that order, keeping every column.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        let mut rows = Vec::with_capacity(indices.len());
        for &i in indices {
            let row = self.rows.get(i).ok_or_else(|| {
                DataError::Config(format!(
                    "row index {} is out of range for a table of {} rows",
                    i,
                    self.rows.len()
                ))
            })?;
            rows.push(row.clone());
        }
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }
}

/// Parse a label cell into an integer class id.
///
/// Accepts plain integers ("3") and integral float spellings ("3.0"),
/// which is how integer columns come back once they contain a gap.
pub fn parse_label(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// ─── PreparedTable ────────────────────────────────────────────────────────────
/// A record table plus one derived model-input text per row.
/// The text is only consumed at tokenization time and is never
/// written back into the canonical split files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTable {
    table: RecordTable,
    texts: Vec<String>,
}

impl PreparedTable {
    pub fn new(table: RecordTable, texts: Vec<String>) -> Result<Self> {
        if table.len() != texts.len() {
            return Err(DataError::Config(format!(
                "{} texts supplied for a table of {} rows",
                texts.len(),
                table.len()
            )));
        }
        Ok(Self { table, texts })
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::table;

    #[test]
    fn test_ragged_rows_are_rejected() {
        let cols = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec![Some("1".to_string())]];
        assert!(RecordTable::new(cols, rows).is_err());
    }

    #[test]
    fn test_missing_count_and_columns() {
        let t = table(&[
            (Some("1"), Some("A"), None),
            (Some("2"), None, None),
        ]);
        assert_eq!(t.missing_count(TITLE), 1);
        assert_eq!(t.missing_count(DESCRIPTION), 2);
        assert_eq!(t.missing_count(LABEL), 0);
        assert_eq!(t.missing_columns(&["label", "body"]), vec!["body".to_string()]);
    }

    #[test]
    fn test_select_keeps_order_and_columns() {
        let t = table(&[
            (Some("0"), Some("a"), Some("x")),
            (Some("1"), Some("b"), Some("y")),
            (Some("2"), Some("c"), Some("z")),
        ]);
        let s = t.select(&[2, 0]).unwrap();
        assert_eq!(s.columns(), t.columns());
        assert_eq!(s.column(TITLE).unwrap(), vec![Some("c"), Some("a")]);
        assert!(t.select(&[3]).is_err());
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("3"), Some(3));
        assert_eq!(parse_label(" 4 "), Some(4));
        assert_eq!(parse_label("2.0"), Some(2));
        assert_eq!(parse_label("2.5"), None);
        assert_eq!(parse_label("sports"), None);
    }

    #[test]
    fn test_prepared_table_length_must_match() {
        let t = table(&[(Some("1"), Some("A"), Some("B"))]);
        assert!(PreparedTable::new(t.clone(), vec![]).is_err());
        let p = PreparedTable::new(t, vec!["A B".into()]).unwrap();
        assert_eq!(p.text(0), Some("A B"));
    }
}
