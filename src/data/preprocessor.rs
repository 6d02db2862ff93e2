// ============================================================
// Layer 4 — Text Builder / Normalizer
// ============================================================
// Builds the single model-input string for every row.
//
// For each row, in field-list order:
//   1. take the field value (missing -> "")
//   2. trim surrounding whitespace
//   3. join all values with the separator
//   4. trim the joined result again
//
// The second trim is what keeps a missing trailing field from
// leaving a dangling separator:
//   title="Foo ", description=None, sep=" "  ->  "Foo"
//
// Normalization is an optional whole-string case fold.
// Both steps are pure: row i in, row i out.

use crate::domain::record::{PreparedTable, RecordTable};
use crate::error::Result;

/// Concatenate `fields` of every row into one trimmed string.
///
/// An empty field list yields an empty string per row. A field the
/// table does not have is a schema error.
pub fn build_text(table: &RecordTable, fields: &[String], sep: &str) -> Result<Vec<String>> {
    let columns = fields
        .iter()
        .map(|f| table.require_column(f))
        .collect::<Result<Vec<_>>>()?;

    let texts = (0..table.len())
        .map(|row| {
            let parts: Vec<&str> = columns
                .iter()
                .map(|col| col[row].unwrap_or("").trim())
                .collect();
            parts.join(sep).trim().to_string()
        })
        .collect();

    Ok(texts)
}

/// Case-fold every text when `lowercase` is set; otherwise pass through.
pub fn normalize_text(texts: Vec<String>, lowercase: bool) -> Vec<String> {
    if lowercase {
        texts.into_iter().map(|t| t.to_lowercase()).collect()
    } else {
        texts
    }
}

/// Copy `table` and attach its built, normalized text.
pub fn prepare_table(
    table:     &RecordTable,
    fields:    &[String],
    sep:       &str,
    lowercase: bool,
) -> Result<PreparedTable> {
    let texts = normalize_text(build_text(table, fields, sep)?, lowercase);
    PreparedTable::new(table.clone(), texts)
}
