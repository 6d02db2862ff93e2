// ============================================================
// Error Taxonomy
// ============================================================
// Every fallible library operation returns DataError.
// The application and CLI layers wrap it in anyhow with
// extra context; the library itself never retries or
// coerces malformed input.
//
//   NotFound      - an input path does not exist
//   Schema        - a table lacks required fields
//   Config        - invalid options (ratios, sizes, indices)
//   InvalidLabel  - a label that cannot become a class id
//   Tokenizer     - the tokenizer failed to load or encode
//
// A failing sanity report is NOT an error: it is returned
// as a value and the caller decides what to do with it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Missing columns in {}: {missing:?}. Found: {found:?}", path.display())]
    Schema {
        path: PathBuf,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Row {row}: label {value:?} is not an integer class id")]
    InvalidLabel { row: usize, value: Option<String> },

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DataError {
    /// Attach a path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
