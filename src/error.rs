// src/error.rs

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Everything that can go wrong while locating a header or extracting records.
///
/// None of these are retried internally; callers that want to re-read a file
/// with different options do so themselves.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Malformed or contradictory options, or a mistyped option key with the
    /// fatal policy enabled.
    #[error("configuration error: {0}")]
    Config(String),

    /// The header search ran out of rows (budget spent, or the source went
    /// dry) without a qualifying row.
    #[error("header not found within the {max_rows}-row budget (stopped at row {row})")]
    SearchExceeded { max_rows: usize, row: usize },

    /// A row matched the required columns but was structurally unusable,
    /// e.g. duplicate canonical column names with unique-column mode on.
    #[error("header search failed: {0}")]
    SearchFailed(String),

    /// Strict keyed collection saw the same composite key more than once.
    #[error("duplicate keys in collection: {}", keys.join(", "))]
    DuplicateKeys { keys: Vec<String> },

    /// A requested key field is absent from a record. Programmer error, not a
    /// recoverable data condition.
    #[error("record is missing key field `{0}`")]
    MissingKeyField(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}
