// src/source.rs

use crate::error::Result;
use crate::value::Value;

/// One row as pulled from a source: the ordered cells plus where the row sits
/// in the underlying file or grid. `abs_row`/`abs_col` are 1-based, the way a
/// spreadsheet or editor displays them; they only feed provenance fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub cells: Vec<Value>,
    pub abs_row: u64,
    pub abs_col: u64,
}

impl Row {
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Value::is_empty)
    }
}

/// Anything the engine can pull rows from, one at a time.
///
/// Blank cells must be emitted as `Value::Empty`, never dropped: position
/// integrity is required for zipping against the header. The source owns the
/// file handle; the engine never opens or closes anything.
pub trait RowSource {
    fn next_row(&mut self) -> Result<Option<Row>>;

    /// True when cell values already carry native types (numbers, dates).
    /// Date coercion is skipped for typed sources.
    fn typed(&self) -> bool {
        false
    }
}

/// In-memory row source, mainly for tests and callers that already hold the
/// grid. Absolute coordinates are synthesized from the vector index.
pub struct VecSource {
    rows: std::vec::IntoIter<Vec<Value>>,
    next_abs_row: u64,
    typed: bool,
}

impl VecSource {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        VecSource {
            rows: rows.into_iter(),
            next_abs_row: 1,
            typed: false,
        }
    }

    /// Mark the source as carrying native types, e.g. when the rows came out
    /// of a workbook grid rather than a text file.
    pub fn with_native_types(mut self) -> Self {
        self.typed = true;
        self
    }

    /// Build from string rows; blanks become `Value::Empty`.
    pub fn from_strs(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|s| Value::from(*s)).collect())
                .collect(),
        )
    }
}

impl RowSource for VecSource {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.next().map(|cells| {
            let row = Row {
                cells,
                abs_row: self.next_abs_row,
                abs_col: 1,
            };
            self.next_abs_row += 1;
            row
        }))
    }

    fn typed(&self) -> bool {
        self.typed
    }
}
