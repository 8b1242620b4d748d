// src/extract/materialize.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::extract::dates::parse_datetime;
use crate::source::Row;
use crate::value::Value;

/// Reserved provenance field names. They live in the same namespace as data
/// fields; if a translated header produces the same name, the provenance
/// field wins and the collision is logged.
pub const FLD_SOURCE_ROW: &str = "SourceRow";
pub const FLD_SOURCE_ROW_ABS: &str = "SourceRowAbs";
pub const FLD_SOURCE_COL_ABS: &str = "SourceColAbs";

/// Output shape for materialized records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    /// Ordered value sequences, no field names.
    Rows,
    /// Field-name → value maps zipped against the header.
    #[default]
    Keyed,
}

/// Which provenance values to merge into each record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Provenance {
    /// Logical row number within the source (1-based).
    pub row: bool,
    /// Absolute row number reported by the source.
    pub abs_row: bool,
    /// Absolute column number of the row's first cell.
    pub abs_col: bool,
}

/// One materialized record.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Row(Vec<Value>),
    Keyed(HashMap<String, Value>),
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Record::Row(_) => None,
            Record::Keyed(map) => map.get(field),
        }
    }

    pub fn as_row(&self) -> Option<&[Value]> {
        match self {
            Record::Row(cells) => Some(cells),
            Record::Keyed(_) => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Record::Row(_) => None,
            Record::Keyed(map) => Some(map),
        }
    }

    pub fn into_keyed(self) -> Option<HashMap<String, Value>> {
        match self {
            Record::Row(_) => None,
            Record::Keyed(map) => Some(map),
        }
    }
}

/// Builds records from data rows once the header question is settled.
pub struct Materializer<'a> {
    header: Option<&'a [String]>,
    shape: RecordShape,
    provenance: Provenance,
    date_fields: &'a [String],
    /// Dates are only coerced for sources without native typed values.
    coerce_dates: bool,
}

impl<'a> Materializer<'a> {
    pub fn new(
        header: Option<&'a [String]>,
        shape: RecordShape,
        provenance: Provenance,
        date_fields: &'a [String],
        source_typed: bool,
    ) -> Self {
        Materializer {
            header,
            shape,
            provenance,
            date_fields,
            coerce_dates: !source_typed && !date_fields.is_empty(),
        }
    }

    /// Turn one data row into a record. `logical_row` is the 1-based position
    /// of the row within the source, counting every row pulled (preamble and
    /// header included), so it names the line a user would look at.
    pub fn build(&self, row: Row, logical_row: u64) -> Record {
        match self.shape {
            RecordShape::Rows => self.build_row(row, logical_row),
            RecordShape::Keyed => self.build_keyed(row, logical_row),
        }
    }

    fn build_row(&self, row: Row, logical_row: u64) -> Record {
        let mut cells = row.cells;
        if self.provenance.row {
            cells.push(Value::Int(logical_row as i64));
        }
        if self.provenance.abs_row {
            cells.push(Value::Int(row.abs_row as i64));
        }
        if self.provenance.abs_col {
            cells.push(Value::Int(row.abs_col as i64));
        }
        Record::Row(cells)
    }

    fn build_keyed(&self, row: Row, logical_row: u64) -> Record {
        let header = self.header.unwrap_or(&[]);

        // zip semantics: short rows leave trailing fields absent, long rows
        // drop the excess
        let mut map: HashMap<String, Value> = header
            .iter()
            .cloned()
            .zip(row.cells.into_iter())
            .collect();

        let reserved: [(&str, bool, u64); 3] = [
            (FLD_SOURCE_ROW, self.provenance.row, logical_row),
            (FLD_SOURCE_ROW_ABS, self.provenance.abs_row, row.abs_row),
            (FLD_SOURCE_COL_ABS, self.provenance.abs_col, row.abs_col),
        ];
        for (name, wanted, value) in reserved {
            if !wanted {
                continue;
            }
            if map.insert(name.to_string(), Value::Int(value as i64)).is_some() {
                warn!(
                    field = name,
                    row = logical_row,
                    "header column collides with reserved provenance field; provenance wins"
                );
            }
        }

        if self.coerce_dates {
            for field in self.date_fields {
                // skipped when the field is absent from this row
                if let Some(v) = map.get_mut(field) {
                    if let Value::Text(s) = v {
                        match parse_datetime(s) {
                            Some(dt) => *v = Value::DateTime(dt),
                            None => {
                                debug!(field = %field, raw = %s, "date field did not parse; left as-is")
                            }
                        }
                    }
                }
            }
        }

        Record::Keyed(map)
    }
}
