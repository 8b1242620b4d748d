// src/adapters/csv.rs

use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::extract::{
    collect_by_key, extract, ExtractOptions, Extraction, HeaderMode, KeyedCollection, Record,
    RecordShape,
};
use crate::source::{Row, RowSource};
use crate::value::Value;

/// Row source over a delimited file. Every line is surfaced as a row, since
/// header detection is the engine's job; the underlying reader runs
/// headerless and flexible (lines may differ in width).
pub struct CsvRows {
    records: csv::StringRecordsIntoIter<File>,
    row: u64,
}

impl CsvRows {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_delimiter(path, b',')
    }

    pub fn open_with_delimiter(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())?;
        Ok(CsvRows {
            records: reader.into_records(),
            row: 0,
        })
    }
}

impl RowSource for CsvRows {
    fn next_row(&mut self) -> Result<Option<Row>> {
        match self.records.next() {
            None => Ok(None),
            Some(record) => {
                let record = record?;
                self.row += 1;
                Ok(Some(Row {
                    cells: record.iter().map(Value::from).collect(),
                    abs_row: self.row,
                    abs_col: 1,
                }))
            }
        }
    }
}

/// Read a delimited file into records, establishing the header per `mode`.
pub fn read_csv_records(
    path: impl AsRef<Path>,
    mode: &HeaderMode,
    translation: &HashMap<String, String>,
    opts: &ExtractOptions,
) -> Result<Extraction> {
    let path = path.as_ref();
    debug!(file = %path.display(), "reading csv");
    let mut source = CsvRows::open(path)?;
    extract(&mut source, mode, translation, opts)
}

/// Read a delimited file straight into a composite-key map. The header is
/// searched for via `required`; `key_fields` build the key.
pub fn read_csv_keyed(
    path: impl AsRef<Path>,
    required: &[String],
    key_fields: &[String],
    translation: &HashMap<String, String>,
    opts: &ExtractOptions,
    fail_on_duplicate: bool,
) -> Result<KeyedCollection> {
    if opts.shape == RecordShape::Rows {
        return Err(ScoutError::Config(
            "keyed collection requires keyed records, not rows".into(),
        ));
    }
    let out = read_csv_records(
        path,
        &HeaderMode::Search(required.to_vec()),
        translation,
        opts,
    )?;
    collect_by_key(out.records, key_fields, '|', fail_on_duplicate)
}

/// Union of the field names across keyed records, sorted for determinism.
/// Callers wanting source column order should use the extraction header
/// instead.
pub fn field_union(records: &[Record]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for record in records {
        if let Some(map) = record.as_keyed() {
            for key in map.keys() {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }
        }
    }
    fields.sort();
    fields
}

/// Write records out as a delimited file with a header line. Keyed records
/// are projected onto `fields` (absent fields become empty cells); row
/// records are written as-is.
pub fn write_csv_records(
    path: impl AsRef<Path>,
    fields: &[String],
    records: &[Record],
) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path.as_ref())?;
    writer.write_record(fields)?;
    for record in records {
        match record {
            Record::Keyed(map) => writer.write_record(
                fields
                    .iter()
                    .map(|f| map.get(f).map(|v| v.to_string()).unwrap_or_default()),
            )?,
            Record::Row(cells) => writer.write_record(cells.iter().map(|v| v.to_string()))?,
        }
    }
    writer.flush()?;
    Ok(())
}
