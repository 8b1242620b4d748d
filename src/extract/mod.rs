// src/extract/mod.rs

pub mod collect;
pub mod dates;
pub mod materialize;

pub use collect::{collect_by_key, multifield_key, KeyedCollection};
pub use materialize::{
    Materializer, Provenance, Record, RecordShape, FLD_SOURCE_COL_ABS, FLD_SOURCE_ROW,
    FLD_SOURCE_ROW_ABS,
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::locate::{HeaderScan, ScanOptions, ScanState};
use crate::options::{check_unknown_keys, OptionWarning, WarningPolicy};
use crate::source::RowSource;

/// How the header is established. One tagged choice instead of a pile of
/// overlapping boolean flags, so illegal combinations cannot be expressed.
#[derive(Clone, Debug)]
pub enum HeaderMode {
    /// The caller supplies the column names; data starts at `start_row` and
    /// no row is consumed as a header. To replace a junk header row in the
    /// file, point `start_row` past it.
    Explicit(Vec<String>),
    /// The first row read (after `start_row`) is the header.
    FirstRow,
    /// Scan for a row containing every one of these canonical columns. An
    /// empty list makes the first row scanned qualify immediately.
    Search(Vec<String>),
    /// No header concept at all. Records are forced to row shape.
    None,
}

/// Flat option set for an extraction run. Every field is independently
/// optional with the stated default; this is also the schema for option
/// files (see [`ExtractOptions::from_json`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Match required columns and translation keys ignoring case.
    pub case_insensitive: bool,
    /// Header-search row budget.
    pub max_rows: usize,
    /// Require canonical column names on the found header to be unique.
    pub unique_columns: bool,
    /// Rows to skip before the header search (or the data, in `Explicit` and
    /// `None` modes) begins. 0-based count, not a position.
    pub start_row: usize,
    /// Output shape; ignored (forced to `Rows`) in `HeaderMode::None`.
    pub shape: RecordShape,
    /// Tag each record with its logical row number.
    pub save_row: bool,
    /// Tag each record with the absolute row number from the source.
    pub save_row_abs: bool,
    /// Tag each record with the absolute column of its first cell.
    pub save_col_abs: bool,
    /// Drop rows whose cells are all empty.
    pub skip_blank_rows: bool,
    /// Treat the first all-empty row as end of data.
    pub stop_on_blank_row: bool,
    /// Fields to coerce to dates (untyped sources only).
    pub date_fields: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            case_insensitive: false,
            max_rows: 10,
            unique_columns: false,
            start_row: 0,
            shape: RecordShape::default(),
            save_row: false,
            save_row_abs: false,
            save_col_abs: false,
            skip_blank_rows: false,
            stop_on_blank_row: false,
            date_fields: Vec::new(),
        }
    }
}

const KNOWN_OPTION_KEYS: &[&str] = &[
    "case_insensitive",
    "max_rows",
    "unique_columns",
    "start_row",
    "shape",
    "save_row",
    "save_row_abs",
    "save_col_abs",
    "skip_blank_rows",
    "stop_on_blank_row",
    "date_fields",
];

impl ExtractOptions {
    /// Build options from a loosely-typed JSON object (an option file).
    /// Unrecognized keys produce warnings (with a suggestion when the key is
    /// a known misspelling) and are ignored unless the policy is fatal.
    pub fn from_json(
        value: &serde_json::Value,
        policy: WarningPolicy,
    ) -> Result<(Self, Vec<OptionWarning>)> {
        let object = value
            .as_object()
            .ok_or_else(|| ScoutError::Config("options must be a JSON object".into()))?;
        let warnings = check_unknown_keys(
            "extract options",
            object.keys().map(String::as_str),
            KNOWN_OPTION_KEYS,
            policy,
        )?;
        let opts: ExtractOptions = serde_json::from_value(value.clone())
            .map_err(|e| ScoutError::Config(format!("bad option value: {e}")))?;
        opts.validate()?;
        Ok((opts, warnings))
    }

    pub fn validate(&self) -> Result<()> {
        if self.skip_blank_rows && self.stop_on_blank_row {
            return Err(ScoutError::Config(
                "skip_blank_rows and stop_on_blank_row are mutually exclusive".into(),
            ));
        }
        Ok(())
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            case_insensitive: self.case_insensitive,
            max_rows: self.max_rows,
            unique_columns: self.unique_columns,
        }
    }

    fn provenance(&self) -> Provenance {
        Provenance {
            row: self.save_row,
            abs_row: self.save_row_abs,
            abs_col: self.save_col_abs,
        }
    }
}

/// What an extraction run produced.
#[derive(Debug)]
pub struct Extraction {
    /// Canonical header, when one exists.
    pub header: Option<Vec<String>>,
    /// Absolute source position of the header row, when one was read from
    /// the source (located or first-row).
    pub header_row: Option<u64>,
    pub records: Vec<Record>,
}

/// Run the full engine over a row source: establish the header per `mode`,
/// then materialize every following row into records per `opts`.
pub fn extract(
    source: &mut dyn RowSource,
    mode: &HeaderMode,
    translation: &HashMap<String, String>,
    opts: &ExtractOptions,
) -> Result<Extraction> {
    opts.validate()?;

    let required = match mode {
        HeaderMode::Search(cols) => cols.clone(),
        _ => Vec::new(),
    };
    let mut scan = HeaderScan::new(required, translation.clone(), opts.scan_options());

    // count every row pulled so records can be tagged with the line a user
    // would look at
    let mut pulled: u64 = 0;

    for _ in 0..opts.start_row {
        if source.next_row()?.is_none() {
            break;
        }
        pulled += 1;
    }

    let mut header: Option<Vec<String>> = None;
    let mut header_row: Option<u64> = None;

    match mode {
        HeaderMode::None => {
            debug!("no header mode; records will be row-shaped");
        }
        HeaderMode::Explicit(columns) => {
            // caller-supplied names still go through the translator, so
            // translations apply and blanks get placeholder names
            header = Some(scan.translator().remap_names(columns));
            debug!(header = ?header, "using caller-supplied header");
        }
        HeaderMode::FirstRow => {
            let row = source.next_row()?.ok_or_else(|| {
                ScoutError::SearchFailed("source exhausted before the header row".into())
            })?;
            pulled += 1;
            if row.is_blank() {
                return Err(ScoutError::SearchFailed(format!(
                    "header row {} has no values",
                    row.abs_row
                )));
            }
            header_row = Some(row.abs_row);
            header = Some(scan.translator().remap(&row.cells));
            debug!(header = ?header, "took first row as header");
        }
        HeaderMode::Search(_) => loop {
            let Some(row) = source.next_row()? else {
                // ran dry mid-search: the budget was unreachable, surface it
                // the same way as an exhausted budget
                return Err(ScoutError::SearchExceeded {
                    max_rows: opts.max_rows,
                    row: scan.rows_seen(),
                });
            };
            pulled += 1;
            if scan.try_match(&row.cells) {
                header_row = Some(row.abs_row);
                header = scan.header().map(|h| h.to_vec());
                debug!(row = row.abs_row, header = ?header, "header located");
                break;
            }
            match scan.state() {
                ScanState::Exceeded => {
                    return Err(ScoutError::SearchExceeded {
                        max_rows: opts.max_rows,
                        row: scan.rows_seen(),
                    });
                }
                ScanState::Failed => {
                    return Err(ScoutError::SearchFailed(
                        scan.error().unwrap_or("header search failed").to_string(),
                    ));
                }
                _ => {}
            }
        },
    }

    // no header means there is nothing to key fields off
    let shape = if header.is_none() {
        if opts.shape == RecordShape::Keyed && !matches!(mode, HeaderMode::None) {
            debug!("no header available; forcing row-shaped records");
        }
        RecordShape::Rows
    } else {
        opts.shape
    };

    let date_fields = opts.date_fields.clone();
    let materializer = Materializer::new(
        header.as_deref(),
        shape,
        opts.provenance(),
        &date_fields,
        source.typed(),
    );

    let mut records = Vec::new();
    while let Some(row) = source.next_row()? {
        pulled += 1;
        if row.is_blank() {
            if opts.stop_on_blank_row {
                debug!(row = row.abs_row, "blank row; stopping");
                break;
            }
            if opts.skip_blank_rows {
                debug!(row = row.abs_row, "blank row; skipped");
                continue;
            }
        }
        records.push(materializer.build(row, pulled));
    }

    Ok(Extraction {
        header,
        header_row,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::VecSource;
    use crate::value::Value;

    fn translation(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn locates_buried_header_and_materializes_records() -> anyhow::Result<()> {
        let mut src = VecSource::from_strs(&[
            &["x", "y"],
            &["Name", "Age", "Notes"],
            &["Bob", "30", ""],
        ]);
        let out = extract(
            &mut src,
            &HeaderMode::Search(vec!["Name".into(), "Age".into()]),
            &HashMap::new(),
            &ExtractOptions::default(),
        )?;

        assert_eq!(out.header.as_deref().unwrap(), &["Name", "Age", "Notes"]);
        assert_eq!(out.header_row, Some(2));
        assert_eq!(out.records.len(), 1);
        let rec = out.records[0].as_keyed().unwrap();
        assert_eq!(rec["Name"], Value::Text("Bob".into()));
        assert_eq!(rec["Age"], Value::Text("30".into()));
        assert_eq!(rec["Notes"], Value::Empty);
        Ok(())
    }

    #[test]
    fn budget_of_one_never_reaches_the_real_header() {
        let mut src = VecSource::from_strs(&[
            &["x", "y"],
            &["Name", "Age", "Notes"],
            &["Bob", "30", ""],
        ]);
        let err = extract(
            &mut src,
            &HeaderMode::Search(vec!["Name".into(), "Age".into()]),
            &HashMap::new(),
            &ExtractOptions {
                max_rows: 1,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScoutError::SearchExceeded { max_rows: 1, .. }
        ));
    }

    #[test]
    fn source_running_dry_is_search_exceeded_not_silence() {
        let mut src = VecSource::from_strs(&[&["x"], &["y"]]);
        let err = extract(
            &mut src,
            &HeaderMode::Search(vec!["Name".into()]),
            &HashMap::new(),
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::SearchExceeded { row: 2, .. }));
    }

    #[test]
    fn duplicate_header_columns_fail_the_search() {
        let mut src = VecSource::from_strs(&[&["A", "B", "A"], &["1", "2", "3"]]);
        let err = extract(
            &mut src,
            &HeaderMode::Search(vec!["A".into(), "B".into()]),
            &HashMap::new(),
            &ExtractOptions {
                unique_columns: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::SearchFailed(_)));
    }

    #[test]
    fn first_row_mode_respects_start_row() -> anyhow::Result<()> {
        let mut src = VecSource::from_strs(&[
            &["report title"],
            &["Name", "Age"],
            &["Bob", "30"],
        ]);
        let out = extract(
            &mut src,
            &HeaderMode::FirstRow,
            &HashMap::new(),
            &ExtractOptions {
                start_row: 1,
                ..Default::default()
            },
        )?;
        assert_eq!(out.header.as_deref().unwrap(), &["Name", "Age"]);
        assert_eq!(out.header_row, Some(2));
        assert_eq!(out.records.len(), 1);
        Ok(())
    }

    #[test]
    fn explicit_mode_consumes_no_header_row() -> anyhow::Result<()> {
        let mut src = VecSource::from_strs(&[&["Bob", "30"], &["Amy", "25"]]);
        let out = extract(
            &mut src,
            &HeaderMode::Explicit(vec!["Name".into(), "Age".into()]),
            &HashMap::new(),
            &ExtractOptions::default(),
        )?;
        assert!(out.header_row.is_none());
        assert_eq!(out.records.len(), 2);
        assert_eq!(
            out.records[1].get("Name"),
            Some(&Value::Text("Amy".into()))
        );
        Ok(())
    }

    #[test]
    fn explicit_header_goes_through_the_translator() -> anyhow::Result<()> {
        let mut src = VecSource::from_strs(&[&["12", "x"]]);
        let out = extract(
            &mut src,
            &HeaderMode::Explicit(vec!["Qty".into(), "".into()]),
            &translation(&[("Qty", "Quantity")]),
            &ExtractOptions::default(),
        )?;
        assert_eq!(out.header.as_deref().unwrap(), &["Quantity", "blank001"]);
        Ok(())
    }

    #[test]
    fn no_header_mode_forces_row_records() -> anyhow::Result<()> {
        let mut src = VecSource::from_strs(&[&["a", "b"], &["c", "d"]]);
        let out = extract(
            &mut src,
            &HeaderMode::None,
            &HashMap::new(),
            &ExtractOptions {
                save_row: true,
                ..Default::default()
            },
        )?;
        assert!(out.header.is_none());
        assert_eq!(
            out.records[0].as_row().unwrap(),
            &[
                Value::Text("a".into()),
                Value::Text("b".into()),
                Value::Int(1)
            ]
        );
        Ok(())
    }

    #[test]
    fn blank_row_policies() -> anyhow::Result<()> {
        let rows: &[&[&str]] = &[&["Name"], &["a"], &[""], &["b"]];

        let out = extract(
            &mut VecSource::from_strs(rows),
            &HeaderMode::FirstRow,
            &HashMap::new(),
            &ExtractOptions {
                skip_blank_rows: true,
                ..Default::default()
            },
        )?;
        assert_eq!(out.records.len(), 2);

        let out = extract(
            &mut VecSource::from_strs(rows),
            &HeaderMode::FirstRow,
            &HashMap::new(),
            &ExtractOptions {
                stop_on_blank_row: true,
                ..Default::default()
            },
        )?;
        assert_eq!(out.records.len(), 1);

        let err = extract(
            &mut VecSource::from_strs(rows),
            &HeaderMode::FirstRow,
            &HashMap::new(),
            &ExtractOptions {
                skip_blank_rows: true,
                stop_on_blank_row: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
        Ok(())
    }

    #[test]
    fn options_from_json_warns_on_suspect_keys() -> anyhow::Result<()> {
        let value = serde_json::json!({
            "max_rows": 25,
            "maxrow": 5,
            "mystery": true,
        });
        let (opts, warnings) = ExtractOptions::from_json(
            &value,
            WarningPolicy {
                quiet: true,
                fatal: false,
            },
        )?;
        assert_eq!(opts.max_rows, 25);
        assert_eq!(warnings.len(), 2);

        let err = ExtractOptions::from_json(
            &value,
            WarningPolicy {
                quiet: true,
                fatal: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
        Ok(())
    }
}
