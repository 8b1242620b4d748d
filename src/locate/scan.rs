// src/locate/scan.rs

use std::collections::HashMap;
use tracing::debug;

use crate::locate::translate::Translator;
use crate::value::Value;

/// Knobs for a header search.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Match required columns and translation keys ignoring case.
    pub case_insensitive: bool,
    /// Rows to examine before giving up.
    pub max_rows: usize,
    /// Require canonical column names on the found header to be unique.
    pub unique_columns: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            case_insensitive: false,
            max_rows: 10,
            unique_columns: false,
        }
    }
}

/// Where a scan currently stands. `Found`, `Failed` and `Exceeded` are
/// terminal and mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Searching,
    Found,
    Failed,
    Exceeded,
}

/// The header-search state machine.
///
/// Feed candidate rows to [`try_match`](HeaderScan::try_match) one at a time;
/// it answers whether the row qualified as the header and tracks the row
/// budget. A row qualifies when every required column is observed at least
/// once, either literally or through the translation table.
pub struct HeaderScan {
    required: Vec<String>,
    translator: Translator,
    opts: ScanOptions,

    state: ScanState,
    rows_seen: usize,
    /// Observation count per required column for the row under examination,
    /// keyed by the (folded, in case-insensitive mode) required name.
    match_count: HashMap<String, u32>,
    matched_columns: usize,
    /// Raw cell values that matched a required column on the qualifying row.
    matched_raw: Vec<String>,
    header: Option<Vec<String>>,
    error: Option<String>,
}

impl HeaderScan {
    pub fn new(
        required: Vec<String>,
        translation: HashMap<String, String>,
        opts: ScanOptions,
    ) -> Self {
        let translator = Translator::new(translation, opts.case_insensitive);
        let mut scan = HeaderScan {
            required,
            translator,
            opts,
            state: ScanState::Searching,
            rows_seen: 0,
            match_count: HashMap::new(),
            matched_columns: 0,
            matched_raw: Vec::new(),
            header: None,
            error: None,
        };
        scan.clear_row_state();
        scan
    }

    /// Prepare for a fresh locate attempt over a new source.
    pub fn reset(&mut self) {
        self.state = ScanState::Searching;
        self.rows_seen = 0;
        self.header = None;
        self.error = None;
        self.clear_row_state();
    }

    fn clear_row_state(&mut self) {
        self.matched_columns = 0;
        self.matched_raw.clear();
        self.match_count.clear();
        for col in &self.required {
            self.match_count.insert(self.fold(col), 0);
        }
    }

    fn fold(&self, s: &str) -> String {
        if self.opts.case_insensitive {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    }

    /// Examine one candidate row. Returns true when the row qualifies as the
    /// header; check [`state`](HeaderScan::state) afterwards to distinguish a
    /// plain non-match from a terminal failure.
    pub fn try_match(&mut self, row: &[Value]) -> bool {
        self.rows_seen += 1;

        // budget check takes priority over row content
        if self.rows_seen > self.opts.max_rows {
            self.state = ScanState::Exceeded;
            self.error = Some(format!(
                "max search row count [{}] exceeded at row [{}]",
                self.opts.max_rows, self.rows_seen
            ));
            debug!(rows_seen = self.rows_seen, "header search budget exhausted");
            return false;
        }

        self.clear_row_state();

        for cell in row {
            if cell.is_empty() {
                continue;
            }
            let Some(text) = cell.as_text() else {
                // numeric/typed cells never name a column
                continue;
            };

            let key = self.fold(text);
            if let Some(count) = self.match_count.get_mut(&key) {
                *count += 1;
                self.matched_raw.push(text.to_string());
                continue;
            }
            // not a direct hit; maybe the translation table knows this text
            if let Some(canonical) = self.translator.resolve(text) {
                let key = self.fold(canonical);
                if let Some(count) = self.match_count.get_mut(&key) {
                    *count += 1;
                }
            }
        }

        self.matched_columns = self.match_count.values().filter(|&&c| c > 0).count();
        debug!(
            row = self.rows_seen,
            matched = self.matched_columns,
            required = self.required.len(),
            "scanned candidate row"
        );

        if self.matched_columns != self.required.len() {
            return false;
        }

        // Row qualifies. With unique-column mode on, duplicates still sink it
        // and take priority over declaring success.
        let remapped = self.translator.remap(row);
        if self.opts.unique_columns {
            let duplicates = duplicate_values(&remapped);
            if !duplicates.is_empty() {
                self.state = ScanState::Failed;
                self.error = Some(format!(
                    "row found with duplicate column headers: {}",
                    duplicates.join(", ")
                ));
                return false;
            }
        }

        self.state = ScanState::Found;
        self.header = Some(remapped);
        true
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Required columns observed on the most recently examined row.
    pub fn matched_columns(&self) -> usize {
        self.matched_columns
    }

    pub fn max_rows(&self) -> usize {
        self.opts.max_rows
    }

    pub fn exceeded(&self) -> bool {
        self.state == ScanState::Exceeded
    }

    pub fn failed(&self) -> bool {
        self.state == ScanState::Failed
    }

    /// The translated header row, once found.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Raw cell values that matched required columns on the qualifying row.
    pub fn matched_cells(&self) -> &[String] {
        &self.matched_raw
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }
}

/// Values appearing more than once, each reported a single time, in order of
/// first duplication.
fn duplicate_values(values: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, u32> = HashMap::new();
    let mut duplicates = Vec::new();
    for v in values {
        let count = seen.entry(v.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(v.clone());
        }
    }
    duplicates
}
