//! Header-locating reader for delimited files and other tabular sources.
//!
//! Real exports rarely start with their header row: title lines, print
//! timestamps and blank padding come first, and the column names themselves
//! drift between revisions. This crate scans a bounded window of rows for the
//! header, normalizes the column names through a translation table, and
//! materializes the rows that follow into array- or field-keyed records,
//! optionally folded into a composite-key map.
//!
//! The engine is source-agnostic: anything implementing
//! [`source::RowSource`] can be scanned. A CSV adapter ships in
//! [`adapters::csv`].

pub mod adapters;
pub mod error;
pub mod extract;
pub mod locate;
pub mod options;
pub mod source;
pub mod value;

pub use error::{Result, ScoutError};
pub use extract::{extract, ExtractOptions, Extraction, HeaderMode, Record, RecordShape};
pub use locate::{HeaderScan, ScanOptions, ScanState, Translator};
pub use source::{Row, RowSource, VecSource};
pub use value::Value;
