pub mod scan;
pub mod translate;

pub use scan::{HeaderScan, ScanOptions, ScanState};
pub use translate::Translator;
