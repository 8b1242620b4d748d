// src/locate/translate.rs

use std::collections::HashMap;

use crate::value::Value;

/// Maps raw header text to canonical field names.
///
/// Holds the table as given plus, in case-insensitive mode, a folded index.
/// The folded index always resolves to the *original-case* canonical value so
/// downstream consumers never see a folded name.
#[derive(Clone, Debug, Default)]
pub struct Translator {
    direct: HashMap<String, String>,
    folded: HashMap<String, String>,
    case_insensitive: bool,
}

impl Translator {
    pub fn new(table: HashMap<String, String>, case_insensitive: bool) -> Self {
        let mut folded = HashMap::new();
        if case_insensitive {
            for (raw, canonical) in &table {
                folded.insert(raw.to_lowercase(), canonical.clone());
            }
        }
        Translator {
            direct: table,
            folded,
            case_insensitive,
        }
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Canonical name for `raw`, if the table knows it: exact hit first,
    /// folded hit second (case-insensitive mode only).
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        if let Some(canonical) = self.direct.get(raw) {
            return Some(canonical);
        }
        if self.case_insensitive {
            return self.folded.get(&raw.to_lowercase()).map(String::as_str);
        }
        None
    }

    /// Convert a raw header row into canonical column names, in order.
    ///
    /// Blank cells get a synthesized `blank001`, `blank002`, ... name; the
    /// counter runs over blanks only, not column positions. Unknown non-blank
    /// cells keep their text as-is. Output length always equals input length.
    pub fn remap(&self, row: &[Value]) -> Vec<String> {
        let mut blank_count = 0usize;
        row.iter()
            .map(|cell| {
                if cell.is_empty() {
                    blank_count += 1;
                    return format!("blank{:03}", blank_count);
                }
                let raw = cell.to_string();
                match self.resolve(&raw) {
                    Some(canonical) => canonical.to_string(),
                    None => raw,
                }
            })
            .collect()
    }

    /// Remap already-textual names, e.g. a caller-supplied header.
    pub fn remap_names(&self, names: &[String]) -> Vec<String> {
        let cells: Vec<Value> = names.iter().map(|n| Value::from(n.clone())).collect();
        self.remap(&cells)
    }
}
