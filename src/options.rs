// src/options.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::error::{Result, ScoutError};

/// Option keys people reliably get wrong, mapped to the key they meant.
/// Grown from years of option files hitting the original readers.
static SUSPECT_KEYS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("no_case", "case_insensitive"),
        ("nocase", "case_insensitive"),
        ("caseinsensitive", "case_insensitive"),
        ("max_row", "max_rows"),
        ("maxrow", "max_rows"),
        ("maxrows", "max_rows"),
        ("uniquecolumn", "unique_columns"),
        ("unique_column", "unique_columns"),
        ("uniquecolumns", "unique_columns"),
        ("startrow", "start_row"),
        ("startrows", "start_row"),
        ("start_rows", "start_row"),
        ("saverow", "save_row"),
        ("saverows", "save_row"),
        ("save_rows", "save_row"),
        ("saverowabs", "save_row_abs"),
        ("save_rows_abs", "save_row_abs"),
        ("savecolabs", "save_col_abs"),
        ("save_cols_abs", "save_col_abs"),
        ("datefields", "date_fields"),
        ("dateflds", "date_fields"),
        ("skipblankrows", "skip_blank_rows"),
        ("skip_blank_row", "skip_blank_rows"),
        ("stoponblankrow", "stop_on_blank_row"),
        ("stop_on_blank_rows", "stop_on_blank_row"),
    ])
});

/// A suspect key found in a configuration bag: either a known misspelling
/// with a suggested correction, or a key nothing recognizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionWarning {
    /// Where the bag came from, e.g. the function that received it.
    pub context: String,
    pub given: String,
    pub expected: Option<&'static str>,
}

impl fmt::Display for OptionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected {
            Some(expected) => write!(
                f,
                "{}: possible mistyped option key `{}`, did you mean `{}`?",
                self.context, self.given, expected
            ),
            None => write!(f, "{}: unknown option key `{}`", self.context, self.given),
        }
    }
}

/// How to react to suspect keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct WarningPolicy {
    /// Skip the `tracing::warn!` per finding; the warning list is returned
    /// either way.
    pub quiet: bool,
    /// Treat any finding as a configuration error.
    pub fatal: bool,
}

/// Check the keys of a loosely-typed configuration bag against the
/// known-mistyped table. Returns one warning per mistyped key present; never
/// corrects anything; the caller owns the bag.
pub fn check_option_keys<'a>(
    context: &str,
    keys: impl IntoIterator<Item = &'a str>,
    policy: WarningPolicy,
) -> Result<Vec<OptionWarning>> {
    collect_warnings(
        context,
        keys.into_iter()
            .filter_map(|key| SUSPECT_KEYS.get(key).map(|expected| (key, Some(*expected)))),
        policy,
    )
}

/// Like [`check_option_keys`], but also flags keys that are neither known
/// good (`known`) nor known mistyped. Used where options arrive as data
/// (option files) rather than through the type system.
pub fn check_unknown_keys<'a>(
    context: &str,
    keys: impl IntoIterator<Item = &'a str>,
    known: &[&str],
    policy: WarningPolicy,
) -> Result<Vec<OptionWarning>> {
    collect_warnings(
        context,
        keys.into_iter().filter_map(|key| {
            if known.contains(&key) {
                None
            } else {
                Some((key, SUSPECT_KEYS.get(key).copied()))
            }
        }),
        policy,
    )
}

fn collect_warnings<'a>(
    context: &str,
    findings: impl Iterator<Item = (&'a str, Option<&'static str>)>,
    policy: WarningPolicy,
) -> Result<Vec<OptionWarning>> {
    let mut warnings = Vec::new();
    for (given, expected) in findings {
        let w = OptionWarning {
            context: context.to_string(),
            given: given.to_string(),
            expected,
        };
        if !policy.quiet {
            warn!("{}", w);
        }
        warnings.push(w);
    }

    if policy.fatal && !warnings.is_empty() {
        let listed: Vec<&str> = warnings.iter().map(|w| w.given.as_str()).collect();
        return Err(ScoutError::Config(format!(
            "{}: bad option keys: {}",
            context,
            listed.join(", ")
        )));
    }

    Ok(warnings)
}
