// src/extract/collect.rs

use std::collections::HashMap;
use tracing::warn;

use crate::error::{Result, ScoutError};
use crate::extract::materialize::Record;
use crate::value::Value;

/// Join the stringified values of `key_fields`, in order, into one composite
/// key. Errors when `key_fields` is empty or a field is absent from the
/// record; both are programmer errors, not data conditions.
pub fn multifield_key(
    record: &HashMap<String, Value>,
    key_fields: &[String],
    join_char: char,
) -> Result<String> {
    if key_fields.is_empty() {
        return Err(ScoutError::Config("key fields must not be empty".into()));
    }
    let mut parts = Vec::with_capacity(key_fields.len());
    for field in key_fields {
        let value = record
            .get(field)
            .ok_or_else(|| ScoutError::MissingKeyField(field.clone()))?;
        parts.push(value.to_string());
    }
    Ok(parts.join(&join_char.to_string()))
}

/// Keyed records folded into a map, with duplicate-key accounting.
#[derive(Debug, Default)]
pub struct KeyedCollection {
    pub map: HashMap<String, HashMap<String, Value>>,
    /// Keys seen more than once, each listed a single time.
    pub duplicates: Vec<String>,
    /// Total number of overwrites performed.
    pub duplicate_count: usize,
}

/// Fold records into a composite-key map. A repeated key always overwrites
/// the entry with the newest record; with `fail_on_duplicate` the duplicates
/// are additionally collected and reported as a data-integrity error once
/// every record has been processed.
pub fn collect_by_key(
    records: impl IntoIterator<Item = Record>,
    key_fields: &[String],
    join_char: char,
    fail_on_duplicate: bool,
) -> Result<KeyedCollection> {
    let mut out = KeyedCollection::default();

    for record in records {
        let keyed = record
            .into_keyed()
            .ok_or_else(|| ScoutError::Config("collection requires keyed records".into()))?;
        let key = multifield_key(&keyed, key_fields, join_char)?;
        if out.map.contains_key(&key) {
            out.duplicate_count += 1;
            if !out.duplicates.contains(&key) {
                out.duplicates.push(key.clone());
            }
        }
        // last write wins
        out.map.insert(key, keyed);
    }

    if !out.duplicates.is_empty() {
        warn!(
            count = out.duplicate_count,
            keys = %out.duplicates.join(", "),
            "duplicate keys while collecting records"
        );
        if fail_on_duplicate {
            return Err(ScoutError::DuplicateKeys {
                keys: out.duplicates,
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        Record::Keyed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect(),
        )
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn composite_key_joins_in_order() -> anyhow::Result<()> {
        let Record::Keyed(map) = rec(&[("Company", "Acme"), ("Wine", "Red")]) else {
            unreachable!()
        };
        let key = multifield_key(&map, &keys(&["Company", "Wine"]), '|')?;
        assert_eq!(key, "Acme|Red");
        Ok(())
    }

    #[test]
    fn empty_key_fields_is_an_error() {
        let Record::Keyed(map) = rec(&[("A", "1")]) else { unreachable!() };
        assert!(matches!(
            multifield_key(&map, &[], '|'),
            Err(ScoutError::Config(_))
        ));
    }

    #[test]
    fn missing_key_field_is_fatal() {
        let Record::Keyed(map) = rec(&[("A", "1")]) else { unreachable!() };
        let err = multifield_key(&map, &keys(&["Nope"]), '|').unwrap_err();
        assert!(matches!(err, ScoutError::MissingKeyField(f) if f == "Nope"));
    }

    #[test]
    fn tolerant_mode_keeps_last_record() -> anyhow::Result<()> {
        let records = vec![
            rec(&[("Name", "Bob"), ("Age", "30")]),
            rec(&[("Name", "Bob"), ("Age", "31")]),
        ];
        let out = collect_by_key(records, &keys(&["Name"]), '|', false)?;
        assert_eq!(out.map.len(), 1);
        assert_eq!(out.map["Bob"]["Age"], Value::Text("31".into()));
        assert_eq!(out.duplicates, vec!["Bob".to_string()]);
        assert_eq!(out.duplicate_count, 1);
        Ok(())
    }

    #[test]
    fn strict_mode_raises_naming_each_key_once() {
        let records = vec![
            rec(&[("Name", "Bob"), ("Age", "30")]),
            rec(&[("Name", "Bob"), ("Age", "31")]),
            rec(&[("Name", "Bob"), ("Age", "32")]),
        ];
        let err = collect_by_key(records, &keys(&["Name"]), '|', true).unwrap_err();
        match err {
            ScoutError::DuplicateKeys { keys } => assert_eq!(keys, vec!["Bob".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn array_records_cannot_be_collected() {
        let err = collect_by_key(
            vec![Record::Row(vec![Value::Int(1)])],
            &keys(&["Name"]),
            '|',
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
    }
}
