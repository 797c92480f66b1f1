/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of one metadata field as handed over by a record producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Unknown,
}

impl FieldValue {
    /// Lexical form, or `None` when the producer had no usable value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Decimal(n) => Some(n.to_string()),
            FieldValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            FieldValue::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown)
    }

    /// Converts an arbitrary JSON value. Multi-valued elements are joined
    /// with `\`, the DICOM value separator.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null | Value::Object(_) => FieldValue::Unknown,
            Value::Bool(flag) => FieldValue::Text(flag.to_string()),
            Value::Number(number) => match number.as_i64() {
                Some(n) => FieldValue::Integer(n),
                None => number.as_f64().map(FieldValue::Decimal).unwrap_or(FieldValue::Unknown),
            },
            Value::String(text) => FieldValue::Text(text),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .into_iter()
                    .filter_map(|item| FieldValue::from_json(item).as_text())
                    .collect();
                if parts.is_empty() {
                    FieldValue::Unknown
                } else {
                    FieldValue::Text(parts.join("\\"))
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(FieldValue::from_json)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Field names compare case- and punctuation-insensitively:
/// "Accession Number", "AccessionNumber" and "accession_number" are one field.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A flat `field name -> value` metadata record. Holds at most one spelling
/// of each field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Replaces any earlier spelling of the same field; the last write wins.
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        let wanted = normalize_field_name(name);
        self.fields.retain(|key, _| normalize_field_name(key) != wanted);
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let wanted = normalize_field_name(name);
        let key = self
            .fields
            .keys()
            .find(|key| normalize_field_name(key) == wanted)
            .cloned()?;
        self.fields.remove(&key)
    }

    /// Looks a field up by any spelling of its name. Unknown values count as absent.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let wanted = normalize_field_name(name);
        self.fields
            .iter()
            .find(|(key, value)| !value.is_unknown() && normalize_field_name(key) == wanted)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = MetadataRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of field names to values")
    }

    // Entries go through `insert` in document order.
    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut record = MetadataRecord::new();
        while let Some((name, value)) = map.next_entry::<String, FieldValue>()? {
            record.insert(&name, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for MetadataRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}
