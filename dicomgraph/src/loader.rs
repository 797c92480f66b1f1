/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Reads metadata records from JSON.
//!
//! Two layouts are accepted, mixed freely inside one top-level array:
//! flat `{"Patient ID": "...", "Modality": "CT", ...}` objects, and DICOM
//! element dumps `{"FilePath": "...", "Dataset": [{"Tag", "VR", "Name", "Value"}]}`.

use crate::custom_error::LoadError;
use crate::mapper::parse_dicom_date;
use crate::record::{FieldValue, MetadataRecord};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DumpElement {
    #[serde(rename = "Tag", default)]
    tag: String,
    #[serde(rename = "VR", default)]
    vr: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value", default)]
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordSource {
    Dump {
        #[serde(rename = "FilePath", default)]
        file_path: Option<String>,
        #[serde(rename = "Dataset")]
        dataset: Vec<DumpElement>,
    },
    Failed {
        #[serde(rename = "FilePath", default)]
        file_path: Option<String>,
        #[serde(rename = "Error")]
        error: String,
    },
    Flat(MetadataRecord),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<RecordSource>),
    One(RecordSource),
}

fn element_value(element: DumpElement) -> Option<FieldValue> {
    let value = FieldValue::from_json(element.value);
    let text = value.as_text()?;
    match element.vr.as_str() {
        "SQ" => None,
        "DA" => Some(parse_dicom_date(&text).map(FieldValue::Date).unwrap_or(value)),
        "IS" | "US" | "UL" | "SS" | "SL" => match value {
            FieldValue::Text(_) => Some(text.trim().parse().map(FieldValue::Integer).unwrap_or(value)),
            other => Some(other),
        },
        "DS" | "FD" | "FL" => match value {
            FieldValue::Text(_) => Some(text.trim().parse().map(FieldValue::Decimal).unwrap_or(value)),
            other => Some(other),
        },
        _ => Some(value),
    }
}

fn into_record(source: RecordSource, origin: &str) -> Option<MetadataRecord> {
    match source {
        RecordSource::Flat(record) => Some(record),
        RecordSource::Dump { file_path, dataset } => {
            let mut record = MetadataRecord::new();
            if let Some(file_path) = file_path {
                record.insert("File Path", file_path);
            }
            for element in dataset {
                let name = element.name.clone();
                let tag = element.tag.clone();
                match element_value(element) {
                    Some(value) => record.insert(&name, value),
                    None => log::trace!("Skipping element {} {} in {}", tag, name, origin),
                }
            }
            Some(record)
        }
        RecordSource::Failed { file_path, error } => {
            warn!(
                "Skipping unreadable file {} listed in {}: {}",
                file_path.as_deref().unwrap_or("<unknown>"),
                origin,
                error
            );
            None
        }
    }
}

/// Parses a JSON document holding one record or an array of records.
pub fn parse_records(json: &str, origin: &str) -> Result<Vec<MetadataRecord>, serde_json::Error> {
    let sources = match serde_json::from_str::<Document>(json)? {
        Document::Many(sources) => sources,
        Document::One(source) => vec![source],
    };
    Ok(sources
        .into_iter()
        .filter_map(|source| into_record(source, origin))
        .collect())
}

pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<MetadataRecord>, LoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    let records = parse_records(&json, &display).map_err(|source| LoadError::Json {
        path: display.clone(),
        source,
    })?;
    info!("Loaded {} records from {}", records.len(), display);
    Ok(records)
}
