/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::config::MappingConfig;
use crate::custom_error::GraphError;
use crate::ontology::*;
use crate::record::{FieldValue, MetadataRecord};
use crate::vocabulary::*;
use chrono::NaiveDate;
use log::{debug, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use shared::dictionary::SharedDictionary;
use shared::terms::{Datatype, Term, TermValue};
use shared::triple::Statement;
use std::sync::OnceLock;

fn date_pattern() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})$").expect("valid date regex"))
}

fn time_pattern() -> &'static Regex {
    static TIME: OnceLock<Regex> = OnceLock::new();
    TIME.get_or_init(|| {
        Regex::new(r"^(\d{2}):?(\d{2})(?::?(\d{2})(\.\d{1,6})?)?$").expect("valid time regex")
    })
}

/// `YYYYMMDD` or `YYYY-MM-DD` to a calendar date.
pub fn parse_dicom_date(raw: &str) -> Option<NaiveDate> {
    let caps = date_pattern().captures(raw.trim())?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `HHMMSS.ffffff` or `HH:MM:SS` to `HH:MM:SS[.f]`.
pub fn parse_dicom_time(raw: &str) -> Option<String> {
    let caps = time_pattern().captures(raw.trim())?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    let seconds: u32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if hours > 23 || minutes > 59 || seconds > 60 {
        return None;
    }
    let fraction = caps.get(4).map_or("", |m| m.as_str());
    Some(format!("{:02}:{:02}:{:02}{}", hours, minutes, seconds, fraction))
}

/// Bytes escaped in a natural key; only the IRI-unreserved set stays as is.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a trimmed natural key so it can be appended to a base
/// IRI. Distinct keys give distinct segments.
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key.trim(), KEY_ESCAPES).to_string()
}

/// Translates metadata records into statements. Cheap to clone; clones share
/// the interner.
#[derive(Debug, Clone)]
pub struct OntologyMapper {
    dictionary: SharedDictionary,
    config: MappingConfig,
}

struct Required {
    patient_id: String,
    study_date: FieldValue,
    modality: String,
    accession: String,
}

/// Interns while collecting, so statement order follows emission order.
struct Emitter<'a> {
    dictionary: &'a SharedDictionary,
    statements: Vec<Statement>,
}

impl Emitter<'_> {
    fn term(&self, value: &TermValue) -> Term {
        self.dictionary.intern_value(value)
    }

    fn uri(&self, iri: &str) -> Term {
        self.term(&TermValue::uri(iri))
    }

    fn emit(&mut self, subject: Term, predicate: &str, object: Term) {
        let predicate = self.uri(predicate);
        self.statements.push(Statement::new(subject, predicate, object));
    }

    fn emit_value(&mut self, subject: Term, predicate: &str, object: &TermValue) {
        let object = self.term(object);
        self.emit(subject, predicate, object);
    }
}

impl OntologyMapper {
    pub fn new(dictionary: SharedDictionary, config: MappingConfig) -> Self {
        OntologyMapper { dictionary, config }
    }

    pub fn dictionary(&self) -> &SharedDictionary {
        &self.dictionary
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn dataset_iri(&self, accession: &str) -> String {
        format!("{}dataset/{}", self.config.base_uri, encode_key(accession))
    }

    pub fn patient_iri(&self, patient_id: &str) -> String {
        format!("{}patient/{}", self.config.pid_prefix, encode_key(patient_id))
    }

    /// Maps one record. Either every statement of the record is returned or
    /// the record is rejected; nothing is inserted here.
    pub fn map(&self, record: &MetadataRecord) -> Result<Vec<Statement>, GraphError> {
        let required = Self::required_fields(record)?;

        let mut out = Emitter { dictionary: &self.dictionary, statements: Vec::with_capacity(32) };

        let catalog = out.uri(&self.config.catalog_uri);
        let dataset = out.uri(&self.dataset_iri(&required.accession));
        let patient = out.uri(&self.patient_iri(&required.patient_id));

        let catalog_class = out.uri(DCAT_CATALOG);
        out.emit(catalog, RDF_TYPE, catalog_class);
        out.emit(catalog, DCAT_DATASET, dataset);

        let dataset_class = out.uri(HDCAT_DATASET);
        out.emit(dataset, RDF_TYPE, dataset_class);
        out.emit_value(dataset, DCTERMS_IDENTIFIER, &TermValue::literal(required.accession.as_str()));

        let issued = date_value(&required.study_date);
        out.emit_value(
            dataset,
            DCTERMS_TITLE,
            &TermValue::literal(format!("DICOM data for {} on {}", required.patient_id, issued.lexical)),
        );

        out.emit(dataset, DCTERMS_SUBJECT, patient);
        let person_class = out.uri(FOAF_PERSON);
        out.emit(patient, RDF_TYPE, person_class);
        out.emit_value(patient, SCHEMA_IDENTIFIER, &TermValue::literal(required.patient_id.as_str()));

        let concept = modality_concept(&required.modality);
        if !concept.classified {
            debug!("Modality {:?} is not in the modality table", required.modality);
        }
        let concept_term = out.uri(concept.iri);
        out.emit(dataset, DCAT_THEME, concept_term);
        out.emit_value(concept_term, RDFS_LABEL, &TermValue::literal(concept.label));
        out.emit_value(dataset, DICOM_MODALITY, &TermValue::literal(required.modality.as_str()));

        out.emit_value(dataset, SCHEMA_ACCESSION_NUMBER, &TermValue::literal(required.accession.as_str()));
        out.emit_value(dataset, DCTERMS_ISSUED, &issued);

        for mapping in OPTIONAL_FIELDS {
            let Some(value) = mapping.names.iter().find_map(|name| present(record, name)) else {
                continue;
            };
            let subject = match mapping.attach {
                Attach::Dataset => dataset,
                Attach::Patient => patient,
            };
            let object = match mapping.rule {
                ValueRule::AnatomicSite => {
                    let text = value.as_text().unwrap_or_default();
                    match body_part_concept(&text) {
                        Some(iri) => out.uri(iri),
                        None => out.term(&TermValue::literal(text.trim())),
                    }
                }
                rule => out.term(&typed_value(value, rule)),
            };
            out.emit(subject, mapping.predicate, object);
        }

        debug!(
            "Mapped record {} to {} statements",
            required.accession,
            out.statements.len()
        );
        Ok(out.statements)
    }

    fn required_fields(record: &MetadataRecord) -> Result<Required, GraphError> {
        let text = |field: RequiredField| {
            field
                .names()
                .iter()
                .find_map(|name| present(record, name))
                .and_then(FieldValue::as_text)
                .map(|value| value.trim().to_string())
                .ok_or_else(|| GraphError::missing(field.label()))
        };

        let patient_id = text(RequiredField::PatientId)?;
        let study_date = RequiredField::StudyDate
            .names()
            .iter()
            .find_map(|name| present(record, name))
            .cloned()
            .ok_or_else(|| GraphError::missing(RequiredField::StudyDate.label()))?;
        let modality = text(RequiredField::Modality)?;
        let accession = text(RequiredField::AccessionNumber)?;

        Ok(Required { patient_id, study_date, modality, accession })
    }
}

/// A field counts as present when it has a value that is not blank.
fn present<'a>(record: &'a MetadataRecord, name: &str) -> Option<&'a FieldValue> {
    record
        .get(name)
        .filter(|value| value.as_text().map_or(false, |text| !text.trim().is_empty()))
}

fn date_value(value: &FieldValue) -> TermValue {
    if let FieldValue::Date(date) = value {
        return TermValue::typed(date.format("%Y-%m-%d").to_string(), Datatype::Date);
    }
    let raw = value.as_text().unwrap_or_default();
    match parse_dicom_date(&raw) {
        Some(date) => TermValue::typed(date.format("%Y-%m-%d").to_string(), Datatype::Date),
        None => {
            warn!("Unrecognised date {:?}, keeping it as a plain literal", raw);
            TermValue::literal(raw.trim())
        }
    }
}

fn typed_value(value: &FieldValue, rule: ValueRule) -> TermValue {
    let raw = value.as_text().unwrap_or_default();
    let raw = raw.trim();
    match (rule, value) {
        (ValueRule::Date, _) => date_value(value),
        (ValueRule::Time, _) => match parse_dicom_time(raw) {
            Some(time) => TermValue::typed(time, Datatype::Time),
            None => TermValue::literal(raw),
        },
        (ValueRule::Integer, FieldValue::Integer(n)) => TermValue::typed(n.to_string(), Datatype::Integer),
        (ValueRule::Integer, FieldValue::Decimal(n)) if n.fract() == 0.0 => {
            TermValue::typed(format!("{}", *n as i64), Datatype::Integer)
        }
        (ValueRule::Integer, _) => match raw.parse::<i64>() {
            Ok(n) => TermValue::typed(n.to_string(), Datatype::Integer),
            Err(_) => TermValue::literal(raw),
        },
        (ValueRule::Decimal, FieldValue::Integer(_) | FieldValue::Decimal(_)) => {
            TermValue::typed(raw, Datatype::Decimal)
        }
        (ValueRule::Decimal, _) => match raw.parse::<f64>() {
            Ok(_) => TermValue::typed(raw, Datatype::Decimal),
            Err(_) => TermValue::literal(raw),
        },
        (_, FieldValue::Integer(n)) => TermValue::typed(n.to_string(), Datatype::Integer),
        (_, FieldValue::Decimal(_)) => TermValue::typed(raw, Datatype::Decimal),
        (_, FieldValue::Date(_)) => date_value(value),
        _ => TermValue::literal(raw),
    }
}
