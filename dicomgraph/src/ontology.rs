/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Static translation tables from raw DICOM values to ontology terms, and the
//! table of metadata fields the mapper understands.

use crate::vocabulary::*;

/// Modality code -> ontology concept.
pub const MODALITY_TABLE: &[(&str, &str)] = &[
    ("CT", "http://snomed.info/sct/7771000"),
    ("MR", "http://snomed.info/sct/25064002"),
    ("RTSTRUCT", "http://www.cancerdata.org/roo/ROO_00473"),
    ("RTPLAN", "http://www.cancerdata.org/roo/ROO_00469"),
    ("RTDOSE", "http://www.cancerdata.org/roo/ROO_00472"),
];

pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

/// Body part examined -> SNOMED CT concept.
pub const BODY_PART_TABLE: &[(&str, &str)] = &[
    ("THYROID", "http://snomed.info/sct/111160001"),
];

/// A modality resolved against `MODALITY_TABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalityConcept {
    pub iri: &'static str,
    pub label: &'static str,
    pub classified: bool,
}

/// Unknown codes resolve to the generic unclassified concept instead of failing.
pub fn modality_concept(code: &str) -> ModalityConcept {
    let code = code.trim();
    MODALITY_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|&(known, iri)| ModalityConcept { iri, label: known, classified: true })
        .unwrap_or(ModalityConcept {
            iri: ROO_UNCLASSIFIED_MODALITY,
            label: UNCLASSIFIED_LABEL,
            classified: false,
        })
}

pub fn body_part_concept(body_part: &str) -> Option<&'static str> {
    let body_part = body_part.trim();
    BODY_PART_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(body_part))
        .map(|&(_, iri)| iri)
}

/// Fields every record must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    PatientId,
    StudyDate,
    Modality,
    AccessionNumber,
}

impl RequiredField {
    pub const ALL: [RequiredField; 4] = [
        RequiredField::PatientId,
        RequiredField::StudyDate,
        RequiredField::Modality,
        RequiredField::AccessionNumber,
    ];

    /// Name reported in `MissingRequiredField`.
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::PatientId => "patient identifier",
            RequiredField::StudyDate => "study date",
            RequiredField::Modality => "modality",
            RequiredField::AccessionNumber => "accession number",
        }
    }

    /// Record field names tried in order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            RequiredField::PatientId => &["Patient ID", "patient identifier"],
            RequiredField::StudyDate => &["Study Date", "Series Date"],
            RequiredField::Modality => &["Modality"],
            RequiredField::AccessionNumber => &["Accession Number"],
        }
    }
}

/// How a raw field value becomes an object term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    Text,
    Date,
    Time,
    Integer,
    Decimal,
    /// SNOMED concept when the body part is in `BODY_PART_TABLE`, else text
    AnatomicSite,
}

/// Node a field's statement hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    Dataset,
    Patient,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub names: &'static [&'static str],
    pub predicate: &'static str,
    pub rule: ValueRule,
    pub attach: Attach,
    /// Contributes to the catalog's free-text search
    pub searchable: bool,
}

const fn field(
    names: &'static [&'static str],
    predicate: &'static str,
    rule: ValueRule,
    searchable: bool,
) -> FieldMapping {
    FieldMapping { names, predicate, rule, attach: Attach::Dataset, searchable }
}

/// Optional fields passed through when present, in emission order.
pub const OPTIONAL_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        names: &["Patient's Name", "PatientName"],
        predicate: FOAF_NAME,
        rule: ValueRule::Text,
        attach: Attach::Patient,
        searchable: false,
    },
    field(&["Patient's Sex", "PatientSex"], ROO_HAS_SEX, ValueRule::Text, false),
    field(&["Patient's Age", "PatientAge"], ROO_HAS_AGE, ValueRule::Text, false),
    field(&["Body Part Examined"], ROO_HAS_ANATOMIC_SITE, ValueRule::AnatomicSite, false),
    field(&["Body Part Examined"], DICOM_BODY_PART_EXAMINED, ValueRule::Text, true),
    field(&["Manufacturer"], DICOM_MANUFACTURER, ValueRule::Text, true),
    field(&["Manufacturer's Model Name", "ManufacturerModelName", "model name"], DICOM_MODEL_NAME, ValueRule::Text, true),
    field(&["Reason for Study", "ReasonForStudy"], ROO_HAS_REASON_FOR_STUDY, ValueRule::Text, true),
    field(&["Study Description"], DCTERMS_DESCRIPTION, ValueRule::Text, true),
    field(&["Series Description"], DICOM_SERIES_DESCRIPTION, ValueRule::Text, true),
    field(&["Protocol Name"], DICOM_PROTOCOL_NAME, ValueRule::Text, true),
    field(&["Study Time"], DICOM_STUDY_TIME, ValueRule::Time, false),
    field(&["Study Instance UID"], DICOM_STUDY_INSTANCE_UID, ValueRule::Text, false),
    field(&["Series Instance UID"], DICOM_SERIES_INSTANCE_UID, ValueRule::Text, false),
    field(&["SOP Instance UID"], DICOM_SOP_INSTANCE_UID, ValueRule::Text, false),
    field(&["Series Number"], DICOM_SERIES_NUMBER, ValueRule::Integer, false),
    field(&["Slice Thickness"], DICOM_SLICE_THICKNESS, ValueRule::Decimal, false),
    field(&["KVP"], DICOM_KVP, ValueRule::Decimal, false),
    field(&["Rows"], DICOM_ROWS, ValueRule::Integer, false),
    field(&["Columns"], DICOM_COLUMNS, ValueRule::Integer, false),
    field(&["Additional Patient History"], ROO_HAS_PATIENT_HISTORY, ValueRule::Text, true),
    field(&["Study Comments"], ROO_HAS_STUDY_COMMENT, ValueRule::Text, true),
];

/// Dataset predicates whose literal objects feed free-text search.
pub fn searchable_predicates() -> impl Iterator<Item = &'static str> {
    [DCTERMS_TITLE, SCHEMA_ACCESSION_NUMBER, DICOM_MODALITY]
        .into_iter()
        .chain(OPTIONAL_FIELDS.iter().filter(|f| f.searchable).map(|f| f.predicate))
}
