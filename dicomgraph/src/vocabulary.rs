/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! IRIs of the vocabularies the mapper writes into the graph.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

// dcterms
pub const DCTERMS_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DCTERMS_SUBJECT: &str = "http://purl.org/dc/terms/subject";
pub const DCTERMS_ISSUED: &str = "http://purl.org/dc/terms/issued";
pub const DCTERMS_DESCRIPTION: &str = "http://purl.org/dc/terms/description";

// dcat / health dcat-ap
pub const DCAT_CATALOG: &str = "http://www.w3.org/ns/dcat#Catalog";
pub const DCAT_DATASET: &str = "http://www.w3.org/ns/dcat#dataset";
pub const DCAT_THEME: &str = "http://www.w3.org/ns/dcat#theme";
pub const HDCAT_DATASET: &str = "http://health.data.gov.eu/def/dcat-ap/Dataset";

// foaf / schema.org
pub const FOAF_PERSON: &str = "http://xmlns.com/foaf/0.1/Person";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
pub const SCHEMA_IDENTIFIER: &str = "http://schema.org/identifier";
pub const SCHEMA_ACCESSION_NUMBER: &str = "http://schema.org/accessionNumber";

// Radiation Oncology Ontology
pub const ROO_NAMESPACE: &str = "http://www.cancerdata.org/roo/";
pub const ROO_HAS_SEX: &str = "http://www.cancerdata.org/roo/hasSex";
pub const ROO_HAS_AGE: &str = "http://www.cancerdata.org/roo/hasAge";
pub const ROO_HAS_ANATOMIC_SITE: &str = "http://www.cancerdata.org/roo/hasAnatomicSite";
pub const ROO_HAS_REASON_FOR_STUDY: &str = "http://www.cancerdata.org/roo/hasReasonForStudy";
pub const ROO_HAS_PATIENT_HISTORY: &str = "http://www.cancerdata.org/roo/hasPatientHistory";
pub const ROO_HAS_STUDY_COMMENT: &str = "http://www.cancerdata.org/roo/hasStudyComment";
pub const ROO_UNCLASSIFIED_MODALITY: &str = "http://www.cancerdata.org/roo/UnclassifiedModality";

pub const SNOMED_NAMESPACE: &str = "http://snomed.info/sct/";

// DICOM ontology
pub const DICOM_NAMESPACE: &str = "http://dicom.nema.org/resources/ontology/DCM#";
pub const DICOM_MODALITY: &str = "http://dicom.nema.org/resources/ontology/DCM#Modality";
pub const DICOM_BODY_PART_EXAMINED: &str = "http://dicom.nema.org/resources/ontology/DCM#BodyPartExamined";
pub const DICOM_MANUFACTURER: &str = "http://dicom.nema.org/resources/ontology/DCM#Manufacturer";
pub const DICOM_MODEL_NAME: &str = "http://dicom.nema.org/resources/ontology/DCM#ManufacturerModelName";
pub const DICOM_SERIES_DESCRIPTION: &str = "http://dicom.nema.org/resources/ontology/DCM#SeriesDescription";
pub const DICOM_STUDY_TIME: &str = "http://dicom.nema.org/resources/ontology/DCM#StudyTime";
pub const DICOM_STUDY_INSTANCE_UID: &str = "http://dicom.nema.org/resources/ontology/DCM#StudyInstanceUID";
pub const DICOM_SERIES_INSTANCE_UID: &str = "http://dicom.nema.org/resources/ontology/DCM#SeriesInstanceUID";
pub const DICOM_SOP_INSTANCE_UID: &str = "http://dicom.nema.org/resources/ontology/DCM#SOPInstanceUID";
pub const DICOM_PROTOCOL_NAME: &str = "http://dicom.nema.org/resources/ontology/DCM#ProtocolName";
pub const DICOM_SLICE_THICKNESS: &str = "http://dicom.nema.org/resources/ontology/DCM#SliceThickness";
pub const DICOM_KVP: &str = "http://dicom.nema.org/resources/ontology/DCM#KVP";
pub const DICOM_ROWS: &str = "http://dicom.nema.org/resources/ontology/DCM#Rows";
pub const DICOM_COLUMNS: &str = "http://dicom.nema.org/resources/ontology/DCM#Columns";
pub const DICOM_SERIES_NUMBER: &str = "http://dicom.nema.org/resources/ontology/DCM#SeriesNumber";

/// Local name of an IRI: the part after the last `/` or `#`.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(|c| c == '/' || c == '#')
        .find(|segment| !segment.is_empty())
        .unwrap_or(iri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(DCAT_THEME), "theme");
        assert_eq!(local_name(DCTERMS_SUBJECT), "subject");
        assert_eq!(local_name("http://local.dev/dicom-demo/dataset/ACC_5000"), "ACC_5000");
        assert_eq!(local_name("plain"), "plain");
    }
}
