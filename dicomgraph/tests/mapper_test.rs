/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate dicomgraph;
use dicomgraph::config::MappingConfig;
use dicomgraph::custom_error::GraphError;
use dicomgraph::mapper::OntologyMapper;
use dicomgraph::record::MetadataRecord;
use dicomgraph::vocabulary::*;
use shared::dictionary::SharedDictionary;
use shared::terms::{Datatype, TermKind, TermValue};
use shared::triple::Statement;
use std::collections::BTreeSet;

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> OntologyMapper {
        OntologyMapper::new(SharedDictionary::new(), MappingConfig::default())
    }

    fn record(patient: &str, accession: &str, date: &str, modality: &str) -> MetadataRecord {
        MetadataRecord::new()
            .with("Patient ID", patient)
            .with("Study Date", date)
            .with("Modality", modality)
            .with("Accession Number", accession)
    }

    /// Decoded (subject, predicate, object) triples for readable assertions.
    fn decoded(mapper: &OntologyMapper, statements: &[Statement]) -> Vec<(TermValue, TermValue, TermValue)> {
        let dict = mapper.dictionary().read();
        statements
            .iter()
            .map(|st| {
                (
                    dict.decode(st.subject).cloned().unwrap(),
                    dict.decode(st.predicate).cloned().unwrap(),
                    dict.decode(st.object).cloned().unwrap(),
                )
            })
            .collect()
    }

    fn objects_of(
        triples: &[(TermValue, TermValue, TermValue)],
        subject: &str,
        predicate: &str,
    ) -> Vec<TermValue> {
        triples
            .iter()
            .filter(|(s, p, _)| s.lexical == subject && p.lexical == predicate)
            .map(|(_, _, o)| o.clone())
            .collect()
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let mapper = mapper();
        let rec = record("PAT_1", "ACC_1", "20240101", "CT").with("Manufacturer", "SIEMENS");
        let first: BTreeSet<Statement> = mapper.map(&rec).unwrap().into_iter().collect();
        let second: BTreeSet<Statement> = mapper.map(&rec).unwrap().into_iter().collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_record_shape() {
        let mapper = mapper();
        let statements = mapper.map(&record("PAT_1", "ACC_1", "20240101", "CT")).unwrap();
        let triples = decoded(&mapper, &statements);

        let dataset = "http://local.dev/dicom-demo/dataset/ACC_1";
        let patient = "https://w3id.org/purl/pid/patient/PAT_1";

        assert_eq!(objects_of(&triples, dataset, RDF_TYPE), vec![TermValue::uri(HDCAT_DATASET)]);
        assert_eq!(objects_of(&triples, dataset, DCTERMS_SUBJECT), vec![TermValue::uri(patient)]);
        assert_eq!(objects_of(&triples, patient, RDF_TYPE), vec![TermValue::uri(FOAF_PERSON)]);
        assert_eq!(
            objects_of(&triples, dataset, DCAT_THEME),
            vec![TermValue::uri("http://snomed.info/sct/7771000")]
        );
        assert_eq!(
            objects_of(&triples, dataset, DCTERMS_ISSUED),
            vec![TermValue::typed("2024-01-01", Datatype::Date)]
        );
        assert_eq!(
            objects_of(&triples, dataset, SCHEMA_ACCESSION_NUMBER),
            vec![TermValue::literal("ACC_1")]
        );
        assert_eq!(
            objects_of(&triples, dataset, DCTERMS_TITLE),
            vec![TermValue::literal("DICOM data for PAT_1 on 2024-01-01")]
        );
        assert_eq!(
            objects_of(&triples, "http://local.dev/dicom-demo/catalog", DCAT_DATASET),
            vec![TermValue::uri(dataset)]
        );
    }

    #[test]
    fn test_missing_accession_number_is_rejected() {
        let mapper = mapper();
        let rec = MetadataRecord::new()
            .with("Patient ID", "PAT_1")
            .with("Study Date", "20240101")
            .with("Modality", "CT");
        assert_eq!(
            mapper.map(&rec),
            Err(GraphError::MissingRequiredField("accession number".to_string()))
        );
    }

    #[test]
    fn test_each_required_field_is_named() {
        let mapper = mapper();
        let full = record("PAT_1", "ACC_1", "20240101", "CT");
        let cases = [
            ("Patient ID", "patient identifier"),
            ("Study Date", "study date"),
            ("Modality", "modality"),
            ("Accession Number", "accession number"),
        ];
        for (field, label) in cases {
            let mut rec = full.clone();
            rec.remove(field);
            assert_eq!(mapper.map(&rec), Err(GraphError::missing(label)), "without {}", field);
        }
    }

    #[test]
    fn test_blank_required_field_counts_as_missing() {
        let mapper = mapper();
        let rec = record("  ", "ACC_1", "20240101", "CT");
        assert_eq!(mapper.map(&rec), Err(GraphError::missing("patient identifier")));
    }

    #[test]
    fn test_series_date_fallback() {
        let mapper = mapper();
        let rec = MetadataRecord::new()
            .with("PatientID", "PAT_2")
            .with("SeriesDate", "2023-05-06")
            .with("Modality", "MR")
            .with("AccessionNumber", "ACC_2");
        let statements = mapper.map(&rec).unwrap();
        let triples = decoded(&mapper, &statements);
        assert_eq!(
            objects_of(&triples, "http://local.dev/dicom-demo/dataset/ACC_2", DCTERMS_ISSUED),
            vec![TermValue::typed("2023-05-06", Datatype::Date)]
        );
    }

    #[test]
    fn test_unknown_modality_maps_to_unclassified() {
        let mapper = mapper();
        let statements = mapper.map(&record("PAT_1", "ACC_9", "20240101", "XA")).unwrap();
        let triples = decoded(&mapper, &statements);
        let dataset = "http://local.dev/dicom-demo/dataset/ACC_9";
        assert_eq!(
            objects_of(&triples, dataset, DCAT_THEME),
            vec![TermValue::uri(ROO_UNCLASSIFIED_MODALITY)]
        );
        assert_eq!(objects_of(&triples, dataset, DICOM_MODALITY), vec![TermValue::literal("XA")]);
        assert_eq!(
            objects_of(&triples, ROO_UNCLASSIFIED_MODALITY, RDFS_LABEL),
            vec![TermValue::literal("Unclassified")]
        );
    }

    #[test]
    fn test_optional_fields() {
        let mapper = mapper();
        let rec = record("PAT_1", "ACC_1", "20240101", "CT")
            .with("Patient's Name", "Anonymized^PAT_1")
            .with("Body Part Examined", "THYROID")
            .with("Rows", 512i64)
            .with("Slice Thickness", "2.5")
            .with("Study Time", "083000");
        let statements = mapper.map(&rec).unwrap();
        let triples = decoded(&mapper, &statements);
        let dataset = "http://local.dev/dicom-demo/dataset/ACC_1";
        let patient = "https://w3id.org/purl/pid/patient/PAT_1";

        assert_eq!(objects_of(&triples, patient, FOAF_NAME), vec![TermValue::literal("Anonymized^PAT_1")]);
        assert_eq!(
            objects_of(&triples, dataset, ROO_HAS_ANATOMIC_SITE),
            vec![TermValue::uri("http://snomed.info/sct/111160001")]
        );
        assert_eq!(
            objects_of(&triples, dataset, DICOM_BODY_PART_EXAMINED),
            vec![TermValue::literal("THYROID")]
        );
        assert_eq!(objects_of(&triples, dataset, DICOM_ROWS), vec![TermValue::typed("512", Datatype::Integer)]);
        assert_eq!(
            objects_of(&triples, dataset, DICOM_SLICE_THICKNESS),
            vec![TermValue::typed("2.5", Datatype::Decimal)]
        );
        assert_eq!(
            objects_of(&triples, dataset, DICOM_STUDY_TIME),
            vec![TermValue::typed("08:30:00", Datatype::Time)]
        );
        // Absent optional fields leave no trace
        assert!(objects_of(&triples, dataset, DICOM_MANUFACTURER).is_empty());
    }

    #[test]
    fn test_unparseable_date_is_kept_as_plain_literal() {
        let mapper = mapper();
        let statements = mapper.map(&record("PAT_1", "ACC_1", "sometime", "CT")).unwrap();
        let triples = decoded(&mapper, &statements);
        assert_eq!(
            objects_of(&triples, "http://local.dev/dicom-demo/dataset/ACC_1", DCTERMS_ISSUED),
            vec![TermValue::literal("sometime")]
        );
    }

    #[test]
    fn test_custom_base_uris() {
        let config = MappingConfig {
            base_uri: "http://example.org/".to_string(),
            pid_prefix: "http://example.org/pid/".to_string(),
            catalog_uri: "http://example.org/catalog".to_string(),
        };
        let mapper = OntologyMapper::new(SharedDictionary::new(), config);
        mapper.map(&record("PAT 7", "ACC/7", "20240101", "CT")).unwrap();
        let dict = mapper.dictionary();
        assert!(dict.lookup("http://example.org/dataset/ACC_7", TermKind::Uri).is_some());
        assert!(dict.lookup("http://example.org/pid/patient/PAT_7", TermKind::Uri).is_some());
    }
}
