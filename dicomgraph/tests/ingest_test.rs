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
use dicomgraph::catalog::CatalogQuery;
use dicomgraph::config::Config;
use dicomgraph::custom_error::GraphError;
use dicomgraph::engine::DicomGraph;
use dicomgraph::loader::load_records;
use dicomgraph::record::MetadataRecord;
use dicomgraph::synthetic;
use std::io::Write;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(patient: &str, accession: &str, date: &str, modality: &str) -> MetadataRecord {
        MetadataRecord::new()
            .with("Patient ID", patient)
            .with("Study Date", date)
            .with("Modality", modality)
            .with("Accession Number", accession)
    }

    fn sequential() -> DicomGraph {
        let mut config = Config::default();
        config.ingest.parallel = false;
        DicomGraph::new(config)
    }

    #[test]
    fn test_batch_report_counts_rejections() {
        let graph = DicomGraph::default();
        let mut no_accession = record("PAT_2", "ACC_2", "20240101", "CT");
        no_accession.remove("Accession Number");
        let records = vec![
            record("PAT_1", "ACC_1", "20240101", "CT"),
            no_accession,
            record("PAT_3", "ACC_3", "20240101", "MR"),
        ];

        let report = graph.ingest_batch(&records);
        assert_eq!(report.records_seen, 3);
        assert_eq!(report.records_ingested, 2);
        assert_eq!(report.statements_added, graph.store().size());
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[0].reason, "missing required field: accession number");
        assert_eq!(graph.store().dataset_count(), 2);
    }

    #[test]
    fn test_parallel_and_sequential_batches_agree() {
        let records = synthetic::generate(60, 11);
        let parallel = DicomGraph::default();
        let serial = sequential();

        let a = parallel.ingest_batch(&records);
        let b = serial.ingest_batch(&records);
        assert_eq!(a, b);
        assert_eq!(parallel.store().size(), serial.store().size());
        assert_eq!(
            parallel.catalog(&CatalogQuery::new()).unwrap(),
            serial.catalog(&CatalogQuery::new()).unwrap()
        );
    }

    #[test]
    fn test_second_batch_of_same_records_adds_nothing() {
        let graph = DicomGraph::default();
        let records = synthetic::generate(10, 5);
        graph.ingest_batch(&records);
        let size = graph.store().size();

        let again = graph.ingest_batch(&records);
        assert_eq!(again.records_ingested, 10);
        assert_eq!(again.statements_added, 0);
        assert_eq!(graph.store().size(), size);
    }

    #[test]
    fn test_upload_queue() {
        let graph = DicomGraph::default();
        let queue = graph.upload_queue();

        let accepted = queue.submit(record("PAT_1", "ACC_1", "20240101", "CT"));
        let mut broken = record("PAT_2", "ACC_2", "20240101", "CT");
        broken.remove("Modality");
        let rejected = queue.submit(broken);

        assert!(accepted.recv().unwrap().unwrap() > 0);
        assert_eq!(rejected.recv().unwrap(), Err(GraphError::missing("modality")));

        let report = queue.shutdown();
        assert_eq!(report.records_seen, 2);
        assert_eq!(report.records_ingested, 1);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(graph.store().dataset_count(), 1);
    }

    #[test]
    fn test_load_and_ingest_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"Patient ID": "PAT_1", "Study Date": "20230101", "Modality": "CT", "Accession Number": "ACC_1"}},
                {{"FilePath": "file_1.dcm", "Dataset": [
                    {{"Tag": "(0010,0020)", "VR": "LO", "Name": "Patient ID", "Value": "PAT_2"}},
                    {{"Tag": "(0008,0020)", "VR": "DA", "Name": "Study Date", "Value": "20230202"}},
                    {{"Tag": "(0008,0060)", "VR": "CS", "Name": "Modality", "Value": "RTDOSE"}},
                    {{"Tag": "(0008,0050)", "VR": "SH", "Name": "Accession Number", "Value": "ACC_2"}}
                ]}}
            ]"#
        )
        .unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);

        let graph = DicomGraph::default();
        let report = graph.ingest_batch(&records);
        assert_eq!(report.records_ingested, 2);
        let entries = graph.catalog(&CatalogQuery::new().modality("rtdose")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].study_date.as_deref(), Some("2023-02-02"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_records("/nonexistent/records.json").unwrap_err();
        assert!(err.to_string().starts_with("cannot read /nonexistent/records.json"));
    }
}
