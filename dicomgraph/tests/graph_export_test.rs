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
use dicomgraph::engine::DicomGraph;
use dicomgraph::graph_export::{export, NodeType, ToDot};
use dicomgraph::record::MetadataRecord;
use std::collections::HashSet;

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

    fn setup() -> DicomGraph {
        let graph = DicomGraph::default();
        let records = [
            record("PAT_1", "ACC_1", "20240101", "CT").with("Body Part Examined", "THYROID"),
            record("PAT_1", "ACC_2", "20240102", "MR"),
            record("PAT_2", "ACC_3", "20240103", "CT"),
        ];
        for rec in &records {
            graph.ingest(rec).unwrap();
        }
        graph
    }

    #[test]
    fn test_node_counts_by_type() {
        let graph = setup();
        let snapshot = export(graph.store(), false);

        assert_eq!(snapshot.nodes_of_type(NodeType::Dataset).count(), 3);
        assert_eq!(snapshot.nodes_of_type(NodeType::Patient).count(), 2);
        assert_eq!(snapshot.nodes_of_type(NodeType::Modality).count(), 2);
        assert_eq!(snapshot.nodes_of_type(NodeType::AnatomicSite).count(), 1);
        assert_eq!(snapshot.nodes_of_type(NodeType::Catalog).count(), 1);
        assert_eq!(snapshot.nodes_of_type(NodeType::Literal).count(), 0);

        let ids: HashSet<&str> = snapshot.nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids.len(), snapshot.nodes.len());
    }

    #[test]
    fn test_every_link_is_a_stored_statement() {
        let graph = setup();
        let snapshot = export(graph.store(), true);
        let store = graph.store();

        let mut seen = HashSet::new();
        for link in &snapshot.links {
            assert!(store.contains(&link.statement));
            assert!(seen.insert(link.statement));
        }
        // With literals included the export covers the whole graph
        assert_eq!(snapshot.links.len(), store.size());

        let node_ids: HashSet<&str> = snapshot.nodes.iter().map(|node| node.id.as_str()).collect();
        for link in &snapshot.links {
            assert!(node_ids.contains(link.source.as_str()));
            assert!(node_ids.contains(link.target.as_str()));
        }
    }

    #[test]
    fn test_literals_only_on_request() {
        let graph = setup();
        let without = export(graph.store(), false);
        let with = export(graph.store(), true);
        assert!(with.links.len() > without.links.len());
        assert!(with.nodes_of_type(NodeType::Literal).count() > 0);
        assert!(without.links.iter().all(|link| !link.target.starts_with('"')));
    }

    #[test]
    fn test_labels_and_groups() {
        let graph = setup();
        let snapshot = export(graph.store(), false);

        let dataset = snapshot
            .nodes
            .iter()
            .find(|node| node.id == "http://local.dev/dicom-demo/dataset/ACC_1")
            .unwrap();
        assert_eq!(dataset.label, "ACC 1");
        assert_eq!(dataset.node_type, NodeType::Dataset);
        assert_eq!(dataset.group, 4);

        let patient = snapshot
            .nodes
            .iter()
            .find(|node| node.id == "https://w3id.org/purl/pid/patient/PAT_2")
            .unwrap();
        assert_eq!(patient.group, 2);

        let theme = snapshot.links.iter().find(|link| link.label == "theme").unwrap();
        assert_eq!(theme.predicate, "http://www.w3.org/ns/dcat#theme");
    }

    #[test]
    fn test_d3_json_shape() {
        let graph = setup();
        let json = serde_json::to_value(graph.export()).unwrap();
        let nodes = json["nodes"].as_array().unwrap();
        let links = json["links"].as_array().unwrap();
        assert!(!nodes.is_empty());
        assert!(!links.is_empty());
        assert!(nodes[0].get("id").is_some());
        assert!(nodes[0].get("group").is_some());
        assert!(nodes[0].get("type").is_some());
        assert!(links[0].get("source").is_some());
        assert!(links[0].get("target").is_some());
        assert!(graph.export().to_dot().contains("->"));
    }
}
