/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Node/edge snapshots of the graph for visualisation.

use crate::triple_store::TripleStore;
use crate::vocabulary::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use shared::dictionary::Dictionary;
use shared::terms::{Term, TermKind, TermValue};
use shared::triple::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeType {
    Dataset,
    Patient,
    Modality,
    AnatomicSite,
    Catalog,
    Class,
    Resource,
    Literal,
}

impl NodeType {
    /// Colour group: 1 default, 2 patient, 3 ontology concept, 4 dataset, 5 literal.
    pub fn group(self) -> u8 {
        match self {
            NodeType::Patient => 2,
            NodeType::Modality | NodeType::AnatomicSite | NodeType::Class => 3,
            NodeType::Dataset => 4,
            NodeType::Literal => 5,
            NodeType::Catalog | NodeType::Resource => 1,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            NodeType::Dataset => "#1f77b4",
            NodeType::Patient => "#ff7f0e",
            NodeType::Modality => "#2ca02c",
            NodeType::AnatomicSite => "#17becf",
            NodeType::Catalog => "#9467bd",
            NodeType::Class => "#8c564b",
            NodeType::Resource => "#7f7f7f",
            NodeType::Literal => "#bcbd22",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    #[serde(skip)]
    pub term: Term,
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub group: u8,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    #[serde(skip)]
    pub statement: Statement,
    pub source: String,
    pub target: String,
    pub predicate: String,
    pub label: String,
}

/// D3 force-graph shape: `{ "nodes": [...], "links": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphSnapshot {
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |node| node.node_type == node_type)
    }
}

/// Contains a method to convert a snapshot into the DOT language
pub trait ToDot {
    fn to_dot(&self) -> String;
}

impl ToDot for GraphSnapshot {
    fn to_dot(&self) -> String {
        let escape = |text: &str| text.replace('\\', "\\\\").replace('"', "\\\"");
        let mut out = String::from("digraph {\n");
        for node in &self.nodes {
            out.push_str(&format!(
                "\"{}\" [label=\"{}\", style=filled, fillcolor=\"{}\"]\n",
                escape(&node.id),
                escape(&node.label),
                node.color
            ));
        }
        out.push('\n');
        for link in &self.links {
            out.push_str(&format!(
                "\"{}\" -> \"{}\" [label=\"{}\"]\n",
                escape(&link.source),
                escape(&link.target),
                escape(&link.label)
            ));
        }
        out.push('}');
        out
    }
}

/// Node label: last IRI segment with underscores as spaces, or the literal value.
pub fn node_label(value: &TermValue) -> String {
    match value.kind {
        TermKind::Uri => local_name(&value.lexical).replace('_', " "),
        TermKind::Literal(_) => value.lexical.clone(),
    }
}

fn node_id(value: &TermValue) -> String {
    match value.kind {
        TermKind::Uri => value.lexical.clone(),
        TermKind::Literal(_) => value.to_string(),
    }
}

/// Role evidence collected from the statements that mention a term.
struct Classifier {
    rdf_type: Option<Term>,
    dataset_class: Option<Term>,
    person_class: Option<Term>,
    catalog_class: Option<Term>,
    dcat_dataset: Option<Term>,
    subject_of: Option<Term>,
    theme: Option<Term>,
    anatomic_site: Option<Term>,
    roles: FxHashMap<Term, FxHashSet<NodeType>>,
}

impl Classifier {
    fn new(dictionary: &Dictionary) -> Self {
        let uri = |iri: &str| dictionary.lookup(iri, TermKind::Uri);
        Classifier {
            rdf_type: uri(RDF_TYPE),
            dataset_class: uri(HDCAT_DATASET),
            person_class: uri(FOAF_PERSON),
            catalog_class: uri(DCAT_CATALOG),
            dcat_dataset: uri(DCAT_DATASET),
            subject_of: uri(DCTERMS_SUBJECT),
            theme: uri(DCAT_THEME),
            anatomic_site: uri(ROO_HAS_ANATOMIC_SITE),
            roles: FxHashMap::default(),
        }
    }

    fn tag(&mut self, term: Term, node_type: NodeType) {
        self.roles.entry(term).or_default().insert(node_type);
    }

    fn observe(&mut self, statement: &Statement) {
        let predicate = Some(statement.predicate);
        if predicate == self.rdf_type {
            let class = Some(statement.object);
            if class == self.dataset_class {
                self.tag(statement.subject, NodeType::Dataset);
            } else if class == self.person_class {
                self.tag(statement.subject, NodeType::Patient);
            } else if class == self.catalog_class {
                self.tag(statement.subject, NodeType::Catalog);
            }
            self.tag(statement.object, NodeType::Class);
        } else if predicate == self.dcat_dataset {
            self.tag(statement.object, NodeType::Dataset);
        } else if predicate == self.subject_of {
            self.tag(statement.object, NodeType::Patient);
        } else if predicate == self.theme {
            self.tag(statement.object, NodeType::Modality);
        } else if predicate == self.anatomic_site {
            self.tag(statement.object, NodeType::AnatomicSite);
        }
    }

    /// Most specific role wins; the enum order is the precedence.
    fn classify(&self, term: Term, value: &TermValue) -> NodeType {
        if !value.is_uri() {
            return NodeType::Literal;
        }
        self.roles
            .get(&term)
            .and_then(|roles| roles.iter().min().copied())
            .unwrap_or(NodeType::Resource)
    }
}

/// Full snapshot of the current graph. Literal objects become nodes only when
/// `include_literals` is set; otherwise their statements are left out.
pub fn export(store: &TripleStore, include_literals: bool) -> GraphSnapshot {
    let state = store.read();
    let dictionary = store.dictionary().read();

    let mut classifier = Classifier::new(&dictionary);
    for statement in state.index().iter() {
        classifier.observe(statement);
    }

    let mut snapshot = GraphSnapshot::default();
    let mut placed: FxHashMap<Term, usize> = FxHashMap::default();
    for statement in state.index().iter() {
        let (Some(subject), Some(predicate), Some(object)) = (
            dictionary.decode(statement.subject),
            dictionary.decode(statement.predicate),
            dictionary.decode(statement.object),
        ) else {
            continue;
        };
        if !object.is_uri() && !include_literals {
            continue;
        }

        for (term, value) in [(statement.subject, subject), (statement.object, object)] {
            placed.entry(term).or_insert_with(|| {
                let node_type = classifier.classify(term, value);
                snapshot.nodes.push(GraphNode {
                    term,
                    id: node_id(value),
                    label: node_label(value),
                    node_type,
                    group: node_type.group(),
                    color: node_type.color(),
                });
                snapshot.nodes.len() - 1
            });
        }

        snapshot.links.push(GraphLink {
            statement: *statement,
            source: node_id(subject),
            target: node_id(object),
            predicate: predicate.lexical.clone(),
            label: local_name(&predicate.lexical).to_string(),
        });
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::terms::Datatype;

    #[test]
    fn test_node_labels() {
        assert_eq!(
            node_label(&TermValue::uri("http://local.dev/dicom-demo/dataset/ACC_5000")),
            "ACC 5000"
        );
        assert_eq!(node_label(&TermValue::typed("2023-01-01", Datatype::Date)), "2023-01-01");
    }

    #[test]
    fn test_groups() {
        assert_eq!(NodeType::Patient.group(), 2);
        assert_eq!(NodeType::Modality.group(), 3);
        assert_eq!(NodeType::Dataset.group(), 4);
        assert_eq!(NodeType::Literal.group(), 5);
        assert_eq!(NodeType::Resource.group(), 1);
    }

    #[test]
    fn test_dot_output() {
        let snapshot = GraphSnapshot {
            nodes: vec![GraphNode {
                term: Term(0),
                id: "http://a/b".to_string(),
                label: "b".to_string(),
                node_type: NodeType::Resource,
                group: 1,
                color: NodeType::Resource.color(),
            }],
            links: Vec::new(),
        };
        let dot = snapshot.to_dot();
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.contains("\"http://a/b\" [label=\"b\""));
        assert!(dot.ends_with('}'));
    }
}
