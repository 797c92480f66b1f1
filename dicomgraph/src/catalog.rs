/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Denormalised dataset view used by catalog search. Updated under the
//! store's write lock together with the statement index.

use crate::custom_error::GraphError;
use crate::ontology::searchable_predicates;
use crate::query_builder::{uri, var, QueryBuilder};
use crate::query_engine::Binding;
use crate::triple_store::TripleStore;
use crate::vocabulary::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use shared::dictionary::{Dictionary, SharedDictionary};
use shared::terms::{Term, TermKind};
use shared::triple::Statement;

/// Catalog filters. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub free_text: Option<String>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modality(mut self, modality: &str) -> Self {
        self.modality = Some(modality.to_string());
        self
    }

    pub fn accession(mut self, accession: &str) -> Self {
        self.accession = Some(accession.to_string());
        self
    }

    pub fn free_text(mut self, text: &str) -> Self {
        self.free_text = Some(text.to_string());
        self
    }

    fn filter(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Predicate terms the catalog reacts to, interned once per store.
#[derive(Debug, Clone)]
struct CatalogTerms {
    rdf_type: Term,
    dataset_class: Term,
    modality: Term,
    accession: Term,
    searchable: FxHashSet<Term>,
}

impl CatalogTerms {
    fn new(dictionary: &SharedDictionary) -> Self {
        let uri = |iri: &str| dictionary.intern(iri, TermKind::Uri);
        CatalogTerms {
            rdf_type: uri(RDF_TYPE),
            dataset_class: uri(HDCAT_DATASET),
            modality: uri(DICOM_MODALITY),
            accession: uri(SCHEMA_ACCESSION_NUMBER),
            searchable: searchable_predicates().map(uri).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogIndex {
    terms: CatalogTerms,
    datasets: Vec<Term>,
    known: FxHashSet<Term>,
    /// Upper-cased raw modality code -> datasets
    by_modality: FxHashMap<String, FxHashSet<Term>>,
    by_accession: FxHashMap<String, FxHashSet<Term>>,
    /// Lower-cased searchable literals per dataset
    text: FxHashMap<Term, Vec<String>>,
}

impl CatalogIndex {
    pub fn new(dictionary: &SharedDictionary) -> Self {
        CatalogIndex {
            terms: CatalogTerms::new(dictionary),
            datasets: Vec::new(),
            known: FxHashSet::default(),
            by_modality: FxHashMap::default(),
            by_accession: FxHashMap::default(),
            text: FxHashMap::default(),
        }
    }

    /// Called once for every statement newly added to the store.
    pub fn observe(&mut self, statement: &Statement, dictionary: &Dictionary) {
        let terms = &self.terms;
        if statement.predicate == terms.rdf_type {
            if statement.object == terms.dataset_class && self.known.insert(statement.subject) {
                self.datasets.push(statement.subject);
            }
            return;
        }

        let literal = match dictionary.decode(statement.object) {
            Some(value) if !value.is_uri() => value.lexical.trim(),
            _ => return,
        };
        if statement.predicate == terms.modality {
            self.by_modality
                .entry(literal.to_uppercase())
                .or_default()
                .insert(statement.subject);
        }
        if statement.predicate == terms.accession {
            self.by_accession
                .entry(literal.to_string())
                .or_default()
                .insert(statement.subject);
        }
        if terms.searchable.contains(&statement.predicate) {
            self.text
                .entry(statement.subject)
                .or_default()
                .push(literal.to_lowercase());
        }
    }

    /// Datasets in insertion order.
    pub fn datasets(&self) -> &[Term] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Intersects every supplied filter. Results keep insertion order.
    pub fn search(&self, query: &CatalogQuery) -> Vec<Term> {
        let modality = CatalogQuery::filter(&query.modality).map(str::to_uppercase);
        let accession = CatalogQuery::filter(&query.accession);
        let needle = CatalogQuery::filter(&query.free_text).map(str::to_lowercase);

        let modality_bucket = match modality {
            Some(code) => match self.by_modality.get(&code) {
                Some(bucket) => Some(bucket),
                None => return Vec::new(),
            },
            None => None,
        };
        let accession_bucket = match accession {
            Some(accession) => match self.by_accession.get(accession) {
                Some(bucket) => Some(bucket),
                None => return Vec::new(),
            },
            None => None,
        };

        self.datasets
            .iter()
            .copied()
            .filter(|dataset| modality_bucket.map_or(true, |bucket| bucket.contains(dataset)))
            .filter(|dataset| accession_bucket.map_or(true, |bucket| bucket.contains(dataset)))
            .filter(|dataset| match &needle {
                Some(needle) => self
                    .text
                    .get(dataset)
                    .map_or(false, |texts| texts.iter().any(|text| text.contains(needle.as_str()))),
                None => true,
            })
            .collect()
    }
}

/// One catalog row, resolved for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: Option<String>,
    pub patient_id: Option<String>,
    pub study_date: Option<String>,
    pub modality: Option<String>,
    pub accession_number: Option<String>,
}

/// Resolves dataset terms into catalog rows ordered by study date.
pub fn describe(store: &TripleStore, datasets: &[Term]) -> Result<Vec<CatalogEntry>, GraphError> {
    let wanted: FxHashSet<Term> = datasets.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let query = QueryBuilder::new(store.dictionary())
        .pattern(var("dataset"), uri(RDF_TYPE), uri(HDCAT_DATASET))
        .optional(var("dataset"), uri(DCTERMS_TITLE), var("title"))
        .optional(var("dataset"), uri(DCTERMS_ISSUED), var("date"))
        .optional(var("dataset"), uri(DICOM_MODALITY), var("modality"))
        .optional(var("dataset"), uri(SCHEMA_ACCESSION_NUMBER), var("accession"))
        .pattern(var("dataset"), uri(DCTERMS_SUBJECT), var("patient"))
        .optional(var("patient"), uri(SCHEMA_IDENTIFIER), var("patient_id"))
        .order_by("date")
        .build()?;

    let bindings = store.evaluate(&query)?;
    let dictionary = store.dictionary().read();
    let text = |binding: &Binding, name: &str| {
        binding
            .get(name)
            .and_then(|term| dictionary.decode(term))
            .map(|value| value.lexical.clone())
    };

    let mut seen = FxHashSet::default();
    let mut entries = Vec::with_capacity(wanted.len());
    for binding in &bindings {
        let Some(dataset) = binding.get("dataset") else { continue };
        if !wanted.contains(&dataset) || !seen.insert(dataset) {
            continue;
        }
        entries.push(CatalogEntry {
            id: text(binding, "dataset").unwrap_or_default(),
            title: text(binding, "title"),
            patient_id: text(binding, "patient_id"),
            study_date: text(binding, "date"),
            modality: text(binding, "modality"),
            accession_number: text(binding, "accession"),
        });
    }
    Ok(entries)
}
