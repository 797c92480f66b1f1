/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::catalog::{self, CatalogEntry, CatalogQuery};
use crate::config::Config;
use crate::custom_error::GraphError;
use crate::graph_export::{self, GraphSnapshot};
use crate::ingest::{self, IngestReport, UploadQueue};
use crate::mapper::OntologyMapper;
use crate::query_builder::QueryRequest;
use crate::query_engine::Binding;
use crate::record::MetadataRecord;
use crate::triple_store::TripleStore;
use shared::dictionary::SharedDictionary;
use shared::terms::Term;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One graph with its interner, mapper and settings. Created empty; grows
/// through ingestion and never shrinks.
#[derive(Debug, Clone)]
pub struct DicomGraph {
    store: Arc<TripleStore>,
    mapper: OntologyMapper,
    config: Config,
}

impl DicomGraph {
    pub fn new(config: Config) -> Self {
        let dictionary = SharedDictionary::new();
        let store = Arc::new(TripleStore::new(dictionary.clone()));
        let mapper = OntologyMapper::new(dictionary, config.mapping.clone());
        DicomGraph { store, mapper, config }
    }

    pub fn store(&self) -> &Arc<TripleStore> {
        &self.store
    }

    pub fn mapper(&self) -> &OntologyMapper {
        &self.mapper
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ingest(&self, record: &MetadataRecord) -> Result<usize, GraphError> {
        ingest::ingest_record(&self.store, &self.mapper, record)
    }

    pub fn ingest_batch(&self, records: &[MetadataRecord]) -> IngestReport {
        ingest::ingest_batch(&self.store, &self.mapper, records, self.config.ingest.parallel)
    }

    pub fn upload_queue(&self) -> UploadQueue {
        UploadQueue::start(
            Arc::clone(&self.store),
            self.mapper.clone(),
            self.config.ingest.upload_queue_capacity,
        )
    }

    pub fn query(&self, request: &QueryRequest) -> Result<Vec<Binding>, GraphError> {
        let query = request.resolve(self.store.dictionary())?;
        self.store.evaluate(&query)
    }

    /// Query results with every bound variable resolved to its lexical form.
    pub fn query_rows(&self, request: &QueryRequest) -> Result<Vec<BTreeMap<String, String>>, GraphError> {
        let bindings = self.query(request)?;
        let dictionary = self.store.dictionary().read();
        Ok(bindings.iter().map(|binding| binding.resolve(&dictionary)).collect())
    }

    pub fn search(&self, query: &CatalogQuery) -> Vec<Term> {
        self.store.catalog_search(query)
    }

    pub fn catalog(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, GraphError> {
        let datasets = self.search(query);
        catalog::describe(&self.store, &datasets)
    }

    pub fn export(&self) -> GraphSnapshot {
        graph_export::export(&self.store, self.config.export.include_literals)
    }
}

impl Default for DicomGraph {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
