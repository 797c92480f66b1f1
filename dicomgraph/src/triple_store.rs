/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::catalog::{CatalogIndex, CatalogQuery};
use crate::custom_error::GraphError;
use crate::query_engine::{self, Binding, Query};
use log::debug;
use parking_lot::{RwLock, RwLockReadGuard};
use shared::dictionary::SharedDictionary;
use shared::index_manager::StatementIndex;
use shared::terms::Term;
use shared::triple::Statement;

/// Everything readers must see change together.
#[derive(Debug, Clone)]
pub struct GraphState {
    index: StatementIndex,
    catalog: CatalogIndex,
}

impl GraphState {
    pub fn index(&self) -> &StatementIndex {
        &self.index
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn match_pattern(&self, s: Option<Term>, p: Option<Term>, o: Option<Term>) -> Vec<Statement> {
        self.index.query(s, p, o)
    }
}

/// The process-wide graph. Share it behind an `Arc`; all methods take `&self`.
///
/// Lock order is graph state first, interner second. Nothing that holds the
/// interner lock ever waits for the graph lock.
#[derive(Debug)]
pub struct TripleStore {
    dictionary: SharedDictionary,
    state: RwLock<GraphState>,
}

impl TripleStore {
    pub fn new(dictionary: SharedDictionary) -> Self {
        let catalog = CatalogIndex::new(&dictionary);
        TripleStore {
            dictionary,
            state: RwLock::new(GraphState { index: StatementIndex::new(), catalog }),
        }
    }

    pub fn dictionary(&self) -> &SharedDictionary {
        &self.dictionary
    }

    /// Adds every statement not already present. The whole batch becomes
    /// visible at once. Returns how many statements were new.
    pub fn insert(&self, statements: &[Statement]) -> usize {
        let mut state = self.state.write();
        let dictionary = self.dictionary.read();
        let GraphState { index, catalog } = &mut *state;

        let mut added = 0;
        for statement in statements {
            if index.insert(*statement) {
                catalog.observe(statement, &dictionary);
                added += 1;
            }
        }
        debug!("Inserted {} of {} statements, store size {}", added, statements.len(), index.len());
        added
    }

    /// All statements consistent with the bound slots.
    pub fn match_pattern(&self, s: Option<Term>, p: Option<Term>, o: Option<Term>) -> Vec<Statement> {
        self.state.read().match_pattern(s, p, o)
    }

    /// Number of distinct statements.
    pub fn size(&self) -> usize {
        self.state.read().index.len()
    }

    pub fn dataset_count(&self) -> usize {
        self.state.read().catalog.len()
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.state.read().index.contains(statement)
    }

    /// Shared view of the graph, held until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, GraphState> {
        self.state.read()
    }

    /// Copy of every statement in insertion order.
    pub fn statements(&self) -> Vec<Statement> {
        self.state.read().index.iter().copied().collect()
    }

    pub fn evaluate(&self, query: &Query) -> Result<Vec<Binding>, GraphError> {
        let state = self.state.read();
        let dictionary = self.dictionary.read();
        query_engine::evaluate(&state, &dictionary, query)
    }

    pub fn catalog_search(&self, query: &CatalogQuery) -> Vec<Term> {
        self.state.read().catalog.search(query)
    }

    pub fn is_consistent(&self) -> bool {
        self.state.read().index.is_consistent()
    }
}

impl Default for TripleStore {
    fn default() -> Self {
        Self::new(SharedDictionary::new())
    }
}
