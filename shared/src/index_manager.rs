/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rustc_hash::FxHashMap;
use crate::terms::Term;
use crate::triple::{Position, Statement};

/// Which access path answers a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// Fully bound: direct membership test on the primary set.
    Exact,
    Subject,
    Object,
    Predicate,
    FullScan,
}

impl IndexType {
    /// Subject index first, then object, then predicate, then a full scan.
    pub fn choose(s: Option<Term>, p: Option<Term>, o: Option<Term>) -> Self {
        match (s, p, o) {
            (Some(_), Some(_), Some(_)) => IndexType::Exact,
            (Some(_), _, _) => IndexType::Subject,
            (None, _, Some(_)) => IndexType::Object,
            (None, Some(_), None) => IndexType::Predicate,
            (None, None, None) => IndexType::FullScan,
        }
    }
}

/// Primary statement set plus one index per position. Buckets hold offsets
/// into `statements`, so every bucket iterates in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StatementIndex {
    statements: Vec<Statement>,
    positions: FxHashMap<Statement, usize>,
    by_subject: FxHashMap<Term, Vec<usize>>,
    by_predicate: FxHashMap<Term, Vec<usize>>,
    by_object: FxHashMap<Term, Vec<usize>>,
}

impl StatementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single statement into the primary set and all three indexes.
    /// Returns false when it was already stored.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if self.positions.contains_key(&statement) {
            return false;
        }
        let offset = self.statements.len();
        self.statements.push(statement);
        self.positions.insert(statement, offset);
        self.by_subject.entry(statement.subject).or_default().push(offset);
        self.by_predicate.entry(statement.predicate).or_default().push(offset);
        self.by_object.entry(statement.object).or_default().push(offset);
        true
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.positions.contains_key(statement)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Query the index
    pub fn query(&self, s: Option<Term>, p: Option<Term>, o: Option<Term>) -> Vec<Statement> {
        if let (Some(ss), Some(pp), Some(oo)) = (s, p, o) {
            let candidate = Statement::new(ss, pp, oo);
            return if self.contains(&candidate) { vec![candidate] } else { Vec::new() };
        }

        let bucket = match IndexType::choose(s, p, o) {
            IndexType::Exact => None,
            IndexType::Subject => s.and_then(|term| self.by_subject.get(&term)),
            IndexType::Object => o.and_then(|term| self.by_object.get(&term)),
            IndexType::Predicate => p.and_then(|term| self.by_predicate.get(&term)),
            IndexType::FullScan => return self.statements.clone(),
        };

        bucket
            .map(|offsets| {
                offsets
                    .iter()
                    .map(|&offset| self.statements[offset])
                    .filter(|statement| statement.matches(s, p, o))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Contents of one index bucket, in insertion order.
    pub fn bucket(&self, position: Position, term: Term) -> Vec<Statement> {
        let index = match position {
            Position::Subject => &self.by_subject,
            Position::Predicate => &self.by_predicate,
            Position::Object => &self.by_object,
        };
        index
            .get(&term)
            .map(|offsets| offsets.iter().map(|&offset| self.statements[offset]).collect())
            .unwrap_or_default()
    }

    /// Verifies that every stored statement sits in exactly its three buckets
    /// and that every bucket entry points back at a stored statement.
    pub fn is_consistent(&self) -> bool {
        if self.positions.len() != self.statements.len() {
            return false;
        }
        let indexes = [
            (Position::Subject, &self.by_subject),
            (Position::Predicate, &self.by_predicate),
            (Position::Object, &self.by_object),
        ];
        for (position, index) in indexes {
            let mut seen = 0;
            for (term, offsets) in index {
                for &offset in offsets {
                    match self.statements.get(offset) {
                        Some(statement) if statement.get(position) == *term => seen += 1,
                        _ => return false,
                    }
                }
            }
            if seen != self.statements.len() {
                return false;
            }
        }
        self.statements
            .iter()
            .enumerate()
            .all(|(offset, statement)| self.positions.get(statement) == Some(&offset))
    }
}
