/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::GraphError;
use crate::triple_store::GraphState;
use log::debug;
use serde::{Deserialize, Serialize};
use shared::dictionary::Dictionary;
use shared::index_manager::IndexType;
use shared::terms::{PatternTerm, Term};
use shared::triple::Statement;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sort direction for ordered results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
    /// Failing to match keeps the incoming binding instead of dropping it
    pub optional: bool,
}

impl QueryPattern {
    pub fn new(subject: PatternTerm, predicate: PatternTerm, object: PatternTerm) -> Self {
        QueryPattern { subject, predicate, object, optional: false }
    }

    pub fn optional(subject: PatternTerm, predicate: PatternTerm, object: PatternTerm) -> Self {
        QueryPattern { subject, predicate, object, optional: true }
    }

    fn slots(&self) -> [&PatternTerm; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.slots().into_iter().filter_map(PatternTerm::variable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub variable: String,
    pub direction: SortDirection,
}

/// An ordered list of triple patterns with optional ordering and paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub patterns: Vec<QueryPattern>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects patterns without any constant or variable, empty variable
    /// names, and ordering on a variable no pattern mentions.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (position, pattern) in self.patterns.iter().enumerate() {
            let anchored = pattern
                .slots()
                .iter()
                .any(|slot| !matches!(slot, PatternTerm::Wildcard));
            if !anchored {
                return Err(GraphError::InvalidQueryPattern(format!(
                    "pattern {} has no bound term and no variable",
                    position
                )));
            }
            if pattern.variables().any(|name| name.trim().is_empty()) {
                return Err(GraphError::InvalidQueryPattern(format!(
                    "pattern {} uses an empty variable name",
                    position
                )));
            }
        }
        if let Some(order) = &self.order_by {
            let mentioned = self
                .patterns
                .iter()
                .any(|pattern| pattern.variables().any(|name| name == order.variable));
            if !mentioned {
                return Err(GraphError::InvalidQueryPattern(format!(
                    "ordering variable ?{} does not appear in any pattern",
                    order.variable
                )));
            }
        }
        Ok(())
    }
}

/// Variable name -> term, produced by evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: BTreeMap<String, Term>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<Term> {
        self.values.get(variable).copied()
    }

    pub fn is_bound(&self, variable: &str) -> bool {
        self.values.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Term)> {
        self.values.iter().map(|(name, term)| (name.as_str(), *term))
    }

    /// Term behind a slot under this binding: the constant, the bound value
    /// of the variable, or `None` when the slot is still free.
    fn substitute(&self, slot: &PatternTerm) -> Option<Term> {
        match slot {
            PatternTerm::Constant(term) => Some(*term),
            PatternTerm::Variable(name) => self.get(name),
            PatternTerm::Wildcard | PatternTerm::Unknown => None,
        }
    }

    /// Binds the pattern's variables to the statement's terms. `None` when a
    /// variable would have to take two different values.
    fn extend(&self, pattern: &QueryPattern, statement: &Statement) -> Option<Binding> {
        let mut extended = self.clone();
        let pairs = [
            (&pattern.subject, statement.subject),
            (&pattern.predicate, statement.predicate),
            (&pattern.object, statement.object),
        ];
        for (slot, term) in pairs {
            if let PatternTerm::Variable(name) = slot {
                match extended.values.get(name) {
                    Some(existing) if *existing != term => return None,
                    Some(_) => {}
                    None => {
                        extended.values.insert(name.clone(), term);
                    }
                }
            }
        }
        Some(extended)
    }

    /// Lexical values of every bound variable.
    pub fn resolve(&self, dictionary: &Dictionary) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter_map(|(name, term)| {
                dictionary
                    .decode(*term)
                    .map(|value| (name.clone(), value.lexical.clone()))
            })
            .collect()
    }
}

/// Left-to-right nested-loop join over the statement index.
pub fn evaluate(state: &GraphState, dictionary: &Dictionary, query: &Query) -> Result<Vec<Binding>, GraphError> {
    query.validate()?;

    let mut solutions = vec![Binding::new()];
    for pattern in &query.patterns {
        let satisfiable = !pattern.slots().iter().any(|slot| slot.is_unknown());
        let mut next = Vec::new();
        for binding in &solutions {
            let before = next.len();
            if satisfiable {
                let s = binding.substitute(&pattern.subject);
                let p = binding.substitute(&pattern.predicate);
                let o = binding.substitute(&pattern.object);
                for statement in state.match_pattern(s, p, o) {
                    if let Some(extended) = binding.extend(pattern, &statement) {
                        next.push(extended);
                    }
                }
            }
            if pattern.optional && next.len() == before {
                next.push(binding.clone());
            }
        }
        debug!(
            "Pattern {:?} via {:?}: {} -> {} bindings",
            pattern.slots(),
            solutions.first().map(|b| IndexType::choose(
                b.substitute(&pattern.subject),
                b.substitute(&pattern.predicate),
                b.substitute(&pattern.object)
            )),
            solutions.len(),
            next.len()
        );
        solutions = next;
        if solutions.is_empty() {
            break;
        }
    }

    if let Some(order) = &query.order_by {
        sort_bindings(&mut solutions, order, dictionary);
    }

    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(solutions.into_iter().skip(query.offset).take(limit).collect())
}

/// Stable sort; unbound values come first in ascending order.
fn sort_bindings(bindings: &mut [Binding], order: &OrderBy, dictionary: &Dictionary) {
    let key = |binding: &Binding| {
        binding
            .get(&order.variable)
            .and_then(|term| dictionary.decode(term))
    };
    bindings.sort_by(|a, b| {
        let ordering = match (key(a), key(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.order_cmp(y),
        };
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
