/*
 * Copyright © 2024 ladroid
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::GraphError;
use crate::query_engine::{OrderBy, Query, QueryPattern, SortDirection};
use serde::{Deserialize, Serialize};
use shared::dictionary::SharedDictionary;
use shared::terms::{Datatype, PatternTerm, TermKind};

/// One slot of a query request, before interning.
///
/// JSON forms: `{"uri": "http://..."}`, `{"literal": "CT"}`,
/// `{"literal": {"value": "2024-01-01", "datatype": "xsd:date"}}`,
/// `{"var": "dataset"}` and `"wildcard"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSpec {
    Uri(String),
    Literal(LiteralSpec),
    Var(String),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralSpec {
    Plain(String),
    Typed {
        value: String,
        #[serde(default)]
        datatype: Option<String>,
    },
}

impl TermSpec {
    /// Bound terms are looked up, never interned. A term the store has never
    /// seen becomes `PatternTerm::Unknown`.
    pub fn resolve(&self, dictionary: &SharedDictionary) -> Result<PatternTerm, GraphError> {
        let bound = |lexical: &str, kind: TermKind| {
            dictionary
                .lookup(lexical, kind)
                .map_or(PatternTerm::Unknown, PatternTerm::Constant)
        };
        Ok(match self {
            TermSpec::Uri(iri) => bound(iri, TermKind::Uri),
            TermSpec::Literal(LiteralSpec::Plain(value))
            | TermSpec::Literal(LiteralSpec::Typed { value, datatype: None }) => {
                bound(value, TermKind::PLAIN)
            }
            TermSpec::Literal(LiteralSpec::Typed { value, datatype: Some(tag) }) => {
                let datatype = Datatype::from_iri(tag)
                    .ok_or_else(|| GraphError::UnknownTermKind(tag.clone()))?;
                bound(value, TermKind::Literal(datatype))
            }
            TermSpec::Var(name) => PatternTerm::Variable(name.trim_start_matches('?').to_string()),
            TermSpec::Wildcard => PatternTerm::Wildcard,
        })
    }
}

pub fn var(name: &str) -> TermSpec {
    TermSpec::Var(name.to_string())
}

pub fn uri(iri: &str) -> TermSpec {
    TermSpec::Uri(iri.to_string())
}

pub fn literal(value: &str) -> TermSpec {
    TermSpec::Literal(LiteralSpec::Plain(value.to_string()))
}

pub fn typed(value: &str, datatype: Datatype) -> TermSpec {
    TermSpec::Literal(LiteralSpec::Typed {
        value: value.to_string(),
        datatype: Some(datatype.iri().to_string()),
    })
}

pub fn wildcard() -> TermSpec {
    TermSpec::Wildcard
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub subject: TermSpec,
    pub predicate: TermSpec,
    pub object: TermSpec,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub variable: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// A query as handed over by an outer layer: already decomposed into
/// triple patterns, terms not yet interned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub patterns: Vec<PatternSpec>,
    #[serde(default)]
    pub order_by: Option<OrderSpec>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl QueryRequest {
    pub fn resolve(&self, dictionary: &SharedDictionary) -> Result<Query, GraphError> {
        let patterns = self
            .patterns
            .iter()
            .map(|spec| {
                Ok(QueryPattern {
                    subject: spec.subject.resolve(dictionary)?,
                    predicate: spec.predicate.resolve(dictionary)?,
                    object: spec.object.resolve(dictionary)?,
                    optional: spec.optional,
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        let query = Query {
            patterns,
            order_by: self.order_by.as_ref().map(|order| OrderBy {
                variable: order.variable.trim_start_matches('?').to_string(),
                direction: order.direction,
            }),
            limit: self.limit,
            offset: self.offset,
        };
        query.validate()?;
        Ok(query)
    }
}

/// Fluent construction of queries against one interner.
///
/// ```ignore
/// let query = QueryBuilder::new(store.dictionary())
///     .pattern(var("ds"), uri(DCAT_THEME), uri(CT_CONCEPT))
///     .optional(var("ds"), uri(DCTERMS_ISSUED), var("date"))
///     .order_by("date")
///     .desc()
///     .limit(10)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    dictionary: &'a SharedDictionary,
    request: QueryRequest,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(dictionary: &'a SharedDictionary) -> Self {
        Self { dictionary, request: QueryRequest::default() }
    }

    /// Adds a required pattern
    pub fn pattern(mut self, subject: TermSpec, predicate: TermSpec, object: TermSpec) -> Self {
        self.request.patterns.push(PatternSpec { subject, predicate, object, optional: false });
        self
    }

    /// Adds an optional pattern
    pub fn optional(mut self, subject: TermSpec, predicate: TermSpec, object: TermSpec) -> Self {
        self.request.patterns.push(PatternSpec { subject, predicate, object, optional: true });
        self
    }

    /// Orders by a variable, ascending unless `desc` follows
    pub fn order_by(mut self, variable: &str) -> Self {
        self.request.order_by = Some(OrderSpec {
            variable: variable.to_string(),
            direction: SortDirection::Ascending,
        });
        self
    }

    pub fn desc(mut self) -> Self {
        if let Some(order) = self.request.order_by.as_mut() {
            order.direction = SortDirection::Descending;
        }
        self
    }

    pub fn asc(mut self) -> Self {
        if let Some(order) = self.request.order_by.as_mut() {
            order.direction = SortDirection::Ascending;
        }
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.request.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.request.offset = n;
        self
    }

    pub fn into_request(self) -> QueryRequest {
        self.request
    }

    pub fn build(self) -> Result<Query, GraphError> {
        self.request.resolve(self.dictionary)
    }
}
