/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// Interned handle of a URI or literal. Two terms are equal iff their handles are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Term(pub u64);

impl Term {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Literal datatypes understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datatype {
    String,
    Date,
    Time,
    Integer,
    Decimal,
}

impl Datatype {
    pub fn iri(self) -> &'static str {
        match self {
            Datatype::String => "http://www.w3.org/2001/XMLSchema#string",
            Datatype::Date => "http://www.w3.org/2001/XMLSchema#date",
            Datatype::Time => "http://www.w3.org/2001/XMLSchema#time",
            Datatype::Integer => "http://www.w3.org/2001/XMLSchema#integer",
            Datatype::Decimal => "http://www.w3.org/2001/XMLSchema#decimal",
        }
    }

    /// Accepts full XSD IRIs, `xsd:` short forms and bare local names.
    pub fn from_iri(tag: &str) -> Option<Self> {
        let tag = tag.trim().trim_start_matches('<').trim_end_matches('>');
        let local = tag
            .strip_prefix(XSD_NAMESPACE)
            .or_else(|| tag.strip_prefix("xsd:"))
            .unwrap_or(tag);
        match local {
            "string" => Some(Datatype::String),
            "date" => Some(Datatype::Date),
            "time" => Some(Datatype::Time),
            "integer" | "int" | "long" => Some(Datatype::Integer),
            "decimal" | "double" | "float" => Some(Datatype::Decimal),
            _ => None,
        }
    }
}

/// Whether a term names a graph resource/relation or carries a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermKind {
    Uri,
    Literal(Datatype),
}

impl TermKind {
    pub const PLAIN: TermKind = TermKind::Literal(Datatype::String);

    /// Parses a kind tag: `uri`, `literal`, or a datatype IRI.
    /// Returns `None` for tags the store does not recognise.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "uri" | "iri" => Some(TermKind::Uri),
            "literal" => Some(TermKind::PLAIN),
            other => Datatype::from_iri(other).map(TermKind::Literal),
        }
    }

    pub fn is_uri(self) -> bool {
        matches!(self, TermKind::Uri)
    }
}

/// The raw value behind a term handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermValue {
    pub lexical: String,
    pub kind: TermKind,
}

impl TermValue {
    pub fn uri(iri: impl Into<String>) -> Self {
        Self { lexical: iri.into(), kind: TermKind::Uri }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self { lexical: value.into(), kind: TermKind::PLAIN }
    }

    pub fn typed(value: impl Into<String>, datatype: Datatype) -> Self {
        Self { lexical: value.into(), kind: TermKind::Literal(datatype) }
    }

    pub fn is_uri(&self) -> bool {
        self.kind.is_uri()
    }

    /// Total order used by ORDER BY: literals of the same datatype compare by
    /// value, everything else by raw string form.
    pub fn order_cmp(&self, other: &TermValue) -> Ordering {
        match (self.kind, other.kind) {
            (TermKind::Literal(a), TermKind::Literal(b)) if a == b => {
                compare_typed(a, &self.lexical, &other.lexical)
            }
            _ => self.lexical.cmp(&other.lexical),
        }
    }
}

fn compare_typed(datatype: Datatype, a: &str, b: &str) -> Ordering {
    let by_value = match datatype {
        Datatype::Integer | Datatype::Decimal => {
            match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y),
                _ => None,
            }
        }
        Datatype::Date => match (
            NaiveDate::parse_from_str(a, "%Y-%m-%d"),
            NaiveDate::parse_from_str(b, "%Y-%m-%d"),
        ) {
            (Ok(x), Ok(y)) => Some(x.cmp(&y)),
            _ => None,
        },
        Datatype::Time => match (parse_time(a), parse_time(b)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => None,
        },
        Datatype::String => None,
    };
    // Equal values with different spellings ("1.0" vs "1") still need a stable order.
    match by_value {
        Some(Ordering::Equal) | None => a.cmp(b),
        Some(ordering) => ordering,
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H%M%S%.f"))
        .ok()
}

impl fmt::Display for TermValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TermKind::Uri => write!(f, "<{}>", self.lexical),
            TermKind::Literal(Datatype::String) => write!(f, "\"{}\"", self.lexical),
            TermKind::Literal(dt) => write!(f, "\"{}\"^^<{}>", self.lexical, dt.iri()),
        }
    }
}

/// One slot of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternTerm {
    Variable(String),
    Constant(Term),
    /// Matches anything and binds nothing.
    Wildcard,
    /// A bound term the interner has never seen. Matches nothing.
    Unknown,
}

pub type TriplePattern = (PatternTerm, PatternTerm, PatternTerm);

impl PatternTerm {
    pub fn is_var(&self) -> bool {
        matches!(self, PatternTerm::Variable(_))
    }

    pub fn constant(&self) -> Option<Term> {
        match self {
            PatternTerm::Constant(term) => Some(*term),
            _ => None,
        }
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            PatternTerm::Variable(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, PatternTerm::Unknown)
    }
}
