/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use serde::{Serialize, Deserialize};
use crate::terms::Term;

/// One (subject, predicate, object) statement over interned terms.
#[derive(PartialEq, Debug, Clone, Copy, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

/// Slot of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self { subject, predicate, object }
    }

    pub fn get(&self, position: Position) -> Term {
        match position {
            Position::Subject => self.subject,
            Position::Predicate => self.predicate,
            Position::Object => self.object,
        }
    }

    /// True when every bound slot equals the statement's term in that slot.
    pub fn matches(&self, s: Option<Term>, p: Option<Term>, o: Option<Term>) -> bool {
        s.map_or(true, |s| s == self.subject)
            && p.map_or(true, |p| p == self.predicate)
            && o.map_or(true, |o| o == self.object)
    }
}
