/*
 * Copyright © 2024 ladroid
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use crate::terms::{Term, TermKind, TermValue};
use crate::triple::Statement;

// Dictionary for interning (value, kind) pairs as compact term handles
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    by_kind: FxHashMap<TermKind, FxHashMap<String, Term>>,
    id_to_value: Vec<TermValue>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary {
            by_kind: FxHashMap::default(),
            id_to_value: Vec::new(),
        }
    }

    /// Returns the existing handle for `(lexical, kind)` or allocates a new one.
    /// Empty strings are ordinary values.
    pub fn encode(&mut self, lexical: &str, kind: TermKind) -> Term {
        if let Some(term) = self.lookup(lexical, kind) {
            return term;
        }
        // usize is at most 64 bits wide, so every index fits a handle
        let term = Term(self.id_to_value.len() as u64);
        self.by_kind
            .entry(kind)
            .or_default()
            .insert(lexical.to_string(), term);
        self.id_to_value.push(TermValue { lexical: lexical.to_string(), kind });
        term
    }

    pub fn lookup(&self, lexical: &str, kind: TermKind) -> Option<Term> {
        self.by_kind.get(&kind).and_then(|values| values.get(lexical)).copied()
    }

    pub fn decode(&self, term: Term) -> Option<&TermValue> {
        usize::try_from(term.0).ok().and_then(|index| self.id_to_value.get(index))
    }

    pub fn decode_statement(&self, statement: &Statement) -> String {
        let render = |term: Term| {
            self.decode(term)
                .map(|value| value.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };
        format!(
            "{} {} {} .",
            render(statement.subject),
            render(statement.predicate),
            render(statement.object)
        )
    }

    pub fn len(&self) -> usize {
        self.id_to_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_value.is_empty()
    }
}

/// Process-wide interner that can be used from several threads at once.
/// Interning only takes the write lock when the value is new.
#[derive(Debug, Clone, Default)]
pub struct SharedDictionary {
    inner: Arc<RwLock<Dictionary>>,
}

impl SharedDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, lexical: &str, kind: TermKind) -> Term {
        if let Some(term) = self.inner.read().lookup(lexical, kind) {
            return term;
        }
        // encode re-checks, so a racing writer that got there first wins
        self.inner.write().encode(lexical, kind)
    }

    pub fn intern_value(&self, value: &TermValue) -> Term {
        self.intern(&value.lexical, value.kind)
    }

    pub fn lookup(&self, lexical: &str, kind: TermKind) -> Option<Term> {
        self.inner.read().lookup(lexical, kind)
    }

    pub fn resolve(&self, term: Term) -> Option<TermValue> {
        self.inner.read().decode(term).cloned()
    }

    /// Holds the read lock for batch decoding.
    pub fn read(&self) -> RwLockReadGuard<'_, Dictionary> {
        self.inner.read()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::Datatype;
    use std::thread;

    #[test]
    fn test_equal_values_intern_to_same_handle() {
        let mut dict = Dictionary::new();
        let a = dict.encode("CT", TermKind::PLAIN);
        let b = dict.encode("CT", TermKind::PLAIN);
        assert_eq!(a, b);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_kind_is_part_of_identity() {
        let mut dict = Dictionary::new();
        let plain = dict.encode("2024-01-01", TermKind::PLAIN);
        let date = dict.encode("2024-01-01", TermKind::Literal(Datatype::Date));
        let uri = dict.encode("2024-01-01", TermKind::Uri);
        assert_ne!(plain, date);
        assert_ne!(date, uri);
        assert_eq!(dict.decode(date).map(|v| v.kind), Some(TermKind::Literal(Datatype::Date)));
    }

    #[test]
    fn test_handles_follow_allocation_order() {
        let mut dict = Dictionary::new();
        let handles: Vec<u64> = (0..1000)
            .map(|i| dict.encode(&format!("v{}", i), TermKind::PLAIN).id())
            .collect();
        assert_eq!(handles, (0..1000).collect::<Vec<u64>>());
        assert!(dict.decode(Term(u64::from(u32::MAX) + 1)).is_none());
    }

    #[test]
    fn test_empty_string_is_a_value() {
        let mut dict = Dictionary::new();
        let empty = dict.encode("", TermKind::PLAIN);
        assert_eq!(dict.lookup("", TermKind::PLAIN), Some(empty));
        assert_eq!(dict.decode(empty).map(|v| v.lexical.as_str()), Some(""));
    }

    #[test]
    fn test_shared_dictionary_concurrent_interning() {
        let dict = SharedDictionary::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let dict = dict.clone();
                thread::spawn(move || {
                    (0..100)
                        .map(|i| dict.intern(&format!("value-{}", i), TermKind::PLAIN))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<Vec<Term>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for other in &results[1..] {
            assert_eq!(&results[0], other);
        }
        assert_eq!(dict.len(), 100);
    }
}
