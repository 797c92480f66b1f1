/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Errors raised by mapping and query evaluation. None of them is fatal to
/// the process: mapping errors reject one record, query errors one request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A required metadata field was absent; the whole record is rejected.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// A term was described with a kind or datatype tag the store does not know.
    #[error("unknown term kind: {0}")]
    UnknownTermKind(String),

    /// The query was rejected before evaluation.
    #[error("invalid query pattern: {0}")]
    InvalidQueryPattern(String),
}

impl GraphError {
    pub fn missing(field: &str) -> Self {
        GraphError::MissingRequiredField(field.to_string())
    }
}

/// Errors raised while reading records from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
