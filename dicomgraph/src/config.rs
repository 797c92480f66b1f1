/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//! - built-in defaults
//! - `dicomgraph.toml`
//! - `dicomgraph.local.toml`
//! - environment variables with the `DICOMGRAPH_` prefix, `__` between sections
//!
//! ```toml
//! [mapping]
//! base_uri = "http://local.dev/dicom-demo/"
//!
//! [export]
//! include_literals = true
//! ```
//!
//! ```bash
//! DICOMGRAPH_INGEST__PARALLEL=false
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// IRIs minted by the ontology mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Dataset IRIs are `<base_uri>dataset/<accession number>`
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    /// Patient IRIs are `<pid_prefix>patient/<patient id>`
    #[serde(default = "default_pid_prefix")]
    pub pid_prefix: String,
    #[serde(default = "default_catalog_uri")]
    pub catalog_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Map batch records on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default = "default_upload_queue_capacity")]
    pub upload_queue_capacity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub include_literals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `dicomgraph=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_uri() -> String {
    "http://local.dev/dicom-demo/".to_string()
}

fn default_pid_prefix() -> String {
    "https://w3id.org/purl/pid/".to_string()
}

fn default_catalog_uri() -> String {
    "http://local.dev/dicom-demo/catalog".to_string()
}

fn default_true() -> bool {
    true
}

fn default_upload_queue_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            base_uri: default_base_uri(),
            pid_prefix: default_pid_prefix(),
            catalog_uri: default_catalog_uri(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            parallel: true,
            upload_queue_capacity: default_upload_queue_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: default_log_level() }
    }
}

impl Config {
    /// Load from `dicomgraph.toml`, `dicomgraph.local.toml` and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("dicomgraph.toml"))
            .merge(Toml::file("dicomgraph.local.toml"))
            .merge(Env::prefixed("DICOMGRAPH_").split("__"))
            .extract()
    }

    /// Load from an explicit file plus the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DICOMGRAPH_").split("__"))
            .extract()
    }
}
