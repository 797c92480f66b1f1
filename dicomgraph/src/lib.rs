/*
 * Copyright © 2024 ladroid
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod catalog;
pub mod config;
pub mod custom_error;
pub mod engine;
pub mod graph_export;
pub mod ingest;
pub mod loader;
pub mod mapper;
pub mod ontology;
pub mod query_builder;
pub mod query_engine;
pub mod record;
pub mod synthetic;
pub mod triple_store;
pub mod vocabulary;
