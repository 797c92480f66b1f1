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
use crate::mapper::OntologyMapper;
use crate::record::MetadataRecord;
use crate::triple_store::TripleStore;
use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A record that was skipped, by position in its batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub records_seen: usize,
    pub records_ingested: usize,
    pub statements_added: usize,
    pub rejected: Vec<Rejection>,
}

impl IngestReport {
    fn record(&mut self, index: usize, outcome: &Result<usize, GraphError>) {
        self.records_seen += 1;
        match outcome {
            Ok(added) => {
                self.records_ingested += 1;
                self.statements_added += added;
            }
            Err(err) => {
                warn!("Skipping record {}: {}", index, err);
                self.rejected.push(Rejection { index, reason: err.to_string() });
            }
        }
    }

    pub fn merge(&mut self, other: IngestReport) {
        let offset = self.records_seen;
        self.records_seen += other.records_seen;
        self.records_ingested += other.records_ingested;
        self.statements_added += other.statements_added;
        self.rejected.extend(other.rejected.into_iter().map(|rejection| Rejection {
            index: rejection.index + offset,
            reason: rejection.reason,
        }));
    }
}

/// Maps one record and inserts its statements as a single atomic batch.
/// Returns the number of statements that were new.
pub fn ingest_record(
    store: &TripleStore,
    mapper: &OntologyMapper,
    record: &MetadataRecord,
) -> Result<usize, GraphError> {
    let statements = mapper.map(record)?;
    Ok(store.insert(&statements))
}

/// Maps every record (on the rayon pool when `parallel`), then inserts them
/// one record at a time in input order. Rejected records do not stop the batch.
pub fn ingest_batch(
    store: &TripleStore,
    mapper: &OntologyMapper,
    records: &[MetadataRecord],
    parallel: bool,
) -> IngestReport {
    let mapped: Vec<_> = if parallel {
        records.par_iter().map(|record| mapper.map(record)).collect()
    } else {
        records.iter().map(|record| mapper.map(record)).collect()
    };

    let mut report = IngestReport::default();
    for (index, outcome) in mapped.into_iter().enumerate() {
        let outcome = outcome.map(|statements| store.insert(&statements));
        report.record(index, &outcome);
    }
    info!(
        "Ingested {}/{} records, {} new statements, store size {}",
        report.records_ingested,
        report.records_seen,
        report.statements_added,
        store.size()
    );
    report
}

struct UploadJob {
    record: MetadataRecord,
    reply: Sender<Result<usize, GraphError>>,
}

/// Background ingestion for records arriving one at a time. Submissions
/// block once `capacity` records are waiting.
pub struct UploadQueue {
    sender: Option<Sender<UploadJob>>,
    worker: Option<JoinHandle<IngestReport>>,
}

impl UploadQueue {
    pub fn start(store: Arc<TripleStore>, mapper: OntologyMapper, capacity: usize) -> Self {
        let (sender, receiver): (Sender<UploadJob>, Receiver<UploadJob>) = bounded(capacity.max(1));
        let worker = thread::spawn(move || {
            let mut report = IngestReport::default();
            while let Ok(job) = receiver.recv() {
                let outcome = ingest_record(&store, &mapper, &job.record);
                report.record(report.records_seen, &outcome);
                // The submitter may have stopped listening
                let _ = job.reply.send(outcome);
            }
            debug!("Upload queue: shutdown complete");
            report
        });
        UploadQueue { sender: Some(sender), worker: Some(worker) }
    }

    /// Queues a record. The returned receiver yields the outcome once the
    /// record has been ingested.
    pub fn submit(&self, record: MetadataRecord) -> Receiver<Result<usize, GraphError>> {
        let (reply, outcome) = bounded(1);
        if let Some(sender) = &self.sender {
            if sender.send(UploadJob { record, reply }).is_err() {
                warn!("Upload queue worker is gone, dropping record");
            }
        }
        outcome
    }

    /// Stops accepting records, drains the queue and returns what the worker did.
    pub fn shutdown(mut self) -> IngestReport {
        self.stop()
    }

    fn stop(&mut self) -> IngestReport {
        self.sender.take();
        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(report)) => report,
            Some(Err(_)) => {
                warn!("Upload queue worker panicked");
                IngestReport::default()
            }
            None => IngestReport::default(),
        }
    }
}

impl Drop for UploadQueue {
    fn drop(&mut self) {
        self.stop();
    }
}
