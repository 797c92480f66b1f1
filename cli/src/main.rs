/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dicomgraph::catalog::CatalogQuery;
use dicomgraph::config::Config;
use dicomgraph::engine::DicomGraph;
use dicomgraph::graph_export::{export, ToDot};
use dicomgraph::ingest::IngestReport;
use dicomgraph::loader::load_records;
use dicomgraph::query_builder::QueryRequest;
use dicomgraph::synthetic;
use log::info;
use std::fs;
use std::path::PathBuf;

/// Records generated when no record file is given
const DEFAULT_SYNTHETIC_RECORDS: usize = 50;

#[derive(Parser)]
#[command(
    name = "dicomgraph-cli",
    version,
    about = "A CLI tool for dicomgraph",
    long_about = "dicomgraph CLI - loads DICOM metadata records, maps them onto DCAT, SNOMED CT and ROO terms in an in-memory triple store, and answers catalog searches, pattern queries and graph exports against it."
)]
struct Args {
    #[arg(short, long, help = "Configuration file (TOML)", value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "JSON record file to ingest, repeatable", value_name = "FILE")]
    records: Vec<PathBuf>,

    #[arg(long, help = "Number of synthetic demo records to ingest", value_name = "N")]
    synthetic: Option<usize>,

    #[arg(long, default_value_t = 42, help = "Seed for synthetic records")]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Statement, term and dataset counts plus the ingest report
    Stats,
    /// Catalog search; matching datasets as JSON entries
    Search {
        #[command(flatten)]
        filters: Filters,
    },
    /// Every dataset as a catalog entry, ordered by study date
    Catalog,
    /// Evaluate a JSON query request
    Query {
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Graph snapshot for visualisation
    Export {
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        #[arg(long, help = "Include literal nodes")]
        literals: bool,
    },
}

#[derive(clap::Args)]
struct Filters {
    #[arg(long)]
    modality: Option<String>,
    #[arg(long)]
    accession: Option<String>,
    #[arg(long)]
    text: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Dot,
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn populate(graph: &DicomGraph, args: &Args) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    for path in &args.records {
        let records = load_records(path)?;
        report.merge(graph.ingest_batch(&records));
    }
    let synthetic_count = match args.synthetic {
        Some(count) => count,
        None if args.records.is_empty() => DEFAULT_SYNTHETIC_RECORDS,
        None => 0,
    };
    if synthetic_count > 0 {
        info!("Generating {} synthetic records", synthetic_count);
        report.merge(graph.ingest_batch(&synthetic::generate(synthetic_count, args.seed)));
    }
    Ok(report)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("invalid configuration")?;
    init_logging(&config.logging.level);

    let graph = DicomGraph::new(config);
    let report = populate(&graph, &args)?;

    match args.command {
        Command::Stats => {
            let stats = serde_json::json!({
                "statements": graph.store().size(),
                "terms": graph.store().dictionary().len(),
                "datasets": graph.store().dataset_count(),
                "ingest": report,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Search { filters } => {
            let query = CatalogQuery {
                modality: filters.modality,
                accession: filters.accession,
                free_text: filters.text,
            };
            let entries = graph.catalog(&query)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Catalog => {
            let entries = graph.catalog(&CatalogQuery::new())?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Query { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let request: QueryRequest = serde_json::from_str(&text)
                .with_context(|| format!("malformed query request {}", file.display()))?;
            let rows = graph.query_rows(&request)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Export { out, format, literals } => {
            let include_literals = literals || graph.config().export.include_literals;
            let snapshot = export(graph.store(), include_literals);
            let rendered = match format {
                ExportFormat::Json => serde_json::to_string_pretty(&snapshot)?,
                ExportFormat::Dot => snapshot.to_dot(),
            };
            match out {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    info!(
                        "Wrote {} nodes and {} links to {}",
                        snapshot.nodes.len(),
                        snapshot.links.len(),
                        path.display()
                    );
                }
                None => println!("{}", rendered),
            }
        }
    }
    Ok(())
}
