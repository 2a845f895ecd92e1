//! Vector Seeder
//!
//! One-shot CLI that provisions an S3 vector bucket and index, waits for
//! the index to become queryable, seeds it with embedded text, and runs a
//! similarity query against the result.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_vector::{
    OpenAiConfig, OpenAiEmbedder, Orchestrator, QueryPipeline, S3VectorsConfig, S3VectorsStore,
    SearchHit, SeedPlan, VectorStore,
};
use eyre::Result;
use tracing::{error, info};

mod config;

use config::Config;

/// Demo corpus used when no texts are supplied.
const SAMPLE_TEXTS: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog.",
    "A journey of a thousand miles begins with a single step.",
    "To be or not to be, that is the question.",
    "All that glitters is not gold.",
    "The early bird catches the worm.",
];

const DEFAULT_QUERY: &str = "What is the opposite of a late riser?";

#[derive(Parser)]
#[command(name = "vector-seeder")]
#[command(about = "Provision a vector index, seed it with embedded text, and query it")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the bucket and index, ingest texts, and run a query
    Seed {
        /// Texts to ingest. Defaults to a small demo corpus.
        #[arg(short, long)]
        text: Vec<String>,

        /// Query to run after seeding
        #[arg(short, long, default_value = DEFAULT_QUERY)]
        query: String,

        /// Number of nearest neighbors to return
        #[arg(short = 'k', long)]
        top_k: Option<u32>,
    },

    /// Query an existing index
    Query {
        /// Query text
        text: String,

        /// Number of nearest neighbors to return
        #[arg(short = 'k', long)]
        top_k: Option<u32>,
    },

    /// List vector buckets and the configured bucket's indexes
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let config = Config::from_env()?;
    let cli = Cli::parse();

    info!(
        bucket = %config.bucket_name,
        index = %config.index_name,
        model = config.model.model_name(),
        "using vector resources"
    );

    let store = Arc::new(S3VectorsStore::new(S3VectorsConfig::from_env()).await);

    match cli.command {
        Commands::Seed { text, query, top_k } => {
            let embedder = Arc::new(OpenAiEmbedder::new(
                OpenAiConfig::from_env()?.with_model(config.model),
            ));

            let texts: Vec<String> = if text.is_empty() {
                SAMPLE_TEXTS.iter().map(|s| s.to_string()).collect()
            } else {
                text
            };

            let plan = SeedPlan {
                bucket: config.bucket_name.clone(),
                index: config.index_name.clone(),
                texts,
                metadata_template: serde_json::json!({ "source": "demo" }),
                query_text: query,
                top_k: top_k.unwrap_or(config.top_k),
            };

            let orchestrator = Orchestrator::new(store, embedder, config.index_config())
                .with_probe_config(config.probe.clone())
                .with_delays(config.delays.clone());

            match orchestrator.run(&plan).await {
                Ok(report) => {
                    info!(
                        inserted = report.inserted,
                        probe = ?report.probe,
                        "seeding run complete"
                    );
                    print_hits(&report.hits);
                }
                Err(e) => {
                    // Report and stop. Partially created remote state is
                    // left in place; the next run provisions idempotently.
                    error!(error = %e, "seeding run failed, skipping remaining steps");
                }
            }
        }

        Commands::Query { text, top_k } => {
            let embedder = Arc::new(OpenAiEmbedder::new(
                OpenAiConfig::from_env()?.with_model(config.model),
            ));

            let pipeline = QueryPipeline::new(store, embedder);
            let hits = pipeline
                .query(
                    &config.bucket_name,
                    &config.index_name,
                    &text,
                    top_k.unwrap_or(config.top_k),
                )
                .await?;

            print_hits(&hits);
        }

        Commands::Status => {
            let buckets = store.list_buckets().await?;
            println!("Found {} vector buckets:", buckets.len());
            for bucket in &buckets {
                println!("  - {}", bucket);
            }

            let indexes = store.list_indexes(&config.bucket_name).await?;
            println!(
                "Found {} indexes in bucket '{}':",
                indexes.len(),
                config.bucket_name
            );
            for index in &indexes {
                match index.dimension {
                    Some(dim) => println!("  - {} (dimension: {})", index.name, dim),
                    None => println!("  - {}", index.name),
                }
            }
        }
    }

    Ok(())
}

fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No results found.");
        return;
    }

    println!("Found {} results:", hits.len());
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "  {}. {} (distance: {})",
            rank + 1,
            hit.text,
            hit.distance_display()
        );
    }
}
