//! Vector Seeding Domain
//!
//! Provisions a remote vector index, embeds text through an external
//! embedding service, stores the vectors with metadata, and retrieves
//! nearest neighbors for query strings.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Orchestrator                 │
//! │  provision → probe → ingest → (wait) → query │
//! └──────┬──────────┬──────────┬──────────┬──────┘
//!        │          │          │          │
//! ┌──────▼───┐ ┌────▼─────┐ ┌──▼───────┐ ┌▼────────────┐
//! │Provision-│ │Readiness │ │Ingestion │ │  Query      │
//! │   er     │ │ Prober   │ │ Pipeline │ │  Pipeline   │
//! └──────┬───┘ └────┬─────┘ └──┬───┬───┘ └─┬───┬───────┘
//!        │          │          │   │       │   │
//! ┌──────▼──────────▼──────────▼───┼───────▼┐ ┌▼────────────────┐
//! │       VectorStore (trait)      │        │ │ EmbeddingClient │
//! │        S3VectorsStore          │        │ │     (trait)     │
//! └────────────────────────────────┼────────┘ │  OpenAiEmbedder │
//!                                  └──────────►                 │
//!                                             └─────────────────┘
//! ```
//!
//! The two traits are the only seams to the outside world. The S3
//! Vectors adapter classifies vendor failures into typed
//! [`StoreError`] variants at the boundary, so provisioning can absorb
//! "already exists" and probing can recognize "still building" without
//! parsing error text.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_vector::{
//!     EmbeddingModel, IndexConfig, OpenAiConfig, OpenAiEmbedder, Orchestrator,
//!     S3VectorsConfig, S3VectorsStore, SeedPlan,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(S3VectorsStore::new(S3VectorsConfig::from_env()).await);
//! let embedder = Arc::new(OpenAiEmbedder::new(OpenAiConfig::from_env()?));
//!
//! let orchestrator = Orchestrator::new(
//!     store,
//!     embedder,
//!     IndexConfig::for_model(EmbeddingModel::TextEmbedding3Large),
//! );
//!
//! let plan = SeedPlan {
//!     bucket: "my-vector-bucket".to_string(),
//!     index: "embeddings-index".to_string(),
//!     texts: vec!["The early bird catches the worm.".to_string()],
//!     metadata_template: serde_json::json!({ "source": "demo" }),
//!     query_text: "Who wakes up early?".to_string(),
//!     top_k: 5,
//! };
//!
//! let report = orchestrator.run(&plan).await?;
//! for hit in &report.hits {
//!     println!("{} (distance: {})", hit.text, hit.distance_display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod ingest;
pub mod models;
pub mod prober;
pub mod provisioner;
pub mod query;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use embedding::{EmbeddingClient, OpenAiConfig, OpenAiEmbedder};
pub use error::{StoreError, VectorError, VectorResult};
pub use ingest::{IngestionPipeline, InsertOutcome};
pub use models::{
    DistanceMetric, EmbeddingModel, IndexConfig, IndexInfo, ORIGINAL_TEXT_FIELD, SearchHit,
    VectorDataType, VectorMatch, VectorQuery, VectorRecord,
};
pub use prober::{ProbeConfig, ProbeOutcome, ReadinessProber};
pub use provisioner::Provisioner;
pub use query::QueryPipeline;
pub use service::{Orchestrator, PipelineDelays, RunReport, SeedPlan};
pub use store::{S3VectorsConfig, S3VectorsStore, VectorStore};
