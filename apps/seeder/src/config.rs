//! Configuration for the seeder CLI

use std::time::Duration;

use chrono::Utc;
use core_config::{env_or_default, env_parse_or};
use domain_vector::{EmbeddingModel, IndexConfig, PipelineDelays, ProbeConfig};
use eyre::Result;

#[derive(Debug, Clone)]
pub struct Config {
    /// Vector bucket to provision and use
    pub bucket_name: String,
    /// Vector index inside the bucket
    pub index_name: String,
    /// Embedding model; fixes the index dimension
    pub model: EmbeddingModel,
    /// Default number of neighbors per query
    pub top_k: u32,
    /// Readiness polling policy
    pub probe: ProbeConfig,
    /// Pauses after provisioning and after inserting
    pub delays: PipelineDelays,
}

fn default_bucket_name() -> String {
    format!("vector-seeder-{}", Utc::now().timestamp())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bucket_name =
            std::env::var("S3_VECTOR_BUCKET_NAME").unwrap_or_else(|_| default_bucket_name());
        let index_name = env_or_default("S3_VECTOR_INDEX_NAME", "embeddings-index");

        let model = match std::env::var("EMBEDDING_MODEL") {
            Ok(name) => name.parse()?,
            Err(_) => EmbeddingModel::default(),
        };

        let probe = ProbeConfig::new()
            .with_max_attempts(env_parse_or("PROBE_MAX_ATTEMPTS", 3u32)?)
            .with_interval(Duration::from_secs(env_parse_or(
                "PROBE_INTERVAL_SECS",
                30u64,
            )?));

        let delays = PipelineDelays::new(
            Duration::from_secs(env_parse_or("SEED_POST_PROVISION_DELAY_SECS", 30u64)?),
            Duration::from_secs(env_parse_or("SEED_POST_INSERT_DELAY_SECS", 15u64)?),
        );

        Ok(Self {
            bucket_name,
            index_name,
            model,
            top_k: env_parse_or("SEED_TOP_K", 5u32)?,
            probe,
            delays,
        })
    }

    /// Index configuration matching the configured embedding model
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::for_model(self.model)
    }
}
