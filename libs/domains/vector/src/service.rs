//! End-to-end seeding run: provision, wait, ingest, wait, query.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::embedding::EmbeddingClient;
use crate::error::VectorResult;
use crate::ingest::IngestionPipeline;
use crate::models::{IndexConfig, SearchHit};
use crate::prober::{ProbeConfig, ProbeOutcome, ReadinessProber};
use crate::provisioner::Provisioner;
use crate::query::QueryPipeline;
use crate::store::VectorStore;

/// Fixed pauses standing in for readiness signals the storage service
/// does not offer.
#[derive(Debug, Clone)]
pub struct PipelineDelays {
    /// Pause between provisioning and the first readiness probe.
    pub post_provision: Duration,
    /// Pause between the bulk insert and the query, covering the
    /// asynchronous indexing of the new vectors.
    pub post_insert: Duration,
}

impl PipelineDelays {
    pub fn new(post_provision: Duration, post_insert: Duration) -> Self {
        Self {
            post_provision,
            post_insert,
        }
    }

    /// No waiting at all. For tests and already-warm indexes.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for PipelineDelays {
    fn default() -> Self {
        Self {
            post_provision: Duration::from_secs(30),
            post_insert: Duration::from_secs(15),
        }
    }
}

/// Everything one seeding run needs as input.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub bucket: String,
    pub index: String,
    pub texts: Vec<String>,
    pub metadata_template: Value,
    pub query_text: String,
    pub top_k: u32,
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub bucket: String,
    pub index: String,
    pub probe: ProbeOutcome,
    pub inserted: usize,
    pub hits: Vec<SearchHit>,
}

/// Drives the whole pipeline against injected collaborators.
///
/// The store and embedder are constructed by the caller and passed in,
/// so tests substitute mocks and no global client state exists.
pub struct Orchestrator {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
    index_config: IndexConfig,
    probe_config: ProbeConfig,
    delays: PipelineDelays,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingClient>,
        index_config: IndexConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            index_config,
            probe_config: ProbeConfig::default(),
            delays: PipelineDelays::default(),
        }
    }

    pub fn with_probe_config(mut self, config: ProbeConfig) -> Self {
        self.probe_config = config;
        self
    }

    pub fn with_delays(mut self, delays: PipelineDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Run provision → probe → ingest → query in order.
    ///
    /// Provisioning failures abort the run. Probe outcomes never do. An
    /// ingestion failure aborts the query step, since querying an index
    /// with no confirmed data answers nothing. Nothing is rolled back:
    /// provisioning is idempotent, so the next run picks up where this
    /// one stopped.
    pub async fn run(&self, plan: &SeedPlan) -> VectorResult<RunReport> {
        let provisioner = Provisioner::new(Arc::clone(&self.store));
        provisioner.ensure_bucket(&plan.bucket).await?;
        provisioner
            .ensure_index(&plan.bucket, &plan.index, &self.index_config)
            .await?;

        // A fresh index is almost never queryable immediately; give it a
        // head start before the first probe.
        if !self.delays.post_provision.is_zero() {
            info!(
                delay_secs = self.delays.post_provision.as_secs(),
                "waiting for the index to initialize"
            );
            tokio::time::sleep(self.delays.post_provision).await;
        }

        let prober =
            ReadinessProber::new(Arc::clone(&self.store)).with_config(self.probe_config.clone());
        let probe = prober
            .wait_until_ready(&plan.bucket, &plan.index, self.index_config.dimension)
            .await;

        self.survey_resources(&plan.bucket).await;

        let ingestion =
            IngestionPipeline::new(Arc::clone(&self.store), Arc::clone(&self.embedder));
        let outcome = ingestion
            .ingest(&plan.bucket, &plan.index, &plan.texts, &plan.metadata_template)
            .await?;

        if !self.delays.post_insert.is_zero() {
            info!(
                delay_secs = self.delays.post_insert.as_secs(),
                "waiting for new vectors to be indexed"
            );
            tokio::time::sleep(self.delays.post_insert).await;
        }

        let query = QueryPipeline::new(Arc::clone(&self.store), Arc::clone(&self.embedder));
        let hits = query
            .query(&plan.bucket, &plan.index, &plan.query_text, plan.top_k)
            .await?;

        Ok(RunReport {
            bucket: plan.bucket.clone(),
            index: plan.index.clone(),
            probe,
            inserted: outcome.inserted,
            hits,
        })
    }

    /// Log the buckets and indexes visible to this run. Failures here
    /// are informational only.
    async fn survey_resources(&self, bucket: &str) {
        match self.store.list_buckets().await {
            Ok(buckets) => info!(count = buckets.len(), buckets = ?buckets, "vector buckets"),
            Err(e) => warn!(error = %e, "failed to list vector buckets"),
        }

        match self.store.list_indexes(bucket).await {
            Ok(indexes) => {
                for index in &indexes {
                    info!(bucket, index = %index.name, dimension = index.dimension, "index present");
                }
            }
            Err(e) => warn!(bucket, error = %e, "failed to list indexes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::embedding::MockEmbeddingClient;
    use crate::error::{StoreError, VectorError};
    use crate::models::{IndexInfo, VectorMatch};
    use crate::store::MockVectorStore;

    fn plan() -> SeedPlan {
        SeedPlan {
            bucket: "demo-bucket".to_string(),
            index: "embeddings-index".to_string(),
            texts: vec!["a".to_string(), "b".to_string()],
            metadata_template: json!({"source": "demo"}),
            query_text: "who wakes early?".to_string(),
            top_k: 3,
        }
    }

    fn orchestrator(store: MockVectorStore, embedder: MockEmbeddingClient) -> Orchestrator {
        Orchestrator::new(Arc::new(store), Arc::new(embedder), IndexConfig::new(3))
            .with_probe_config(
                ProbeConfig::new()
                    .with_max_attempts(2)
                    .with_interval(Duration::from_millis(1)),
            )
            .with_delays(PipelineDelays::none())
    }

    fn happy_store() -> MockVectorStore {
        let mut store = MockVectorStore::new();
        store.expect_create_bucket().returning(|_| Ok(()));
        store.expect_create_index().returning(|_, _, _| Ok(()));
        store
            .expect_list_buckets()
            .returning(|| Ok(vec!["demo-bucket".to_string()]));
        store.expect_list_indexes().returning(|_| {
            Ok(vec![IndexInfo {
                name: "embeddings-index".to_string(),
                dimension: Some(3),
            }])
        });
        store.expect_put_vectors().returning(|_, _, _| Ok(()));
        store.expect_query_vectors().returning(|_, _, _| {
            Ok(vec![VectorMatch {
                key: "k1".to_string(),
                distance: Some(0.1),
                metadata: Some(json!({"original_text": "a"})),
            }])
        });
        store
    }

    fn happy_embedder() -> MockEmbeddingClient {
        let mut embedder = MockEmbeddingClient::new();
        embedder
            .expect_embed_batch()
            .returning(|texts| Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect()));
        embedder
            .expect_embed()
            .returning(|_| Ok(vec![0.1, 0.2, 0.3]));
        embedder
    }

    #[tokio::test]
    async fn test_run_happy_path() {
        let report = orchestrator(happy_store(), happy_embedder())
            .run(&plan())
            .await
            .unwrap();

        assert_eq!(report.probe, ProbeOutcome::Ready);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].text, "a");
    }

    #[tokio::test]
    async fn test_provisioning_failure_aborts_everything() {
        // Only create_bucket is expected; any downstream call would panic
        // the mock and fail the test.
        let mut store = MockVectorStore::new();
        store
            .expect_create_bucket()
            .returning(|_| Err(StoreError::Other("access denied".to_string())));

        let err = orchestrator(store, MockEmbeddingClient::new())
            .run(&plan())
            .await
            .unwrap_err();

        assert!(matches!(err, VectorError::Store(StoreError::Other(_))));
    }

    #[tokio::test]
    async fn test_ingest_failure_aborts_query() {
        let mut store = MockVectorStore::new();
        store.expect_create_bucket().returning(|_| Ok(()));
        store.expect_create_index().returning(|_, _, _| Ok(()));
        store.expect_list_buckets().returning(|| Ok(vec![]));
        store.expect_list_indexes().returning(|_| Ok(vec![]));
        // Probe succeeds, then the insert fails; the query embed/query
        // calls must never happen.
        store.expect_query_vectors().times(1).returning(|_, _, _| Ok(vec![]));
        store
            .expect_put_vectors()
            .returning(|_, _, _| Err(StoreError::Other("insert failed".to_string())));

        let mut embedder = MockEmbeddingClient::new();
        embedder
            .expect_embed_batch()
            .returning(|texts| Ok(texts.iter().map(|_| vec![0.0, 0.0, 0.0]).collect()));

        let err = orchestrator(store, embedder).run(&plan()).await.unwrap_err();
        assert!(matches!(err, VectorError::Store(StoreError::Other(_))));
    }

    #[tokio::test]
    async fn test_unready_probe_does_not_abort() {
        let mut store = MockVectorStore::new();
        store.expect_create_bucket().returning(|_| Ok(()));
        store.expect_create_index().returning(|_, _, _| Ok(()));
        store.expect_list_buckets().returning(|| Ok(vec![]));
        store.expect_list_indexes().returning(|_| Ok(vec![]));
        store.expect_put_vectors().returning(|_, _, _| Ok(()));

        // Both probe attempts report a building index; the final query
        // succeeds anyway.
        store.expect_query_vectors().returning(|_, _, query| {
            if query.top_k == 1 {
                Err(StoreError::NotReady("still building".to_string()))
            } else {
                Ok(vec![])
            }
        });

        let report = orchestrator(store, happy_embedder())
            .run(&plan())
            .await
            .unwrap();

        assert_eq!(report.probe, ProbeOutcome::NotReady);
        assert_eq!(report.inserted, 2);
        assert!(report.hits.is_empty());
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let mut store = MockVectorStore::new();
        // Second run: both resources already exist.
        store.expect_create_bucket().times(1).returning(|bucket| {
            Err(StoreError::AlreadyExists {
                resource: format!("vector bucket '{}'", bucket),
            })
        });
        store.expect_create_index().times(1).returning(|_, index, _| {
            Err(StoreError::AlreadyExists {
                resource: format!("vector index '{}'", index),
            })
        });
        store.expect_list_buckets().returning(|| Ok(vec![]));
        store.expect_list_indexes().returning(|_| {
            // Still exactly one index entry for the name.
            Ok(vec![IndexInfo {
                name: "embeddings-index".to_string(),
                dimension: Some(3),
            }])
        });
        store.expect_put_vectors().returning(|_, _, _| Ok(()));
        store.expect_query_vectors().returning(|_, _, _| Ok(vec![]));

        let report = orchestrator(store, happy_embedder())
            .run(&plan())
            .await
            .unwrap();

        assert_eq!(report.inserted, 2);
    }
}
