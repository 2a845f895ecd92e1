//! Similarity search with display-ready results.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::EmbeddingClient;
use crate::error::{VectorError, VectorResult};
use crate::models::{ORIGINAL_TEXT_FIELD, SearchHit, VectorQuery};
use crate::store::VectorStore;

/// Placeholder shown when a stored record carries no original text.
const MISSING_TEXT: &str = "no text available";

/// Embeds query strings and ranks their nearest stored neighbors.
pub struct QueryPipeline {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl QueryPipeline {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedder }
    }

    /// Embed `text` and return its nearest neighbors, nearest first.
    ///
    /// The store's ordering is trusted as-is: results are truncated to
    /// `top_k` but never re-sorted. Zero hits is a valid outcome.
    pub async fn query(
        &self,
        bucket: &str,
        index: &str,
        text: &str,
        top_k: u32,
    ) -> VectorResult<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(VectorError::Validation(
                "top_k must be at least 1".to_string(),
            ));
        }

        let embedding = self.embedder.embed(text).await?;
        debug!(bucket, index, dimension = embedding.len(), "query embedded");

        let matches = self
            .store
            .query_vectors(bucket, index, VectorQuery::new(embedding, top_k))
            .await?;

        let hits: Vec<SearchHit> = matches
            .into_iter()
            .take(top_k as usize)
            .map(|m| {
                let text = m
                    .metadata
                    .as_ref()
                    .and_then(|meta| meta.get(ORIGINAL_TEXT_FIELD))
                    .and_then(|v| v.as_str())
                    .unwrap_or(MISSING_TEXT)
                    .to_string();

                SearchHit {
                    key: m.key,
                    text,
                    distance: m.distance,
                    metadata: m.metadata,
                }
            })
            .collect();

        info!(bucket, index, hits = hits.len(), "similarity query complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::embedding::MockEmbeddingClient;
    use crate::models::VectorMatch;
    use crate::store::MockVectorStore;

    fn stub_embedder() -> MockEmbeddingClient {
        let mut embedder = MockEmbeddingClient::new();
        embedder
            .expect_embed()
            .returning(|_| Ok(vec![0.1, 0.2, 0.3]));
        embedder
    }

    fn hit(key: &str, distance: f32, text: Option<&str>) -> VectorMatch {
        VectorMatch {
            key: key.to_string(),
            distance: Some(distance),
            metadata: text.map(|t| json!({ "original_text": t, "source": "demo" })),
        }
    }

    #[tokio::test]
    async fn test_query_maps_matches_in_order() {
        let mut store = MockVectorStore::new();
        store
            .expect_query_vectors()
            .times(1)
            .withf(|_, _, query| {
                query.top_k == 2 && query.return_distance && query.return_metadata
            })
            .returning(|_, _, _| {
                Ok(vec![
                    hit("k1", 0.1, Some("nearest")),
                    hit("k2", 0.5, Some("farther")),
                ])
            });

        let pipeline = QueryPipeline::new(Arc::new(store), Arc::new(stub_embedder()));
        let hits = pipeline.query("b", "i", "who wakes early?", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "nearest");
        assert_eq!(hits[0].distance, Some(0.1));
        assert_eq!(hits[1].text, "farther");
        // Metadata survives the round trip untouched.
        assert_eq!(hits[0].metadata.as_ref().unwrap()["source"], "demo");
    }

    #[tokio::test]
    async fn test_query_truncates_to_top_k() {
        let mut store = MockVectorStore::new();
        store.expect_query_vectors().returning(|_, _, _| {
            Ok(vec![hit("k1", 0.1, Some("near")), hit("k2", 0.5, Some("far"))])
        });

        let pipeline = QueryPipeline::new(Arc::new(store), Arc::new(stub_embedder()));
        let hits = pipeline.query("b", "i", "q", 1).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, Some(0.1));
    }

    #[tokio::test]
    async fn test_query_falls_back_when_text_missing() {
        let mut store = MockVectorStore::new();
        store
            .expect_query_vectors()
            .returning(|_, _, _| Ok(vec![hit("k1", 0.2, None)]));

        let pipeline = QueryPipeline::new(Arc::new(store), Arc::new(stub_embedder()));
        let hits = pipeline.query("b", "i", "q", 1).await.unwrap();

        assert_eq!(hits[0].text, "no text available");
    }

    #[tokio::test]
    async fn test_query_accepts_zero_results() {
        let mut store = MockVectorStore::new();
        store.expect_query_vectors().returning(|_, _, _| Ok(vec![]));

        let pipeline = QueryPipeline::new(Arc::new(store), Arc::new(stub_embedder()));
        let hits = pipeline.query("b", "i", "q", 3).await.unwrap();

        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_rejects_zero_top_k() {
        let store = MockVectorStore::new();
        let embedder = MockEmbeddingClient::new();

        let pipeline = QueryPipeline::new(Arc::new(store), Arc::new(embedder));
        let err = pipeline.query("b", "i", "q", 0).await.unwrap_err();

        assert!(matches!(err, VectorError::Validation(_)));
    }
}
