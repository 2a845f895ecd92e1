//! Batched embedding and bulk insert of text documents.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::embedding::EmbeddingClient;
use crate::error::{VectorError, VectorResult};
use crate::models::{ORIGINAL_TEXT_FIELD, VectorRecord};
use crate::store::VectorStore;

/// Outcome of one ingestion batch.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub keys: Vec<String>,
}

/// Turns raw texts into stored vector records.
pub struct IngestionPipeline {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedder }
    }

    /// Embed `texts` in one batch and insert them with one bulk call.
    ///
    /// Each record gets a fresh key and the template metadata plus the
    /// text itself under `original_text`, so query results can show what
    /// was stored. An empty batch is a no-op: neither the embedding
    /// service nor the store is called.
    pub async fn ingest(
        &self,
        bucket: &str,
        index: &str,
        texts: &[String],
        metadata_template: &Value,
    ) -> VectorResult<InsertOutcome> {
        if texts.is_empty() {
            debug!(bucket, index, "nothing to ingest");
            return Ok(InsertOutcome {
                inserted: 0,
                keys: Vec::new(),
            });
        }

        let embeddings = self.embedder.embed_batch(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(VectorError::Embedding(format!(
                "embedding service returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        let records: Vec<VectorRecord> = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| {
                VectorRecord::new(embedding).with_metadata(record_metadata(metadata_template, text))
            })
            .collect();
        let keys: Vec<String> = records.iter().map(|r| r.key.clone()).collect();

        self.store.put_vectors(bucket, index, records).await?;

        info!(bucket, index, inserted = keys.len(), "vectors ingested");
        Ok(InsertOutcome {
            inserted: keys.len(),
            keys,
        })
    }
}

/// Template metadata plus the text under [`ORIGINAL_TEXT_FIELD`].
fn record_metadata(template: &Value, text: &str) -> Value {
    let mut map = match template {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    map.insert(
        ORIGINAL_TEXT_FIELD.to_string(),
        Value::String(text.to_string()),
    );
    Value::Object(map)
}
