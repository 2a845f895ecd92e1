use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EmbeddingClient;
use crate::error::{VectorError, VectorResult};
use crate::models::EmbeddingModel;

/// OpenAI embeddings API configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: EmbeddingModel,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: EmbeddingModel::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn from_env() -> VectorResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| VectorError::Config("OPENAI_API_KEY not set".to_string()))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            api_key,
            base_url,
            model: EmbeddingModel::default(),
        })
    }
}

/// Embedding client backed by the OpenAI embeddings endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> VectorResult<Self> {
        Ok(Self::new(OpenAiConfig::from_env()?))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbedder {
    fn model(&self) -> EmbeddingModel {
        self.config.model
    }

    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| VectorError::Embedding("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let dimensions = match self.config.model {
            EmbeddingModel::Custom(dim) => Some(dim),
            _ => None,
        };

        let request = EmbeddingRequest {
            model: self.config.model.model_name(),
            input: texts,
            dimensions,
        };

        debug!(count = texts.len(), model = request.model, "requesting embeddings");

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "embedding API error ({}): {}",
                status, body
            )));
        }

        let payload: EmbeddingResponse = response.json().await?;

        if payload.data.len() != texts.len() {
            return Err(VectorError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                payload.data.len()
            )));
        }

        // The API may return items out of order; restore input order.
        let mut data = payload.data;
        data.sort_by_key(|d| d.index);

        let expected = self.config.model.dimension() as usize;
        for item in &data {
            if item.embedding.len() != expected {
                return Err(VectorError::Embedding(format!(
                    "model {} returned a {}-dimensional vector, expected {}",
                    self.config.model.model_name(),
                    item.embedding.len(),
                    expected
                )));
            }
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, EmbeddingModel::TextEmbedding3Large);
    }

    #[test]
    fn test_config_builders() {
        let config = OpenAiConfig::new("sk-test")
            .with_base_url("http://localhost:8080/v1")
            .with_model(EmbeddingModel::TextEmbedding3Small);
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model.dimension(), 1536);
    }

    #[tokio::test]
    async fn test_embed_batch_short_circuits_on_empty_input() {
        // An unroutable base URL: any network call would fail the test.
        let embedder = OpenAiEmbedder::new(
            OpenAiConfig::new("sk-test").with_base_url("http://127.0.0.1:1"),
        );

        let vectors = embedder.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[test]
    fn test_request_omits_dimensions_for_named_models() {
        let request = EmbeddingRequest {
            model: "text-embedding-3-large",
            input: &[],
            dimensions: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("dimensions").is_none());
    }
}
