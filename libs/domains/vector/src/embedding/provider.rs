use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::EmbeddingModel;

/// Trait for the external embedding service.
///
/// A client embeds with exactly one model, so every vector it returns has
/// that model's fixed dimension.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// The model this client embeds with.
    fn model(&self) -> EmbeddingModel;

    /// Embed a single text (batch of one).
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>>;

    /// Embed a batch of texts, one vector per text in matching order.
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;
}
