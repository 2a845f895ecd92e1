use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VectorError;

/// Metadata field holding the source text of a stored vector.
///
/// Ingestion writes it so query results can show what was stored.
pub const ORIGINAL_TEXT_FIELD: &str = "original_text";

/// Distance metric for similarity ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::DotProduct => "dot",
        }
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "dot" => Ok(DistanceMetric::DotProduct),
            other => Err(VectorError::Validation(format!(
                "unknown distance metric '{}'",
                other
            ))),
        }
    }
}

/// Element type of stored vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VectorDataType {
    #[default]
    Float32,
}

impl VectorDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorDataType::Float32 => "float32",
        }
    }
}

/// Vector index configuration
///
/// The dimension must equal the embedding model's output length for every
/// vector ever inserted; the storage service hard-errors on mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub dimension: u32,
    pub metric: DistanceMetric,
    pub data_type: VectorDataType,
}

impl IndexConfig {
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension,
            metric: DistanceMetric::default(),
            data_type: VectorDataType::default(),
        }
    }

    /// Configuration sized for an embedding model's output.
    pub fn for_model(model: EmbeddingModel) -> Self {
        Self::new(model.dimension())
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }
}

/// Index name and dimension as reported by the storage service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub dimension: Option<u32>,
}

/// A vector with its metadata payload, as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub key: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

impl VectorRecord {
    /// Create a record with a freshly generated key.
    ///
    /// Keys are random, never derived from content: inserting the same
    /// text twice yields two distinct records.
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            key: Uuid::new_v4().to_string(),
            embedding,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Similarity query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: u32,
    pub return_distance: bool,
    pub return_metadata: bool,
}

impl VectorQuery {
    pub fn new(vector: Vec<f32>, top_k: u32) -> Self {
        Self {
            vector,
            top_k,
            return_distance: true,
            return_metadata: true,
        }
    }
}

/// Raw match returned by the storage service, nearest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub key: String,
    pub distance: Option<f32>,
    pub metadata: Option<serde_json::Value>,
}

/// Display form of a match: the stored text plus its distance
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub key: String,
    pub text: String,
    pub distance: Option<f32>,
    pub metadata: Option<serde_json::Value>,
}

impl SearchHit {
    /// Distance to four decimal places, or `n/a` when the service did not
    /// return one.
    pub fn distance_display(&self) -> String {
        match self.distance {
            Some(d) => format!("{:.4}", d),
            None => "n/a".to_string(),
        }
    }
}

/// Embedding model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingModel {
    /// OpenAI text-embedding-3-small (1536 dimensions)
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
    /// OpenAI text-embedding-ada-002 (1536 dimensions, legacy)
    TextEmbeddingAda002,
    /// Custom model with a caller-specified dimension
    Custom(u32),
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        EmbeddingModel::TextEmbedding3Large
    }
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::TextEmbeddingAda002 => 1536,
            EmbeddingModel::Custom(dim) => *dim,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
            EmbeddingModel::Custom(_) => "custom",
        }
    }
}

impl std::str::FromStr for EmbeddingModel {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text-embedding-3-small" => Ok(EmbeddingModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(EmbeddingModel::TextEmbedding3Large),
            "text-embedding-ada-002" => Ok(EmbeddingModel::TextEmbeddingAda002),
            other => Err(VectorError::Validation(format!(
                "unknown embedding model '{}'",
                other
            ))),
        }
    }
}
