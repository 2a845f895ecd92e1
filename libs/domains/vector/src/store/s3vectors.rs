//! AWS S3 Vectors adapter
//!
//! Credentials resolve through the standard SDK chain: environment
//! variables, web identity tokens (IRSA), instance profiles, or shared
//! credential files.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3vectors::Client;
use aws_sdk_s3vectors::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3vectors::types::{
    DataType, DistanceMetric as StoreMetric, PutInputVector, VectorData,
};
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::{Document, Number};
use tracing::{debug, warn};

use super::{S3VectorsConfig, VectorStore};
use crate::error::StoreError;
use crate::models::{
    DistanceMetric, IndexConfig, IndexInfo, VectorDataType, VectorMatch, VectorQuery, VectorRecord,
};

/// S3 Vectors-backed implementation of [`VectorStore`].
pub struct S3VectorsStore {
    client: Client,
}

impl S3VectorsStore {
    /// Connect using the default AWS credential chain.
    pub async fn new(config: S3VectorsConfig) -> Self {
        let mut loader = aws_config::from_env();

        if let Some(region) = config.region {
            loader = loader.region(aws_config::Region::new(region));
        }

        if let Some(endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn to_store_metric(metric: DistanceMetric) -> Result<StoreMetric, StoreError> {
        match metric {
            DistanceMetric::Cosine => Ok(StoreMetric::Cosine),
            DistanceMetric::Euclidean => Ok(StoreMetric::Euclidean),
            // The service only ranks by cosine or euclidean distance;
            // substituting a different metric would corrupt ranking.
            DistanceMetric::DotProduct => Err(StoreError::Other(
                "distance metric 'dot' is not supported by S3 Vectors".to_string(),
            )),
        }
    }

    fn to_store_data_type(data_type: VectorDataType) -> DataType {
        match data_type {
            VectorDataType::Float32 => DataType::Float32,
        }
    }
}

#[async_trait]
impl VectorStore for S3VectorsStore {
    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        self.client
            .create_vector_bucket()
            .vector_bucket_name(bucket)
            .send()
            .await
            .map_err(|e| sdk_error(format!("vector bucket '{}'", bucket), e))?;

        debug!(bucket, "vector bucket created");
        Ok(())
    }

    async fn create_index(
        &self,
        bucket: &str,
        index: &str,
        config: &IndexConfig,
    ) -> Result<(), StoreError> {
        let dimension = i32::try_from(config.dimension).map_err(|_| {
            StoreError::Other(format!("dimension {} out of range", config.dimension))
        })?;

        self.client
            .create_index()
            .vector_bucket_name(bucket)
            .index_name(index)
            .data_type(Self::to_store_data_type(config.data_type))
            .dimension(dimension)
            .distance_metric(Self::to_store_metric(config.metric)?)
            .send()
            .await
            .map_err(|e| sdk_error(format!("vector index '{}'", index), e))?;

        debug!(bucket, index, dimension, "vector index created");
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        let output = self
            .client
            .list_vector_buckets()
            .send()
            .await
            .map_err(|e| sdk_error("vector buckets".to_string(), e))?;

        Ok(output
            .vector_buckets()
            .iter()
            .map(|b| b.vector_bucket_name().to_string())
            .collect())
    }

    async fn list_indexes(&self, bucket: &str) -> Result<Vec<IndexInfo>, StoreError> {
        let output = self
            .client
            .list_indexes()
            .vector_bucket_name(bucket)
            .send()
            .await
            .map_err(|e| sdk_error(format!("indexes of bucket '{}'", bucket), e))?;

        let mut indexes = Vec::new();
        for summary in output.indexes() {
            let name = summary.index_name().to_string();

            // The list call does not carry the dimension; look it up per
            // index and tolerate failures so one bad index does not hide
            // the rest of the listing.
            let dimension = match self
                .client
                .get_index()
                .vector_bucket_name(bucket)
                .index_name(&name)
                .send()
                .await
            {
                Ok(out) => out
                    .index()
                    .and_then(|i| u32::try_from(i.dimension()).ok()),
                Err(e) => {
                    warn!(
                        bucket,
                        index = %name,
                        error = %DisplayErrorContext(&e),
                        "failed to fetch index details"
                    );
                    None
                }
            };

            indexes.push(IndexInfo { name, dimension });
        }

        Ok(indexes)
    }

    async fn put_vectors(
        &self,
        bucket: &str,
        index: &str,
        records: Vec<VectorRecord>,
    ) -> Result<(), StoreError> {
        let count = records.len();
        let mut vectors = Vec::with_capacity(count);

        for record in records {
            let vector = PutInputVector::builder()
                .key(record.key)
                .data(VectorData::Float32(record.embedding))
                .metadata(metadata_to_document(&record.metadata))
                .build()
                .map_err(|e| StoreError::Other(format!("invalid vector record: {}", e)))?;
            vectors.push(vector);
        }

        self.client
            .put_vectors()
            .vector_bucket_name(bucket)
            .index_name(index)
            .set_vectors(Some(vectors))
            .send()
            .await
            .map_err(|e| sdk_error(format!("vectors into index '{}'", index), e))?;

        debug!(bucket, index, count, "vectors inserted");
        Ok(())
    }

    async fn query_vectors(
        &self,
        bucket: &str,
        index: &str,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, StoreError> {
        let top_k = i32::try_from(query.top_k)
            .map_err(|_| StoreError::Other(format!("top_k {} out of range", query.top_k)))?;

        let output = self
            .client
            .query_vectors()
            .vector_bucket_name(bucket)
            .index_name(index)
            .query_vector(VectorData::Float32(query.vector))
            .top_k(top_k)
            .return_distance(query.return_distance)
            .return_metadata(query.return_metadata)
            .send()
            .await
            .map_err(|e| sdk_error(format!("query against index '{}'", index), e))?;

        Ok(output
            .vectors()
            .iter()
            .map(|v| VectorMatch {
                key: v.key().to_string(),
                distance: v.distance(),
                metadata: v.metadata().and_then(document_to_json),
            })
            .collect())
    }
}

/// Map a vendor failure onto the typed taxonomy.
///
/// Conflict codes and "already exists" text mean the resource is present;
/// "not ready"/"building" text means the index cannot serve queries yet.
fn classify(resource: &str, code: Option<&str>, message: &str) -> StoreError {
    let lower = message.to_ascii_lowercase();

    let conflict = matches!(code, Some(c) if c == "ConflictException" || c.ends_with("AlreadyExists"));
    if conflict || lower.contains("already exists") {
        return StoreError::AlreadyExists {
            resource: resource.to_string(),
        };
    }

    if lower.contains("not ready") || lower.contains("building") {
        return StoreError::NotReady(message.to_string());
    }

    StoreError::Other(message.to_string())
}

fn sdk_error<E, R>(resource: String, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(m) => m.to_string(),
        None => format!("{}", DisplayErrorContext(&err)),
    };

    classify(&resource, code.as_deref(), &message)
}

fn metadata_to_document(metadata: &serde_json::Value) -> Document {
    json_to_document(metadata).unwrap_or_else(|| Document::Object(HashMap::new()))
}

fn json_to_document(value: &serde_json::Value) -> Option<Document> {
    match value {
        serde_json::Value::Null => Some(Document::Null),
        serde_json::Value::Bool(b) => Some(Document::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(Document::Number(Number::PosInt(u)))
            } else if let Some(i) = n.as_i64() {
                Some(Document::Number(Number::NegInt(i)))
            } else {
                n.as_f64().map(|f| Document::Number(Number::Float(f)))
            }
        }
        serde_json::Value::String(s) => Some(Document::String(s.clone())),
        serde_json::Value::Array(items) => Some(Document::Array(
            items.iter().filter_map(json_to_document).collect(),
        )),
        serde_json::Value::Object(map) => Some(Document::Object(
            map.iter()
                .filter_map(|(k, v)| json_to_document(v).map(|d| (k.clone(), d)))
                .collect(),
        )),
    }
}

fn document_to_json(doc: &Document) -> Option<serde_json::Value> {
    match doc {
        Document::Null => Some(serde_json::Value::Null),
        Document::Bool(b) => Some(serde_json::Value::Bool(*b)),
        Document::Number(Number::PosInt(u)) => Some(serde_json::Value::Number((*u).into())),
        Document::Number(Number::NegInt(i)) => Some(serde_json::Value::Number((*i).into())),
        Document::Number(Number::Float(f)) => {
            serde_json::Number::from_f64(*f).map(serde_json::Value::Number)
        }
        Document::String(s) => Some(serde_json::Value::String(s.clone())),
        Document::Array(items) => Some(serde_json::Value::Array(
            items.iter().filter_map(document_to_json).collect(),
        )),
        Document::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                if let Some(j) = document_to_json(v) {
                    out.insert(k.clone(), j);
                }
            }
            Some(serde_json::Value::Object(out))
        }
    }
}
