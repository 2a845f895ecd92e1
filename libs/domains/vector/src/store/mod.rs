mod config;
mod s3vectors;

pub use config::S3VectorsConfig;
pub use s3vectors::S3VectorsStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{IndexConfig, IndexInfo, VectorMatch, VectorQuery, VectorRecord};

/// Contract the pipeline drives the vector storage service through.
///
/// Implementations classify vendor failures into [`StoreError`] variants
/// at this boundary; callers never see raw service errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a vector bucket.
    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// Create a vector index inside a bucket.
    async fn create_index(
        &self,
        bucket: &str,
        index: &str,
        config: &IndexConfig,
    ) -> Result<(), StoreError>;

    /// List all vector buckets.
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError>;

    /// List the indexes of a bucket.
    async fn list_indexes(&self, bucket: &str) -> Result<Vec<IndexInfo>, StoreError>;

    /// Bulk-insert vector records. One wire call for the whole batch.
    async fn put_vectors(
        &self,
        bucket: &str,
        index: &str,
        records: Vec<VectorRecord>,
    ) -> Result<(), StoreError>;

    /// Run a similarity query. Results come back nearest first.
    async fn query_vectors(
        &self,
        bucket: &str,
        index: &str,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, StoreError>;
}
