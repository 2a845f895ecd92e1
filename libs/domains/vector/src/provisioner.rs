//! Idempotent provisioning of the bucket/index pair.

use std::sync::Arc;

use tracing::info;

use crate::error::{StoreError, VectorError, VectorResult};
use crate::models::IndexConfig;
use crate::store::VectorStore;

/// Creates the bucket and index a deployment needs, treating resources
/// that already exist as success.
pub struct Provisioner {
    store: Arc<dyn VectorStore>,
}

impl Provisioner {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Create the named vector bucket, or reuse it when it already exists.
    ///
    /// Safe to call repeatedly; only a creation failure other than
    /// "already exists" is an error.
    pub async fn ensure_bucket(&self, bucket: &str) -> VectorResult<()> {
        if bucket.is_empty() {
            return Err(VectorError::Validation(
                "bucket name must not be empty".to_string(),
            ));
        }

        match self.store.create_bucket(bucket).await {
            Ok(()) => {
                info!(bucket, "vector bucket created");
                Ok(())
            }
            Err(StoreError::AlreadyExists { .. }) => {
                info!(bucket, "vector bucket already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create the named index inside the bucket, or reuse it.
    ///
    /// The index may still be building when this returns; readiness is
    /// the prober's concern.
    pub async fn ensure_index(
        &self,
        bucket: &str,
        index: &str,
        config: &IndexConfig,
    ) -> VectorResult<()> {
        if bucket.is_empty() || index.is_empty() {
            return Err(VectorError::Validation(
                "bucket and index names must not be empty".to_string(),
            ));
        }

        if config.dimension == 0 {
            return Err(VectorError::Validation(
                "index dimension must be at least 1".to_string(),
            ));
        }

        match self.store.create_index(bucket, index, config).await {
            Ok(()) => {
                info!(
                    bucket,
                    index,
                    dimension = config.dimension,
                    metric = config.metric.as_str(),
                    "vector index created"
                );
                Ok(())
            }
            Err(StoreError::AlreadyExists { .. }) => {
                info!(bucket, index, "vector index already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockVectorStore;

    #[tokio::test]
    async fn test_ensure_bucket_creates() {
        let mut store = MockVectorStore::new();
        store
            .expect_create_bucket()
            .times(1)
            .returning(|_| Ok(()));

        let provisioner = Provisioner::new(Arc::new(store));
        provisioner.ensure_bucket("demo-bucket").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_bucket_absorbs_already_exists() {
        let mut store = MockVectorStore::new();
        store.expect_create_bucket().times(1).returning(|bucket| {
            Err(StoreError::AlreadyExists {
                resource: format!("vector bucket '{}'", bucket),
            })
        });

        let provisioner = Provisioner::new(Arc::new(store));
        provisioner.ensure_bucket("demo-bucket").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_bucket_propagates_other_errors() {
        let mut store = MockVectorStore::new();
        store
            .expect_create_bucket()
            .returning(|_| Err(StoreError::Other("access denied".to_string())));

        let provisioner = Provisioner::new(Arc::new(store));
        let err = provisioner.ensure_bucket("demo-bucket").await.unwrap_err();
        assert!(matches!(err, VectorError::Store(StoreError::Other(_))));
    }

    #[tokio::test]
    async fn test_ensure_bucket_rejects_empty_name() {
        let store = MockVectorStore::new();
        let provisioner = Provisioner::new(Arc::new(store));
        let err = provisioner.ensure_bucket("").await.unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_ensure_index_absorbs_already_exists() {
        let mut store = MockVectorStore::new();
        store
            .expect_create_index()
            .times(1)
            .withf(|bucket, index, config| {
                bucket == "demo-bucket" && index == "embeddings-index" && config.dimension == 3072
            })
            .returning(|_, index, _| {
                Err(StoreError::AlreadyExists {
                    resource: format!("vector index '{}'", index),
                })
            });

        let provisioner = Provisioner::new(Arc::new(store));
        provisioner
            .ensure_index("demo-bucket", "embeddings-index", &IndexConfig::new(3072))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ensure_index_rejects_zero_dimension() {
        let store = MockVectorStore::new();
        let provisioner = Provisioner::new(Arc::new(store));
        let err = provisioner
            .ensure_index("demo-bucket", "embeddings-index", &IndexConfig::new(0))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));
    }
}
