//! Readiness polling for a freshly created index.
//!
//! The storage service offers no push-based readiness signal, so the
//! prober issues synthetic queries and interprets the failures.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::VectorQuery;
use crate::store::VectorStore;

/// Value every component of the synthetic probe vector carries.
const PROBE_FILL: f32 = 0.1;

/// Polling policy: bounded attempts with a fixed delay in between.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval: Duration::from_secs(30),
        }
    }
}

/// What a probe learned about the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The index answered a query.
    Ready,
    /// The index reported it is still building.
    NotReady,
    /// The probe failed for an unrelated reason. Policy is to assume
    /// ready and proceed rather than block the run.
    Indeterminate,
}

/// Decides when a provisioned index can serve queries.
pub struct ReadinessProber {
    store: Arc<dyn VectorStore>,
    config: ProbeConfig,
}

impl ReadinessProber {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            config: ProbeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    /// Issue one synthetic top-1 query against the index.
    pub async fn probe_once(&self, bucket: &str, index: &str, dimension: u32) -> ProbeOutcome {
        let probe = vec![PROBE_FILL; dimension as usize];

        match self
            .store
            .query_vectors(bucket, index, VectorQuery::new(probe, 1))
            .await
        {
            Ok(_) => ProbeOutcome::Ready,
            Err(StoreError::NotReady(reason)) => {
                debug!(bucket, index, %reason, "index still building");
                ProbeOutcome::NotReady
            }
            Err(e) => {
                warn!(
                    bucket,
                    index,
                    error = %e,
                    "probe failed for an unrelated reason, proceeding anyway"
                );
                ProbeOutcome::Indeterminate
            }
        }
    }

    /// Poll until the index answers, up to the configured attempt bound.
    ///
    /// Never fails: exhausting the attempts (or an indeterminate probe)
    /// returns the last outcome and lets the caller proceed. Callers that
    /// need a hard guarantee must layer their own policy on top.
    pub async fn wait_until_ready(&self, bucket: &str, index: &str, dimension: u32) -> ProbeOutcome {
        for attempt in 1..=self.config.max_attempts {
            match self.probe_once(bucket, index, dimension).await {
                ProbeOutcome::Ready => {
                    info!(bucket, index, attempt, "index is ready for queries");
                    return ProbeOutcome::Ready;
                }
                ProbeOutcome::Indeterminate => return ProbeOutcome::Indeterminate,
                ProbeOutcome::NotReady if attempt < self.config.max_attempts => {
                    info!(
                        bucket,
                        index,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        interval_secs = self.config.interval.as_secs(),
                        "index still building, will retry"
                    );
                    tokio::time::sleep(self.config.interval).await;
                }
                ProbeOutcome::NotReady => {}
            }
        }

        warn!(
            bucket,
            index,
            attempts = self.config.max_attempts,
            "index never reported ready, proceeding anyway"
        );
        ProbeOutcome::NotReady
    }
}
