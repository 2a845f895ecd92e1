/// Connection settings for the S3 Vectors service.
///
/// Credentials are not held here; they resolve through the standard AWS
/// SDK chain (environment, IRSA, instance profile, shared files).
#[derive(Debug, Clone, Default)]
pub struct S3VectorsConfig {
    /// Region override. Falls back to the SDK default chain when unset.
    pub region: Option<String>,
    /// Endpoint override, mainly for local stacks in integration setups.
    pub endpoint_url: Option<String>,
}

impl S3VectorsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn from_env() -> Self {
        Self {
            region: std::env::var("AWS_REGION").ok(),
            endpoint_url: std::env::var("S3_VECTORS_ENDPOINT_URL").ok(),
        }
    }
}
