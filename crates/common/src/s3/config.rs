use serde::{Deserialize, Serialize};

/// S3 bucket configuration for photo storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Endpoint override for S3-compatible services; switches public URLs to path style
    pub endpoint: Option<String>,
}
