use serde::{Deserialize, Serialize};
use std::env;

/// Default container (bucket) holding proof records.
pub const DEFAULT_CONTAINER: &str = "installationproofcontainer";

/// Default key prefix for proof records inside the container.
pub const DEFAULT_PATH_PREFIX: &str = "installation-proof";

/// Which implementations back the object and metadata stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible object store plus PostgreSQL metadata
    #[default]
    Durable,
    /// Process-local maps; contents are lost on restart
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "durable" | "s3" => Ok(StorageBackend::Durable),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub endpoint: Option<String>,
    pub region: String,
    pub container: String,
    pub path_prefix: String,
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::default(),
        };

        let config = Self {
            backend,
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            container: env::var("PROOF_CONTAINER").unwrap_or_else(|_| DEFAULT_CONTAINER.to_string()),
            path_prefix: env::var("PROOF_PATH_PREFIX")
                .unwrap_or_else(|_| DEFAULT_PATH_PREFIX.to_string()),
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .unwrap_or_else(|_| "minioadmin".to_string()),
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.container.trim().is_empty() {
            anyhow::bail!("Proof container name cannot be empty");
        }

        if self.path_prefix.ends_with('/') {
            anyhow::bail!(
                "Proof path prefix '{}' must not end with '/'",
                self.path_prefix
            );
        }

        Ok(())
    }

    pub fn for_minio(endpoint: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::Durable,
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            container: container.into(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            endpoint: None,
            region: "us-east-1".to_string(),
            container: DEFAULT_CONTAINER.to_string(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            path_style: false,
        }
    }
}
