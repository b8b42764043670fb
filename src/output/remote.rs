//! Remote sinks backed by an object store container

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::parquet::encode_package;
use super::{PackageLocation, PackageSink, SinkError, SinkResult};
use crate::config::{ConfigError, ConnectionString};
use crate::StatePackage;

/// Stored blob as reported by [`BlobContainer::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Full blob key
    pub key: String,
    /// Size in bytes
    pub size: usize,
}

/// Named container in an object store
#[derive(Clone)]
pub struct BlobContainer {
    store: Arc<dyn ObjectStore>,
    name: String,
}

impl BlobContainer {
    /// Wrap an existing store
    pub fn new(store: Arc<dyn ObjectStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// Connect to an Azure Blob Storage container
    ///
    /// # Errors
    /// [`ConfigError::Storage`] if the client cannot be built from the connection string
    pub fn from_connection(
        connection: &ConnectionString,
        container: &str,
    ) -> Result<Self, ConfigError> {
        let mut builder = MicrosoftAzureBuilder::new().with_container_name(container);

        if connection.use_development_storage {
            builder = builder.with_use_emulator(true);
        }
        if let Some(account) = &connection.account_name {
            builder = builder.with_account(account);
        }
        if let Some(key) = &connection.account_key {
            builder = builder.with_access_key(key);
        }
        if let Some(endpoint) = connection.custom_blob_endpoint() {
            builder = builder
                .with_allow_http(endpoint.starts_with("http://"))
                .with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| ConfigError::Storage(format!("Failed to build blob client: {e}")))?;
        Ok(Self::new(Arc::new(store), container))
    }

    /// Container backed by process memory
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), name)
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upload `data` under `key`, replacing any existing blob
    pub async fn put(&self, key: &str, data: impl Into<Bytes>) -> SinkResult<()> {
        let payload = PutPayload::from(data.into());
        self.store
            .put(&ObjectPath::from(key), payload)
            .await
            .map_err(|e| SinkError::Storage(format!("Failed to upload {}/{}: {}", self.name, key, e)))?;
        Ok(())
    }

    /// Download the blob stored under `key`
    pub async fn get(&self, key: &str) -> SinkResult<Bytes> {
        let result = self
            .store
            .get(&ObjectPath::from(key))
            .await
            .map_err(|e| SinkError::Storage(format!("Failed to read {}/{}: {}", self.name, key, e)))?;
        result
            .bytes()
            .await
            .map_err(|e| SinkError::Storage(format!("Failed to read {}/{}: {}", self.name, key, e)))
    }

    /// List blobs whose key starts with `prefix`, sorted by key
    ///
    /// The prefix is matched as a plain string, so `fair_market` matches
    /// both `fair_market_rents/...` and `fair_market_rents_parquet/...`.
    pub async fn list(&self, prefix: Option<&str>) -> SinkResult<Vec<BlobInfo>> {
        let objects: Vec<_> = self
            .store
            .list(None)
            .try_collect()
            .await
            .map_err(|e| SinkError::Storage(format!("Failed to list {}: {}", self.name, e)))?;

        let mut blobs: Vec<BlobInfo> = objects
            .into_iter()
            .map(|meta| BlobInfo {
                key: meta.location.to_string(),
                size: meta.size,
            })
            .filter(|blob| prefix.map_or(true, |p| blob.key.starts_with(p)))
            .collect();
        blobs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(blobs)
    }
}

impl fmt::Debug for BlobContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobContainer")
            .field("store", &self.store.to_string())
            .field("name", &self.name)
            .finish()
    }
}

fn not_connected() -> SinkError {
    SinkError::Storage("Azure connection not set".to_string())
}

/// Writes packages as pretty-printed JSON blobs
#[derive(Debug, Clone, Default)]
pub struct RemoteJsonSink {
    container: Option<BlobContainer>,
}

impl RemoteJsonSink {
    /// Sink writing into `container`
    pub fn new(container: BlobContainer) -> Self {
        Self {
            container: Some(container),
        }
    }

    /// Sink without a connection; every store fails with [`SinkError::Storage`]
    pub fn disconnected() -> Self {
        Self { container: None }
    }
}

#[async_trait]
impl PackageSink for RemoteJsonSink {
    fn name(&self) -> &'static str {
        "remote_json"
    }

    async fn store(&self, package: &StatePackage, location: &PackageLocation) -> SinkResult<()> {
        let container = self.container.as_ref().ok_or_else(not_connected)?;
        let body = serde_json::to_vec_pretty(package)
            .map_err(|e| SinkError::Serialization(format!("Failed to encode package: {e}")))?;

        let key = location.json_key();
        container.put(&key, body).await?;
        info!(container = container.name(), key = %key, "Saved JSON blob");
        Ok(())
    }
}

/// Writes packages as single-row Parquet blobs
#[derive(Debug, Clone, Default)]
pub struct RemoteParquetSink {
    container: Option<BlobContainer>,
}

impl RemoteParquetSink {
    /// Sink writing into `container`
    pub fn new(container: BlobContainer) -> Self {
        Self {
            container: Some(container),
        }
    }

    /// Sink without a connection; every store fails with [`SinkError::Storage`]
    pub fn disconnected() -> Self {
        Self { container: None }
    }
}

#[async_trait]
impl PackageSink for RemoteParquetSink {
    fn name(&self) -> &'static str {
        "remote_parquet"
    }

    async fn store(&self, package: &StatePackage, location: &PackageLocation) -> SinkResult<()> {
        let container = self.container.as_ref().ok_or_else(not_connected)?;
        let body = encode_package(package)?;

        let key = location.parquet_key();
        container.put(&key, body).await?;
        info!(container = container.name(), key = %key, "Saved Parquet blob");
        Ok(())
    }
}

/// The two remote sinks, sharing one container
#[derive(Debug, Clone, Default)]
pub struct RemoteSinks {
    /// JSON blob sink
    pub json: RemoteJsonSink,
    /// Parquet blob sink
    pub parquet: RemoteParquetSink,
}

impl RemoteSinks {
    /// Both sinks writing into `container`
    pub fn connected(container: BlobContainer) -> Self {
        Self {
            json: RemoteJsonSink::new(container.clone()),
            parquet: RemoteParquetSink::new(container),
        }
    }

    /// Both sinks without a connection
    pub fn disconnected() -> Self {
        Self::default()
    }
}
