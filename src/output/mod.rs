//! Package sinks
//!
//! A [`PackageSink`] persists one [`StatePackage`] at a [`PackageLocation`].
//!
//! - [`LocalJsonSink`] - pretty-printed JSON under a local root directory
//! - [`RemoteJsonSink`] - pretty-printed JSON blob in the object store
//! - [`RemoteParquetSink`] - one-row Parquet blob in the object store

use crate::StatePackage;
use async_trait::async_trait;

pub mod local;
pub mod parquet;
pub mod path;
pub mod remote;

pub use local::LocalJsonSink;
pub use path::PackageLocation;
pub use remote::{BlobContainer, BlobInfo, RemoteJsonSink, RemoteParquetSink, RemoteSinks};

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Local filesystem failure, or an empty package handed to the local sink
    #[error("IO error: {0}")]
    Io(String),

    /// Object store failure or missing connection
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Arrow schema inference or Parquet encoding failure
    #[error("columnar encoding error: {0}")]
    Columnar(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for state packages
#[async_trait]
pub trait PackageSink: Send + Sync {
    /// Short name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Persist `package` at `location`, overwriting any previous content
    async fn store(&self, package: &StatePackage, location: &PackageLocation) -> SinkResult<()>;
}
