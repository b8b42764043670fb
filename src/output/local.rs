//! Local JSON sink

use async_trait::async_trait;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{PackageLocation, PackageSink, SinkError, SinkResult};
use crate::StatePackage;

/// Default local root directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Writes packages as pretty-printed JSON files below a root directory
#[derive(Debug, Clone)]
pub struct LocalJsonSink {
    root: PathBuf,
}

impl LocalJsonSink {
    /// Create a sink rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path a package is written to
    pub fn path_for(&self, location: &PackageLocation) -> PathBuf {
        location.local_path(&self.root)
    }

    /// Write a package, creating parent directories as needed
    ///
    /// # Errors
    /// [`SinkError::Io`] if the package is empty or the file cannot be written
    pub fn write_package(&self, package: &StatePackage, location: &PackageLocation) -> SinkResult<PathBuf> {
        if package.is_empty() {
            return Err(SinkError::Io(format!(
                "No data provided for {}",
                location.dataset()
            )));
        }

        let path = self.path_for(location);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SinkError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = File::create(&path)
            .map_err(|e| SinkError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, package)
            .map_err(|e| SinkError::Serialization(format!("Failed to encode package: {e}")))?;
        writer
            .flush()
            .map_err(|e| SinkError::Io(format!("Failed to flush {}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Saved package locally");
        Ok(path)
    }

    /// Read back a package written by [`write_package`](Self::write_package)
    pub fn read_package(&self, location: &PackageLocation) -> SinkResult<StatePackage> {
        let path = self.path_for(location);
        let file = File::open(&path)
            .map_err(|e| SinkError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SinkError::Serialization(format!("Failed to decode {}: {}", path.display(), e))
        })
    }
}

impl Default for LocalJsonSink {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[async_trait]
impl PackageSink for LocalJsonSink {
    fn name(&self) -> &'static str {
        "local_json"
    }

    async fn store(&self, package: &StatePackage, location: &PackageLocation) -> SinkResult<()> {
        self.write_package(package, location).map(|_| ())
    }
}
