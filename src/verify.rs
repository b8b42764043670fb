//! Stored blob verification
//!
//! Lists container keys and previews stored JSON packages, the quickest way
//! to confirm a `fetch --storage remote` run landed where expected.

use tracing::{error, info};

use crate::output::{BlobContainer, BlobInfo, PackageLocation, SinkError, SinkResult};
use crate::Dataset;

/// Number of characters kept in a preview
pub const PREVIEW_CHARS: usize = 1000;

/// Outcome of checking one dataset blob of a state
#[derive(Debug)]
pub struct BlobCheck {
    /// Blob key that was checked
    pub key: String,
    /// Preview text, or the reason it could not be produced
    pub result: SinkResult<String>,
}

/// Read-only view over a blob container
#[derive(Debug, Clone)]
pub struct BlobVerifier {
    container: BlobContainer,
}

impl BlobVerifier {
    /// Create a verifier over `container`
    pub fn new(container: BlobContainer) -> Self {
        Self { container }
    }

    /// Keys in the container, optionally restricted to a string prefix
    pub async fn list_blobs(&self, prefix: Option<&str>) -> SinkResult<Vec<BlobInfo>> {
        let blobs = self.container.list(prefix).await?;
        info!(
            container = self.container.name(),
            prefix = prefix.unwrap_or(""),
            count = blobs.len(),
            "Listed blobs"
        );
        Ok(blobs)
    }

    /// Pretty-printed JSON of a blob, cut to [`PREVIEW_CHARS`] characters
    /// and followed by `...`
    ///
    /// # Errors
    /// [`SinkError::Storage`] if the blob cannot be read,
    /// [`SinkError::Serialization`] if it is not JSON
    pub async fn preview_blob(&self, key: &str) -> SinkResult<String> {
        let data = self.container.get(key).await?;
        let value: serde_json::Value = serde_json::from_slice(&data)
            .map_err(|e| SinkError::Serialization(format!("{key} is not valid JSON: {e}")))?;
        let pretty = serde_json::to_string_pretty(&value)
            .map_err(|e| SinkError::Serialization(format!("Failed to format {key}: {e}")))?;
        Ok(truncate_preview(&pretty))
    }

    /// Preview the JSON blob of both datasets for a state and year
    ///
    /// Missing or unreadable blobs are logged and reported in the returned
    /// checks; they do not stop the other dataset from being checked.
    pub async fn verify_state_data(&self, state_code: &str, year: u16) -> Vec<BlobCheck> {
        let mut checks = Vec::with_capacity(Dataset::ALL.len());
        for dataset in Dataset::ALL {
            let key = PackageLocation::new(dataset, year, state_code).json_key();
            info!(key = %key, "Verifying blob");

            let result = self.preview_blob(&key).await;
            match &result {
                Ok(preview) => info!(key = %key, "Data preview:\n{}\n", preview),
                Err(e) => error!(key = %key, "Error accessing blob: {}", e),
            }
            checks.push(BlobCheck { key, result });
        }
        checks
    }
}

fn truncate_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
