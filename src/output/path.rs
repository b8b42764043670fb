//! Storage layout for state packages
//!
//! Local files and remote blobs share one hierarchy:
//! `{dataset}/{year}/{state}/{state}_data.{ext}`
//!
//! - local JSON: `{root}/fair_market_rents/2024/TX/TX_data.json`
//! - remote JSON: `fair_market_rents/2024/TX/TX_data.json`
//! - remote Parquet: `fair_market_rents_parquet/2024/TX/TX_data.parquet`
//!
//! # Usage Example
//!
//! ```rust
//! use housing_data_pipeline::output::PackageLocation;
//! use housing_data_pipeline::Dataset;
//! use std::path::Path;
//!
//! let location = PackageLocation::new(Dataset::IncomeLimits, 2024, "CA");
//! assert_eq!(location.json_key(), "income_limits/2024/CA/CA_data.json");
//! assert_eq!(
//!     location.local_path(Path::new("data")),
//!     Path::new("data/income_limits/2024/CA/CA_data.json")
//! );
//! ```

use crate::Dataset;
use std::path::{Path, PathBuf};

/// Suffix appended to the dataset directory of columnar blobs
const PARQUET_DIR_SUFFIX: &str = "_parquet";

/// Where one (dataset, year, state) package is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    dataset: Dataset,
    year: u16,
    state: String,
}

impl PackageLocation {
    /// Create a location
    ///
    /// The state code is sanitized so it cannot escape its directory:
    /// `/`, `\`, `:` become `_` and `..` becomes `__`.
    pub fn new(dataset: Dataset, year: u16, state: &str) -> Self {
        Self {
            dataset,
            year,
            state: sanitize_state(state),
        }
    }

    /// Dataset of the package
    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    /// Publication year
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Sanitized state code
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Path of the JSON file under a local root directory
    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(self.dataset.name())
            .join(self.year.to_string())
            .join(&self.state)
            .join(self.file_name("json"))
    }

    /// Blob key of the JSON package
    pub fn json_key(&self) -> String {
        self.key(self.dataset.name(), "json")
    }

    /// Blob key of the Parquet package
    pub fn parquet_key(&self) -> String {
        let dir = format!("{}{}", self.dataset.name(), PARQUET_DIR_SUFFIX);
        self.key(&dir, "parquet")
    }

    fn key(&self, dataset_dir: &str, extension: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            dataset_dir,
            self.year,
            self.state,
            self.file_name(extension)
        )
    }

    fn file_name(&self, extension: &str) -> String {
        format!("{}_data.{}", self.state, extension)
    }
}

impl std::fmt::Display for PackageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.dataset, self.year, self.state)
    }
}

/// Replace path separators and parent references in a state code
fn sanitize_state(state: &str) -> String {
    state.trim().replace("..", "__").replace(['/', '\\', ':'], "_")
}
