//! CLI configuration file handling.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use subdns_core::{CoreError, CoreResult, RegistryConfig};

/// Configuration for one registry instance, loaded from a JSON file.
///
/// ```json
/// {
///     "zone_name": "example.com",
///     "zone_id": "023e105f4ecef8ad9ca31a8372d0c353",
///     "reserved_labels": ["www", "mail"],
///     "state_dir": "/var/lib/subdns",
///     "min_account_age_days": 30
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Registry settings, flattened into the top level of the file.
    #[serde(flatten)]
    pub registry: RegistryConfig,
    /// Where allocations and the deployment log live. Defaults to the
    /// platform data directory.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    /// GitHub accounts younger than this are rejected.
    #[serde(default = "default_min_account_age_days")]
    pub min_account_age_days: i64,
}

fn default_min_account_age_days() -> i64 {
    30
}

impl CliConfig {
    /// Reads and parses the configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::StorageError(format!("failed to read config {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CoreError::SerializationError(format!("invalid config {}: {e}", path.display()))
        })
    }

    /// Resolved state directory.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("subdns")
        })
    }
}
