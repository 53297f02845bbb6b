//! Quota configuration.
//!
//! Quotas are static per-client configuration, loaded from a YAML file and
//! never derived from live data. A missing file is not an error: the report
//! simply runs in usage-only mode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use quotascope_core::ClientQuota;

use crate::error::ReportError;

/// Per-client quota configuration.
///
/// ```yaml
/// clients:
///   ClientA-Prod:
///     core_hours: 10000
///     data_out_gb: 100
///     data_in_gb: 500
///     disk_storage_gb: 1000
///     blob_storage_gb: 500
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaBook {
    /// Client key → configured ceilings.
    #[serde(default)]
    pub clients: BTreeMap<String, ClientQuota>,
}

impl QuotaBook {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quotascope")
            .join("quotas.yaml")
    }

    /// Loads quotas from the default path.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self, ReportError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads quotas from a specific path. A missing file yields an empty
    /// book.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load_from(path: &Path) -> Result<Self, ReportError> {
        if !path.exists() {
            debug!(path = %path.display(), "Quota file not found, using empty book");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let book: Self = serde_yaml::from_str(&content)?;

        info!(
            path = %path.display(),
            clients = book.clients.len(),
            "Loaded quota configuration"
        );
        Ok(book)
    }

    /// Saves quotas to a specific path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "Saved quota configuration");
        Ok(())
    }

    /// Returns the quota for a client, if configured.
    pub fn get(&self, client: &str) -> Option<&ClientQuota> {
        self.clients.get(client)
    }

    /// Inserts or replaces a client's quota.
    pub fn insert(&mut self, client: impl Into<String>, quota: ClientQuota) {
        self.clients.insert(client.into(), quota);
    }

    /// Number of configured clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no quota is configured.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_empty_book() {
        let dir = tempfile::tempdir().unwrap();
        let book = QuotaBook::load_from(&dir.path().join("missing.yaml")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quotas.yaml");

        let mut book = QuotaBook::default();
        book.insert(
            "ClientA-Prod",
            ClientQuota {
                core_hours: 10000.0,
                data_out_gb: 100.0,
                data_in_gb: 500.0,
                disk_storage_gb: 1000.0,
                blob_storage_gb: 500.0,
            },
        );
        book.save_to(&path).unwrap();

        let loaded = QuotaBook::load_from(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("ClientA-Prod").unwrap().core_hours, 10000.0);
    }

    #[test]
    fn test_parse_partial_quota() {
        let yaml = r"
clients:
  ClientB:
    core_hours: 2000
";
        let book: QuotaBook = serde_yaml::from_str(yaml).unwrap();
        let quota = book.get("ClientB").unwrap();
        assert_eq!(quota.core_hours, 2000.0);
        assert_eq!(quota.data_out_gb, 0.0);
    }

    #[test]
    fn test_default_path_under_config_dir() {
        let path = QuotaBook::default_path();
        assert!(path.to_string_lossy().contains("quotascope"));
    }
}
