//! Per-client quota configuration.

use serde::{Deserialize, Serialize};

/// Configured ceilings for one client.
///
/// Quotas are static configuration, keyed by the same client-key domain as
/// usage accumulation but populated independently; the two key sets may
/// diverge. Metrics without a configured ceiling default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientQuota {
    /// Ceiling on vCPU-hours.
    #[serde(default)]
    pub core_hours: f64,
    /// Ceiling on outbound data transfer in GB.
    #[serde(default)]
    pub data_out_gb: f64,
    /// Ceiling on inbound data transfer in GB.
    #[serde(default)]
    pub data_in_gb: f64,
    /// Ceiling on disk storage in GB.
    #[serde(default)]
    pub disk_storage_gb: f64,
    /// Ceiling on blob storage in GB.
    #[serde(default)]
    pub blob_storage_gb: f64,
}

// ============================================================================
// Tests
// ============================================================================
