//! Report records emitted by the quota comparator.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::quota::ClientQuota;
use super::usage::UsageTotals;

// ============================================================================
// Report Mode
// ============================================================================

/// Which comparison branch produced a report record.
///
/// Exactly one branch applies per client: a configured quota always wins;
/// without one, the wording depends on whether the report is tag-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportMode {
    /// A quota exists for the client; usage and remaining are both reported.
    #[serde(rename = "Usage vs Quota")]
    UsageVsQuota,
    /// Overall mode without any configured quota.
    #[serde(rename = "Usage Only (No Quota Defined)")]
    UsageOnlyNoQuotaDefined,
    /// Tag mode, but no quota is configured for this client.
    #[serde(rename = "Usage Only (No Quota for Client)")]
    UsageOnlyNoQuotaForClient,
}

impl ReportMode {
    /// Returns the display label for this mode.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UsageVsQuota => "Usage vs Quota",
            Self::UsageOnlyNoQuotaDefined => "Usage Only (No Quota Defined)",
            Self::UsageOnlyNoQuotaForClient => "Usage Only (No Quota for Client)",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Remaining
// ============================================================================

/// Per-metric headroom: `quota - used`.
///
/// Negative values signal over-quota consumption and are reported as such.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Remaining {
    /// Remaining vCPU-hours.
    pub core_hours: f64,
    /// Remaining outbound data transfer in GB.
    pub data_out_gb: f64,
    /// Remaining inbound data transfer in GB.
    pub data_in_gb: f64,
    /// Remaining disk storage in GB.
    pub disk_storage_gb: f64,
    /// Remaining blob storage in GB.
    pub blob_storage_gb: f64,
}

impl Remaining {
    /// Computes `quota - used` for every metric.
    pub fn between(quota: &ClientQuota, used: &UsageTotals) -> Self {
        Self {
            core_hours: quota.core_hours - used.core_hours,
            data_out_gb: quota.data_out_gb - used.data_out_gb,
            data_in_gb: quota.data_in_gb - used.data_in_gb,
            disk_storage_gb: quota.disk_storage_gb - used.disk_storage_gb,
            blob_storage_gb: quota.blob_storage_gb - used.blob_storage_gb,
        }
    }

    /// Returns true if any metric is over quota.
    pub fn any_over_quota(&self) -> bool {
        self.core_hours < 0.0
            || self.data_out_gb < 0.0
            || self.data_in_gb < 0.0
            || self.disk_storage_gb < 0.0
            || self.blob_storage_gb < 0.0
    }
}

// ============================================================================
// Report Record
// ============================================================================

/// One report line per client present in the usage accumulation.
///
/// Values retain full precision; rounding to two decimals happens at
/// presentation time only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Client key.
    pub client: String,
    /// Comparison branch.
    pub mode: ReportMode,
    /// Accumulated usage for the client.
    pub usage: UsageTotals,
    /// Configured quota, present in [`ReportMode::UsageVsQuota`] only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<ClientQuota>,
    /// Per-metric headroom, present in [`ReportMode::UsageVsQuota`] only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Remaining>,
}

impl ReportRecord {
    /// Creates a usage-only record for a client without a quota.
    pub fn usage_only(client: impl Into<String>, usage: UsageTotals, mode: ReportMode) -> Self {
        Self {
            client: client.into(),
            mode,
            usage,
            quota: None,
            remaining: None,
        }
    }

    /// Creates a full comparison record for a client with a quota.
    pub fn with_quota(client: impl Into<String>, usage: UsageTotals, quota: ClientQuota) -> Self {
        let remaining = Remaining::between(&quota, &usage);
        Self {
            client: client.into(),
            mode: ReportMode::UsageVsQuota,
            usage,
            quota: Some(quota),
            remaining: Some(remaining),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
