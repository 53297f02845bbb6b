//! Canonical usage rows and per-client accumulation.
//!
//! Every acquisition source normalizes its native record shape into
//! [`UsageRow`]; the aggregator folds rows into [`ClientUsage`]. Client keys
//! are assigned through [`ClientKeyPolicy`] so that tag-based and overall
//! reporting share one code path.

use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};

/// The resource tag that names the owning client.
pub const CLIENT_TAG: &str = "Client";

/// Sentinel client key for rows without a client tag in tag mode.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Meter category for compute usage.
pub const METER_VIRTUAL_MACHINES: &str = "Virtual Machines";

/// Meter category for storage usage.
pub const METER_STORAGE: &str = "Storage";

/// Meter category for data transfer usage.
pub const METER_NETWORKING: &str = "Networking";

// ============================================================================
// Usage Row
// ============================================================================

/// The canonical usage record.
///
/// This is the contract every data source must normalize into; no
/// source-specific shape crosses the normalization boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRow {
    /// Resource group the usage was billed against.
    pub resource_group: String,
    /// Client key this row belongs to (never empty).
    pub client: String,
    /// Billing meter category (e.g., "Virtual Machines", "Storage").
    pub meter_category: String,
    /// Billing meter sub-category (e.g., a VM size, "Standard SSD").
    pub meter_subcategory: String,
    /// Resource type of the billed resource.
    pub resource_type: String,
    /// Service name that consumed the usage.
    pub service: String,
    /// Usage quantity in the meter's unit (non-negative).
    pub quantity: f64,
    /// True for rows synthesized from the inventory.
    #[serde(default)]
    pub estimated: bool,
}

// ============================================================================
// Usage Totals
// ============================================================================

/// Accumulated metrics for one client.
///
/// Each field is a running sum seeded at zero; accumulation never subtracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    /// vCPU-hours of compute.
    pub core_hours: f64,
    /// Outbound data transfer in GB.
    pub data_out_gb: f64,
    /// Inbound data transfer in GB.
    pub data_in_gb: f64,
    /// Managed/unmanaged disk storage in GB.
    pub disk_storage_gb: f64,
    /// Blob/object storage in GB.
    pub blob_storage_gb: f64,
}

impl UsageTotals {
    /// Returns true if every metric is zero.
    pub fn is_zero(&self) -> bool {
        self.core_hours == 0.0
            && self.data_out_gb == 0.0
            && self.data_in_gb == 0.0
            && self.disk_storage_gb == 0.0
            && self.blob_storage_gb == 0.0
    }
}

// ============================================================================
// Client Usage
// ============================================================================

/// Per-client usage accumulation: client key → [`UsageTotals`].
///
/// Built by a single aggregation pass and read-only afterwards. Keys are
/// case-sensitive and never empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUsage(BTreeMap<String, UsageTotals>);

impl ClientUsage {
    /// Creates an empty accumulation.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the accumulator for a client, seeding zeros on first use.
    pub fn totals_mut(&mut self, client: &str) -> &mut UsageTotals {
        self.0.entry(client.to_string()).or_default()
    }

    /// Returns the totals for a client, if any rows referenced it.
    pub fn get(&self, client: &str) -> Option<&UsageTotals> {
        self.0.get(client)
    }

    /// Iterates clients and their totals in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, UsageTotals> {
        self.0.iter()
    }

    /// Number of clients seen.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no client has been referenced.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ClientUsage {
    type Item = (&'a String, &'a UsageTotals);
    type IntoIter = btree_map::Iter<'a, String, UsageTotals>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Client Key Policy
// ============================================================================

/// How usage rows and inventory resources are assigned to a client key.
///
/// In tag mode the key is the value of the `Client` tag, with
/// [`UNKNOWN_CLIENT`] for untagged resources. In overall mode every row maps
/// to one configured default client name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientKeyPolicy {
    /// True to group by the `Client` tag, false to use the default name.
    pub use_client_tags: bool,
    /// Client key used for everything in overall mode.
    pub default_client: String,
}

impl ClientKeyPolicy {
    /// Creates a tag-mode policy.
    pub fn tagged() -> Self {
        Self {
            use_client_tags: true,
            default_client: "Default".to_string(),
        }
    }

    /// Creates an overall-mode policy with the given default client name.
    pub fn overall(default_client: impl Into<String>) -> Self {
        Self {
            use_client_tags: false,
            default_client: default_client.into(),
        }
    }

    /// Resolves the client key for a tag set.
    pub fn client_key(&self, tags: &BTreeMap<String, String>) -> String {
        if self.use_client_tags {
            self.from_value(tags.get(CLIENT_TAG).map(String::as_str))
        } else {
            self.default_client.clone()
        }
    }

    /// Resolves the client key from an already-extracted tag value.
    ///
    /// Empty or missing values resolve to [`UNKNOWN_CLIENT`] in tag mode and
    /// to the default client name in overall mode.
    pub fn from_value(&self, value: Option<&str>) -> String {
        if !self.use_client_tags {
            return self.default_client.clone();
        }
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => UNKNOWN_CLIENT.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_seeded_at_zero() {
        let mut usage = ClientUsage::new();
        let totals = usage.totals_mut("ClientA");
        assert!(totals.is_zero());
        totals.core_hours += 10.0;
        assert_eq!(usage.get("ClientA").unwrap().core_hours, 10.0);
    }

    #[test]
    fn test_client_keys_case_sensitive() {
        let mut usage = ClientUsage::new();
        usage.totals_mut("ClientA").core_hours += 1.0;
        usage.totals_mut("clienta").core_hours += 2.0;
        assert_eq!(usage.len(), 2);
    }

    #[test]
    fn test_tag_policy_resolves_tag() {
        let policy = ClientKeyPolicy::tagged();
        let mut tags = BTreeMap::new();
        tags.insert(CLIENT_TAG.to_string(), "ClientA-Prod".to_string());
        assert_eq!(policy.client_key(&tags), "ClientA-Prod");
    }

    #[test]
    fn test_tag_policy_missing_tag_is_unknown() {
        let policy = ClientKeyPolicy::tagged();
        assert_eq!(policy.client_key(&BTreeMap::new()), UNKNOWN_CLIENT);
        assert_eq!(policy.from_value(Some("  ")), UNKNOWN_CLIENT);
        assert_eq!(policy.from_value(None), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_overall_policy_ignores_tags() {
        let policy = ClientKeyPolicy::overall("Contoso");
        let mut tags = BTreeMap::new();
        tags.insert(CLIENT_TAG.to_string(), "ClientA".to_string());
        assert_eq!(policy.client_key(&tags), "Contoso");
        assert_eq!(policy.from_value(Some("ClientA")), "Contoso");
    }
}
