//! Trait definitions for Quotascope's external collaborators.
//!
//! The core treats authentication, billing queries, and inventory listings
//! as injected capabilities with a fixed contract. Implementations live in
//! `quotascope-azure`; tests substitute mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::models::range::DateRange;
use crate::models::resource::ResourceGroupFilter;

// ============================================================================
// Token Provider
// ============================================================================

/// Yields a bearer token valid for the management/billing API.
///
/// Acquisition failure is fatal for the calling data source only; the
/// acquisition pipeline recovers by advancing to its next source.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token.
    async fn bearer_token(&self) -> Result<String, CoreError>;
}

// ============================================================================
// Cost Query
// ============================================================================

/// A structured cost query request.
#[derive(Debug, Clone)]
pub struct CostQueryRequest {
    /// Report period.
    pub range: DateRange,
    /// Grouping dimension names, in output column order.
    pub groupings: Vec<String>,
    /// Optional resource-group allow-list, pushed into the query.
    pub resource_group_filter: Option<ResourceGroupFilter>,
}

/// One row of a cost query response.
///
/// Backends return rows either as positional arrays matching the requested
/// grouping order or as keyed objects; both shapes must be handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostRow {
    /// Positional values in column order.
    Positional(Vec<serde_json::Value>),
    /// Field name → value.
    Keyed(serde_json::Map<String, serde_json::Value>),
}

/// A cost query response: column names plus rows in either shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostQueryResponse {
    /// Column names, in positional-row order.
    pub columns: Vec<String>,
    /// Result rows.
    pub rows: Vec<CostRow>,
}

/// The primary billing/cost query transport.
#[async_trait]
pub trait CostQueryApi: Send + Sync {
    /// Runs a grouped, summed usage-quantity query over the period.
    async fn query(&self, request: &CostQueryRequest) -> Result<CostQueryResponse, CoreError>;
}

// ============================================================================
// Usage Details
// ============================================================================

/// One usage-detail record as returned by a detail-record transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageDetail {
    /// Resource group of the billed resource.
    pub resource_group: String,
    /// Meter category.
    pub meter_category: String,
    /// Meter sub-category.
    pub meter_subcategory: String,
    /// Meter name.
    pub meter_name: String,
    /// Resource type.
    pub resource_type: String,
    /// Consuming service name.
    pub consumed_service: String,
    /// Usage quantity.
    pub quantity: f64,
    /// Resource tags attached to the record.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// A detail-record retrieval transport.
///
/// Two independent implementations back the second and third acquisition
/// sources. Neither accepts a native resource-group filter; filtering is
/// applied client-side after retrieval.
#[async_trait]
pub trait UsageDetailApi: Send + Sync {
    /// Short name of the backing store, for diagnostics.
    fn source_name(&self) -> &'static str;

    /// Retrieves up to `max_records` usage details for the period.
    async fn usage_details(
        &self,
        range: &DateRange,
        max_records: u32,
    ) -> Result<Vec<UsageDetail>, CoreError>;
}

// ============================================================================
// Inventory Listings
// ============================================================================

/// A discovered standalone virtual machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmInfo {
    /// VM name.
    pub name: String,
    /// Resource group.
    pub resource_group: String,
    /// Region.
    pub location: String,
    /// VM size name (SKU).
    pub size: String,
    /// Provisioning state.
    pub status: String,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// A discovered virtual machine scale set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleSetInfo {
    /// Scale set name.
    pub name: String,
    /// Resource group.
    pub resource_group: String,
    /// Region.
    pub location: String,
    /// Shared instance SKU name.
    pub sku: String,
    /// Instance count.
    pub capacity: u32,
    /// Provisioning state.
    pub status: String,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// A discovered storage account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageAccountInfo {
    /// Account name.
    pub name: String,
    /// Resource group.
    pub resource_group: String,
    /// Region.
    pub location: String,
    /// Account SKU name.
    pub sku: String,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Best-effort container/blob statistics for one storage account.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContainerStats {
    /// Number of blob containers.
    pub container_count: u32,
    /// Aggregate blob bytes across containers.
    pub blob_bytes: u64,
}

impl ContainerStats {
    /// Aggregate blob size in GB.
    pub fn blob_gb(&self) -> f64 {
        self.blob_bytes as f64 / 1024.0 / 1024.0 / 1024.0
    }
}

/// A discovered managed disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskInfo {
    /// Disk name.
    pub name: String,
    /// Resource group.
    pub resource_group: String,
    /// Region.
    pub location: String,
    /// Disk SKU name.
    pub sku: String,
    /// Provisioned size in GB.
    pub size_gb: f64,
    /// Resource id of the VM the disk is attached to, if any.
    pub managed_by: Option<String>,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// One entry of the authoritative VM size catalog for a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmSizeInfo {
    /// Size name (SKU).
    pub name: String,
    /// vCPU count.
    pub cores: u32,
}

/// Lists compute resources for the subscription.
#[async_trait]
pub trait ComputeInventoryApi: Send + Sync {
    /// Lists standalone virtual machines.
    async fn list_virtual_machines(&self) -> Result<Vec<VmInfo>, CoreError>;

    /// Lists virtual machine scale sets with their instance counts.
    async fn list_scale_sets(&self) -> Result<Vec<ScaleSetInfo>, CoreError>;
}

/// Lists storage resources for the subscription.
#[async_trait]
pub trait StorageInventoryApi: Send + Sync {
    /// Lists storage accounts.
    async fn list_storage_accounts(&self) -> Result<Vec<StorageAccountInfo>, CoreError>;

    /// Returns container/blob statistics for one account (best effort).
    async fn container_stats(
        &self,
        account: &StorageAccountInfo,
    ) -> Result<ContainerStats, CoreError>;

    /// Lists managed disks.
    async fn list_managed_disks(&self) -> Result<Vec<DiskInfo>, CoreError>;
}

/// The authoritative per-region VM size catalog.
#[async_trait]
pub trait SkuCatalogSource: Send + Sync {
    /// Lists VM sizes available in a region.
    async fn list_vm_sizes(&self, region: &str) -> Result<Vec<VmSizeInfo>, CoreError>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_row_positional_parse() {
        let json = r#"[["rg-prod", "ClientA", "Virtual Machines", 42.5]]"#;
        let rows: Vec<CostRow> = serde_json::from_str(json).unwrap();
        assert!(matches!(rows[0], CostRow::Positional(ref v) if v.len() == 4));
    }

    #[test]
    fn test_cost_row_keyed_parse() {
        let json = r#"[{"ResourceGroupName": "rg-prod", "UsageQuantity": 42.5}]"#;
        let rows: Vec<CostRow> = serde_json::from_str(json).unwrap();
        assert!(matches!(rows[0], CostRow::Keyed(_)));
    }

    #[test]
    fn test_container_stats_gb() {
        let stats = ContainerStats {
            container_count: 3,
            blob_bytes: 450 * 1024 * 1024 * 1024,
        };
        assert!((stats.blob_gb() - 450.0).abs() < f64::EPSILON);
    }
}
