//! Inventory resource records.
//!
//! A [`ResourceRecord`] is created once during inventory discovery and never
//! mutated afterwards. The inventory owns all records for the duration of a
//! run; nothing is persisted across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Resource Kind
// ============================================================================

/// The kind of a discovered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Standalone virtual machine.
    Vm,
    /// Virtual machine scale set (homogeneous instances, shared SKU).
    ScaleSet,
    /// Storage account.
    StorageAccount,
    /// Managed disk.
    ManagedDisk,
}

impl ResourceKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Vm => "VM",
            Self::ScaleSet => "Scale Set",
            Self::StorageAccount => "Storage Account",
            Self::ManagedDisk => "Managed Disk",
        }
    }

    /// Returns true for compute kinds (VM, scale set).
    pub fn is_compute(&self) -> bool {
        matches!(self, Self::Vm | Self::ScaleSet)
    }

    /// Returns true for storage kinds (account, disk).
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageAccount | Self::ManagedDisk)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Resource Record
// ============================================================================

/// One discovered compute or storage resource.
///
/// Records are immutable after creation. Kind-specific metrics are zero for
/// kinds they do not apply to: `cores`/`capacity`/`total_cores` for storage
/// kinds, `size_gb` for compute kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Resource name.
    pub name: String,
    /// Resource group the resource lives in.
    pub resource_group: String,
    /// Region/location.
    pub location: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Size/SKU name (VM size, disk SKU, account SKU).
    pub sku: String,
    /// Provisioning or attachment status.
    pub status: String,
    /// Resource tags (may be empty).
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// vCPU count per instance (compute kinds).
    pub cores: u32,
    /// Instance count (scale sets; 1 for standalone VMs).
    pub capacity: u32,
    /// `cores * capacity` (compute kinds).
    pub total_cores: u32,
    /// Size in GB (disk size or aggregate blob size).
    pub size_gb: f64,
}

impl ResourceRecord {
    /// Creates a record for a standalone virtual machine.
    pub fn vm(
        name: impl Into<String>,
        resource_group: impl Into<String>,
        location: impl Into<String>,
        sku: impl Into<String>,
        status: impl Into<String>,
        tags: BTreeMap<String, String>,
        cores: u32,
    ) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            location: location.into(),
            kind: ResourceKind::Vm,
            sku: sku.into(),
            status: status.into(),
            tags,
            cores,
            capacity: 1,
            total_cores: cores,
            size_gb: 0.0,
        }
    }

    /// Creates a record for a scale set. `total_cores` is `cores * capacity`.
    pub fn scale_set(
        name: impl Into<String>,
        resource_group: impl Into<String>,
        location: impl Into<String>,
        sku: impl Into<String>,
        status: impl Into<String>,
        tags: BTreeMap<String, String>,
        cores: u32,
        capacity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            location: location.into(),
            kind: ResourceKind::ScaleSet,
            sku: sku.into(),
            status: status.into(),
            tags,
            cores,
            capacity,
            total_cores: cores * capacity,
            size_gb: 0.0,
        }
    }

    /// Creates a record for a storage account with its aggregate blob size.
    pub fn storage_account(
        name: impl Into<String>,
        resource_group: impl Into<String>,
        location: impl Into<String>,
        sku: impl Into<String>,
        tags: BTreeMap<String, String>,
        blob_size_gb: f64,
    ) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            location: location.into(),
            kind: ResourceKind::StorageAccount,
            sku: sku.into(),
            status: "Available".to_string(),
            tags,
            cores: 0,
            capacity: 0,
            total_cores: 0,
            size_gb: blob_size_gb,
        }
    }

    /// Creates a record for a managed disk.
    pub fn managed_disk(
        name: impl Into<String>,
        resource_group: impl Into<String>,
        location: impl Into<String>,
        sku: impl Into<String>,
        status: impl Into<String>,
        tags: BTreeMap<String, String>,
        size_gb: f64,
    ) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            location: location.into(),
            kind: ResourceKind::ManagedDisk,
            sku: sku.into(),
            status: status.into(),
            tags,
            cores: 0,
            capacity: 0,
            total_cores: 0,
            size_gb,
        }
    }
}

// ============================================================================
// Resource Group Filter
// ============================================================================

/// An allow-list of resource groups.
///
/// Absence of a filter (`None` at the call sites) means all groups pass.
/// Matching is case-insensitive, as resource group names are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceGroupFilter(Vec<String>);

impl ResourceGroupFilter {
    /// Creates a filter from a list of group names.
    pub fn new(groups: Vec<String>) -> Self {
        Self(groups.into_iter().map(|g| g.trim().to_string()).collect())
    }

    /// Parses a comma-separated list. Returns `None` for an empty input,
    /// meaning "no filter".
    pub fn parse(input: &str) -> Option<Self> {
        let groups: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if groups.is_empty() {
            None
        } else {
            Some(Self(groups))
        }
    }

    /// Returns true if the given resource group is allowed.
    pub fn matches(&self, resource_group: &str) -> bool {
        self.0
            .iter()
            .any(|g| g.eq_ignore_ascii_case(resource_group))
    }

    /// Returns the allowed group names.
    pub fn groups(&self) -> &[String] {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_set_total_cores() {
        let record = ResourceRecord::scale_set(
            "web-vmss",
            "rg-prod",
            "westeurope",
            "Standard_D4s_v3",
            "Succeeded",
            BTreeMap::new(),
            4,
            5,
        );
        assert_eq!(record.total_cores, 20);
        assert!(record.kind.is_compute());
    }

    #[test]
    fn test_vm_capacity_is_one() {
        let record = ResourceRecord::vm(
            "app-01",
            "rg-prod",
            "westeurope",
            "Standard_D2s_v3",
            "Succeeded",
            BTreeMap::new(),
            2,
        );
        assert_eq!(record.capacity, 1);
        assert_eq!(record.total_cores, 2);
    }

    #[test]
    fn test_storage_kinds() {
        let account = ResourceRecord::storage_account(
            "proddata",
            "rg-prod",
            "westeurope",
            "Standard_LRS",
            BTreeMap::new(),
            450.0,
        );
        assert!(account.kind.is_storage());
        assert_eq!(account.total_cores, 0);
        assert_eq!(account.size_gb, 450.0);
    }

    #[test]
    fn test_filter_parse_and_match() {
        let filter = ResourceGroupFilter::parse("rg-prod, rg-dev").unwrap();
        assert!(filter.matches("rg-prod"));
        assert!(filter.matches("RG-PROD"));
        assert!(!filter.matches("rg-test"));
    }

    #[test]
    fn test_filter_parse_empty() {
        assert!(ResourceGroupFilter::parse("").is_none());
        assert!(ResourceGroupFilter::parse(" , ").is_none());
    }
}
