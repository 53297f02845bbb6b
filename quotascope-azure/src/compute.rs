//! Compute inventory listings.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use quotascope_core::{
    ComputeInventoryApi, CoreError, ScaleSetInfo, SkuCatalogSource, VmInfo, VmSizeInfo,
};

use crate::client::ArmClient;
use crate::wire;

const COMPUTE_API_VERSION: &str = "2024-07-01";

/// ARM-backed compute listings: VMs, scale sets, and the per-region VM size
/// catalog.
pub struct ComputeInventory {
    arm: Arc<ArmClient>,
}

impl ComputeInventory {
    /// Creates the listing over an ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    fn vm_from_value(value: &Value) -> VmInfo {
        VmInfo {
            name: wire::string_at(value, "/name"),
            resource_group: wire::resource_group_from_id(&wire::string_at(value, "/id")),
            location: wire::string_at(value, "/location"),
            size: wire::string_at(value, "/properties/hardwareProfile/vmSize"),
            status: wire::string_at(value, "/properties/provisioningState"),
            tags: wire::tags_at(value, "/tags"),
        }
    }

    fn scale_set_from_value(value: &Value) -> ScaleSetInfo {
        ScaleSetInfo {
            name: wire::string_at(value, "/name"),
            resource_group: wire::resource_group_from_id(&wire::string_at(value, "/id")),
            location: wire::string_at(value, "/location"),
            sku: wire::string_at(value, "/sku/name"),
            capacity: wire::u32_at(value, "/sku/capacity"),
            status: wire::string_at(value, "/properties/provisioningState"),
            tags: wire::tags_at(value, "/tags"),
        }
    }
}

#[async_trait]
impl ComputeInventoryApi for ComputeInventory {
    #[instrument(skip(self))]
    async fn list_virtual_machines(&self) -> Result<Vec<VmInfo>, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.Compute/virtualMachines");
        let items = self
            .arm
            .get_list(&path, COMPUTE_API_VERSION, &[], None)
            .await
            .map_err(CoreError::from)?;

        debug!(count = items.len(), "Listed virtual machines");
        Ok(items.iter().map(Self::vm_from_value).collect())
    }

    #[instrument(skip(self))]
    async fn list_scale_sets(&self) -> Result<Vec<ScaleSetInfo>, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.Compute/virtualMachineScaleSets");
        let items = self
            .arm
            .get_list(&path, COMPUTE_API_VERSION, &[], None)
            .await
            .map_err(CoreError::from)?;

        debug!(count = items.len(), "Listed scale sets");
        Ok(items.iter().map(Self::scale_set_from_value).collect())
    }
}

#[async_trait]
impl SkuCatalogSource for ComputeInventory {
    #[instrument(skip(self))]
    async fn list_vm_sizes(&self, region: &str) -> Result<Vec<VmSizeInfo>, CoreError> {
        let path = self.arm.subscription_path(&format!(
            "providers/Microsoft.Compute/locations/{region}/vmSizes"
        ));
        let items = self
            .arm
            .get_list(&path, COMPUTE_API_VERSION, &[], None)
            .await
            .map_err(CoreError::from)?;

        debug!(region, count = items.len(), "Listed VM sizes");
        Ok(items
            .iter()
            .map(|value| VmSizeInfo {
                name: wire::string_at(value, "/name"),
                cores: wire::u32_at(value, "/numberOfCores"),
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vm_from_value() {
        let value = json!({
            "id": "/subscriptions/s/resourceGroups/rg-prod/providers/Microsoft.Compute/virtualMachines/app-01",
            "name": "app-01",
            "location": "westeurope",
            "tags": {"Client": "ClientA"},
            "properties": {
                "hardwareProfile": {"vmSize": "Standard_D4s_v3"},
                "provisioningState": "Succeeded"
            }
        });
        let vm = ComputeInventory::vm_from_value(&value);
        assert_eq!(vm.name, "app-01");
        assert_eq!(vm.resource_group, "rg-prod");
        assert_eq!(vm.size, "Standard_D4s_v3");
        assert_eq!(vm.tags.get("Client").map(String::as_str), Some("ClientA"));
    }

    #[test]
    fn test_scale_set_from_value() {
        let value = json!({
            "id": "/subscriptions/s/resourceGroups/rg-prod/providers/Microsoft.Compute/virtualMachineScaleSets/web-vmss",
            "name": "web-vmss",
            "location": "westeurope",
            "sku": {"name": "Standard_D2s_v3", "tier": "Standard", "capacity": 5},
            "properties": {"provisioningState": "Succeeded"}
        });
        let ss = ComputeInventory::scale_set_from_value(&value);
        assert_eq!(ss.sku, "Standard_D2s_v3");
        assert_eq!(ss.capacity, 5);
        assert_eq!(ss.resource_group, "rg-prod");
    }
}
