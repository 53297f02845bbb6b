//! Storage inventory listings.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use quotascope_core::{
    ContainerStats, CoreError, DiskInfo, StorageAccountInfo, StorageInventoryApi,
};

use crate::client::ArmClient;
use crate::wire;

const STORAGE_API_VERSION: &str = "2023-05-01";
const DISK_API_VERSION: &str = "2024-03-02";
const METRICS_API_VERSION: &str = "2023-10-01";

/// Azure Monitor metric holding an account's aggregate blob bytes.
const BLOB_CAPACITY_METRIC: &str = "BlobCapacity";

/// ARM-backed storage listings: accounts, container statistics, and disks.
pub struct StorageInventory {
    arm: Arc<ArmClient>,
}

impl StorageInventory {
    /// Creates the listing over an ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    fn account_from_value(value: &Value) -> StorageAccountInfo {
        StorageAccountInfo {
            name: wire::string_at(value, "/name"),
            resource_group: wire::resource_group_from_id(&wire::string_at(value, "/id")),
            location: wire::string_at(value, "/location"),
            sku: wire::string_at(value, "/sku/name"),
            tags: wire::tags_at(value, "/tags"),
        }
    }

    fn disk_from_value(value: &Value) -> DiskInfo {
        let managed_by = value
            .pointer("/managedBy")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        DiskInfo {
            name: wire::string_at(value, "/name"),
            resource_group: wire::resource_group_from_id(&wire::string_at(value, "/id")),
            location: wire::string_at(value, "/location"),
            sku: wire::string_at(value, "/sku/name"),
            size_gb: wire::f64_at(value, "/properties/diskSizeGB"),
            managed_by,
            tags: wire::tags_at(value, "/tags"),
        }
    }

    fn account_path(&self, account: &StorageAccountInfo) -> String {
        self.arm.subscription_path(&format!(
            "resourceGroups/{}/providers/Microsoft.Storage/storageAccounts/{}",
            account.resource_group, account.name
        ))
    }

    /// Reads the latest `BlobCapacity` datapoint for an account.
    fn latest_blob_bytes(metrics: &Value) -> u64 {
        metrics
            .pointer("/value/0/timeseries/0/data")
            .and_then(Value::as_array)
            .and_then(|points| {
                points
                    .iter()
                    .rev()
                    .find_map(|p| p.pointer("/average").and_then(Value::as_f64))
            })
            .map(|avg| avg.max(0.0) as u64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl StorageInventoryApi for StorageInventory {
    #[instrument(skip(self))]
    async fn list_storage_accounts(&self) -> Result<Vec<StorageAccountInfo>, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.Storage/storageAccounts");
        let items = self
            .arm
            .get_list(&path, STORAGE_API_VERSION, &[], None)
            .await
            .map_err(CoreError::from)?;

        debug!(count = items.len(), "Listed storage accounts");
        Ok(items.iter().map(Self::account_from_value).collect())
    }

    #[instrument(skip(self, account), fields(account = %account.name))]
    async fn container_stats(
        &self,
        account: &StorageAccountInfo,
    ) -> Result<ContainerStats, CoreError> {
        let containers_path = format!(
            "{}/blobServices/default/containers",
            self.account_path(account)
        );
        let containers = self
            .arm
            .get_list(&containers_path, STORAGE_API_VERSION, &[], None)
            .await
            .map_err(CoreError::from)?;

        // Blob bytes come from the account-level capacity metric; a metrics
        // outage degrades to zero rather than failing the account.
        let metrics_path = format!(
            "{}/providers/microsoft.insights/metrics",
            self.account_path(account)
        );
        let blob_bytes = match self
            .arm
            .get(
                &metrics_path,
                METRICS_API_VERSION,
                &[
                    ("metricnames", BLOB_CAPACITY_METRIC),
                    ("aggregation", "Average"),
                ],
            )
            .await
        {
            Ok(metrics) => Self::latest_blob_bytes(&metrics),
            Err(e) => {
                warn!(account = %account.name, error = %e, "Blob capacity metric unavailable");
                0
            }
        };

        let stats = ContainerStats {
            container_count: u32::try_from(containers.len()).unwrap_or(u32::MAX),
            blob_bytes,
        };
        debug!(
            containers = stats.container_count,
            blob_gb = stats.blob_gb(),
            "Container statistics"
        );
        Ok(stats)
    }

    #[instrument(skip(self))]
    async fn list_managed_disks(&self) -> Result<Vec<DiskInfo>, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.Compute/disks");
        let items = self
            .arm
            .get_list(&path, DISK_API_VERSION, &[], None)
            .await
            .map_err(CoreError::from)?;

        debug!(count = items.len(), "Listed managed disks");
        Ok(items.iter().map(Self::disk_from_value).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
