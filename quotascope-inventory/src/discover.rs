//! Resource inventory discovery.
//!
//! Builds the per-run catalog of compute and storage resources. Discovery
//! degrades instead of failing: a single unreachable sub-resource is logged
//! and skipped, and a whole-category failure leaves that category empty
//! while the static SKU table keeps downstream estimation possible.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use quotascope_core::{
    ComputeInventoryApi, ContainerStats, ResourceGroupFilter, ResourceKind, ResourceRecord,
    StorageInventoryApi,
};

use crate::sku::{SkuCoreTable, SkuResolver};

/// Upper bound on concurrent per-account container statistics calls.
const MAX_CONCURRENT_STATS: usize = 4;

// ============================================================================
// Inventory
// ============================================================================

/// The discovered resource catalog for one report run.
///
/// Built by a single discovery pass and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Inventory {
    records: Vec<ResourceRecord>,
    skus: SkuCoreTable,
    compute_degraded: bool,
    storage_degraded: bool,
}

impl Inventory {
    /// Creates an inventory from pre-built records and a SKU table.
    ///
    /// Discovery normally builds the inventory; this constructor backs tests
    /// and degraded paths.
    pub fn new(records: Vec<ResourceRecord>, skus: SkuCoreTable) -> Self {
        Self {
            records,
            skus,
            compute_degraded: false,
            storage_degraded: false,
        }
    }

    /// Creates an empty inventory with an empty SKU table.
    pub fn empty() -> Self {
        Self::new(Vec::new(), SkuCoreTable::new())
    }

    /// Discovers compute and storage resources.
    ///
    /// The optional `filter` is a resource-group allow-list; absence means
    /// all groups. The resolver's candidate regions are set to the distinct
    /// locations observed in the compute listings, in first-seen order, so
    /// the authoritative catalog is only probed where the subscription
    /// actually runs.
    #[instrument(skip_all, fields(filtered = filter.is_some()))]
    pub async fn discover(
        compute: Arc<dyn ComputeInventoryApi>,
        storage: Arc<dyn StorageInventoryApi>,
        resolver: &mut SkuResolver,
        filter: Option<&ResourceGroupFilter>,
    ) -> Self {
        let mut records = Vec::new();

        let compute_degraded =
            discover_compute(compute.as_ref(), resolver, filter, &mut records).await;
        let storage_degraded = discover_storage(storage, filter, &mut records).await;

        let skus = if compute_degraded && resolver.table().is_empty() {
            info!("Compute discovery failed entirely, using static SKU table");
            SkuCoreTable::static_fallback()
        } else {
            resolver.table().clone()
        };

        info!(
            resources = records.len(),
            skus = skus.len(),
            compute_degraded,
            storage_degraded,
            "Inventory discovery complete"
        );

        Self {
            records,
            skus,
            compute_degraded,
            storage_degraded,
        }
    }

    /// All discovered records.
    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Discovered compute records (VMs and scale sets).
    pub fn compute(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(|r| r.kind.is_compute())
    }

    /// Discovered storage accounts.
    pub fn storage_accounts(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == ResourceKind::StorageAccount)
    }

    /// Discovered managed disks.
    pub fn disks(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == ResourceKind::ManagedDisk)
    }

    /// The SKU table accumulated during discovery.
    pub fn sku_table(&self) -> &SkuCoreTable {
        &self.skus
    }

    /// Matches a size name against the discovered compute records.
    pub fn cores_for_size(&self, size: &str) -> Option<u32> {
        self.compute()
            .find(|r| r.sku.eq_ignore_ascii_case(size.trim()))
            .map(|r| r.cores)
    }

    /// Returns true if nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if compute discovery failed as a whole.
    pub fn compute_degraded(&self) -> bool {
        self.compute_degraded
    }

    /// True if storage discovery failed as a whole.
    pub fn storage_degraded(&self) -> bool {
        self.storage_degraded
    }
}

// ============================================================================
// Discovery passes
// ============================================================================

/// Discovers VMs and scale sets. Returns true if the category failed whole.
async fn discover_compute(
    compute: &dyn ComputeInventoryApi,
    resolver: &mut SkuResolver,
    filter: Option<&ResourceGroupFilter>,
    records: &mut Vec<ResourceRecord>,
) -> bool {
    let vms = match compute.list_virtual_machines().await {
        Ok(vms) => Some(vms),
        Err(e) => {
            warn!(error = %e, "Virtual machine listing failed");
            None
        }
    };
    let scale_sets = match compute.list_scale_sets().await {
        Ok(sets) => Some(sets),
        Err(e) => {
            warn!(error = %e, "Scale set listing failed");
            None
        }
    };

    if vms.is_none() && scale_sets.is_none() {
        return true;
    }

    let mut vms = vms.unwrap_or_default();
    let mut scale_sets = scale_sets.unwrap_or_default();
    if let Some(filter) = filter {
        vms.retain(|vm| filter.matches(&vm.resource_group));
        scale_sets.retain(|ss| filter.matches(&ss.resource_group));
    }

    // Probe the catalog only for regions the subscription uses.
    let mut regions: Vec<String> = Vec::new();
    for location in vms
        .iter()
        .map(|vm| vm.location.as_str())
        .chain(scale_sets.iter().map(|ss| ss.location.as_str()))
    {
        if !regions.iter().any(|r| r == location) {
            regions.push(location.to_string());
        }
    }
    resolver.set_regions(regions);

    for vm in vms {
        let cores = resolver.resolve(&vm.size).await;
        debug!(vm = %vm.name, size = %vm.size, cores, "Discovered VM");
        records.push(ResourceRecord::vm(
            vm.name,
            vm.resource_group,
            vm.location,
            vm.size,
            vm.status,
            vm.tags,
            cores,
        ));
    }

    for ss in scale_sets {
        let cores = resolver.resolve(&ss.sku).await;
        debug!(
            scale_set = %ss.name,
            sku = %ss.sku,
            cores,
            capacity = ss.capacity,
            "Discovered scale set"
        );
        records.push(ResourceRecord::scale_set(
            ss.name,
            ss.resource_group,
            ss.location,
            ss.sku,
            ss.status,
            ss.tags,
            cores,
            ss.capacity,
        ));
    }

    false
}

/// Discovers storage accounts and managed disks. Returns true if the
/// category failed whole.
async fn discover_storage(
    storage: Arc<dyn StorageInventoryApi>,
    filter: Option<&ResourceGroupFilter>,
    records: &mut Vec<ResourceRecord>,
) -> bool {
    let accounts = match storage.list_storage_accounts().await {
        Ok(accounts) => Some(accounts),
        Err(e) => {
            warn!(error = %e, "Storage account listing failed");
            None
        }
    };
    let disks = match storage.list_managed_disks().await {
        Ok(disks) => Some(disks),
        Err(e) => {
            warn!(error = %e, "Managed disk listing failed");
            None
        }
    };

    if accounts.is_none() && disks.is_none() {
        return true;
    }

    let mut accounts = accounts.unwrap_or_default();
    let mut disks = disks.unwrap_or_default();
    if let Some(filter) = filter {
        accounts.retain(|a| filter.matches(&a.resource_group));
        disks.retain(|d| filter.matches(&d.resource_group));
    }

    // Per-account container statistics, bounded concurrency. Inaccessible
    // containers degrade to zero for that account.
    let mut with_stats: Vec<_> = stream::iter(accounts.into_iter().map(|account| {
        let api = Arc::clone(&storage);
        async move {
            let stats = match api.container_stats(&account).await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(
                        account = %account.name,
                        error = %e,
                        "Container statistics unavailable, assuming empty"
                    );
                    ContainerStats::default()
                }
            };
            (account, stats)
        }
    }))
    .buffer_unordered(MAX_CONCURRENT_STATS)
    .collect()
    .await;
    with_stats.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));

    for (account, stats) in with_stats {
        debug!(
            account = %account.name,
            containers = stats.container_count,
            blob_gb = stats.blob_gb(),
            "Discovered storage account"
        );
        records.push(ResourceRecord::storage_account(
            account.name,
            account.resource_group,
            account.location,
            account.sku,
            account.tags,
            stats.blob_gb(),
        ));
    }

    for disk in disks {
        let status = if disk.managed_by.is_some() {
            "Attached"
        } else {
            "Unattached"
        };
        records.push(ResourceRecord::managed_disk(
            disk.name,
            disk.resource_group,
            disk.location,
            disk.sku,
            status,
            disk.tags,
            disk.size_gb,
        ));
    }

    false
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotascope_core::{
        CoreError, DiskInfo, ScaleSetInfo, StorageAccountInfo, VmInfo,
    };
    use std::collections::BTreeMap;

    struct MockCompute {
        vms: Result<Vec<VmInfo>, String>,
        scale_sets: Result<Vec<ScaleSetInfo>, String>,
    }

    #[async_trait]
    impl ComputeInventoryApi for MockCompute {
        async fn list_virtual_machines(&self) -> Result<Vec<VmInfo>, CoreError> {
            self.vms.clone().map_err(CoreError::Transport)
        }

        async fn list_scale_sets(&self) -> Result<Vec<ScaleSetInfo>, CoreError> {
            self.scale_sets.clone().map_err(CoreError::Transport)
        }
    }

    struct MockStorage {
        accounts: Result<Vec<StorageAccountInfo>, String>,
        disks: Result<Vec<DiskInfo>, String>,
        /// Accounts whose container stats call fails.
        failing_accounts: Vec<String>,
        blob_bytes: u64,
    }

    #[async_trait]
    impl StorageInventoryApi for MockStorage {
        async fn list_storage_accounts(&self) -> Result<Vec<StorageAccountInfo>, CoreError> {
            self.accounts.clone().map_err(CoreError::Transport)
        }

        async fn container_stats(
            &self,
            account: &StorageAccountInfo,
        ) -> Result<ContainerStats, CoreError> {
            if self.failing_accounts.contains(&account.name) {
                return Err(CoreError::Transport("container listing denied".into()));
            }
            Ok(ContainerStats {
                container_count: 2,
                blob_bytes: self.blob_bytes,
            })
        }

        async fn list_managed_disks(&self) -> Result<Vec<DiskInfo>, CoreError> {
            self.disks.clone().map_err(CoreError::Transport)
        }
    }

    fn vm(name: &str, rg: &str, size: &str) -> VmInfo {
        VmInfo {
            name: name.to_string(),
            resource_group: rg.to_string(),
            location: "westeurope".to_string(),
            size: size.to_string(),
            status: "Succeeded".to_string(),
            tags: BTreeMap::new(),
        }
    }

    fn account(name: &str, rg: &str) -> StorageAccountInfo {
        StorageAccountInfo {
            name: name.to_string(),
            resource_group: rg.to_string(),
            location: "westeurope".to_string(),
            sku: "Standard_LRS".to_string(),
            tags: BTreeMap::new(),
        }
    }

    fn disk(name: &str, rg: &str, size_gb: f64, attached: bool) -> DiskInfo {
        DiskInfo {
            name: name.to_string(),
            resource_group: rg.to_string(),
            location: "westeurope".to_string(),
            sku: "Premium_LRS".to_string(),
            size_gb,
            managed_by: attached.then(|| "/subscriptions/s/vm".to_string()),
            tags: BTreeMap::new(),
        }
    }

    fn working_storage() -> Arc<MockStorage> {
        Arc::new(MockStorage {
            accounts: Ok(vec![account("proddata", "rg-prod")]),
            disks: Ok(vec![disk("data-disk", "rg-prod", 512.0, true)]),
            failing_accounts: Vec::new(),
            blob_bytes: 100 * 1024 * 1024 * 1024,
        })
    }

    #[tokio::test]
    async fn test_discover_builds_catalog() {
        let compute = Arc::new(MockCompute {
            vms: Ok(vec![vm("app-01", "rg-prod", "Standard_D4s_v3")]),
            scale_sets: Ok(vec![ScaleSetInfo {
                name: "web-vmss".to_string(),
                resource_group: "rg-prod".to_string(),
                location: "westeurope".to_string(),
                sku: "Standard_D2s_v3".to_string(),
                capacity: 3,
                status: "Succeeded".to_string(),
                tags: BTreeMap::new(),
            }]),
        });

        let mut resolver = SkuResolver::offline(SkuCoreTable::new());
        let inventory =
            Inventory::discover(compute, working_storage(), &mut resolver, None).await;

        assert_eq!(inventory.records().len(), 4);
        assert_eq!(inventory.compute().count(), 2);
        let vmss = inventory
            .compute()
            .find(|r| r.kind == ResourceKind::ScaleSet)
            .unwrap();
        assert_eq!(vmss.total_cores, 6);
        assert_eq!(inventory.cores_for_size("standard_d4s_v3"), Some(4));

        let acct = inventory.storage_accounts().next().unwrap();
        assert!((acct.size_gb - 100.0).abs() < 1e-9);
        let d = inventory.disks().next().unwrap();
        assert_eq!(d.status, "Attached");
    }

    #[tokio::test]
    async fn test_filter_limits_discovery() {
        let compute = Arc::new(MockCompute {
            vms: Ok(vec![
                vm("app-01", "rg-prod", "Standard_D2s_v3"),
                vm("dev-01", "rg-dev", "Standard_D2s_v3"),
            ]),
            scale_sets: Ok(vec![]),
        });

        let filter = ResourceGroupFilter::parse("rg-prod").unwrap();
        let mut resolver = SkuResolver::offline(SkuCoreTable::new());
        let inventory =
            Inventory::discover(compute, working_storage(), &mut resolver, Some(&filter)).await;

        assert_eq!(inventory.compute().count(), 1);
        assert_eq!(inventory.compute().next().unwrap().name, "app-01");
    }

    #[tokio::test]
    async fn test_container_stats_failure_is_absorbed() {
        let compute = Arc::new(MockCompute {
            vms: Ok(vec![]),
            scale_sets: Ok(vec![]),
        });
        let storage = Arc::new(MockStorage {
            accounts: Ok(vec![account("proddata", "rg-prod"), account("devdata", "rg-prod")]),
            disks: Ok(vec![]),
            failing_accounts: vec!["devdata".to_string()],
            blob_bytes: 1024 * 1024 * 1024,
        });

        let mut resolver = SkuResolver::offline(SkuCoreTable::new());
        let inventory = Inventory::discover(compute, storage, &mut resolver, None).await;

        assert_eq!(inventory.storage_accounts().count(), 2);
        let dev = inventory
            .storage_accounts()
            .find(|r| r.name == "devdata")
            .unwrap();
        assert_eq!(dev.size_gb, 0.0);
        assert!(!inventory.storage_degraded());
    }

    #[tokio::test]
    async fn test_whole_compute_failure_degrades_to_static_table() {
        let compute = Arc::new(MockCompute {
            vms: Err("listing denied".to_string()),
            scale_sets: Err("listing denied".to_string()),
        });

        let mut resolver = SkuResolver::offline(SkuCoreTable::new());
        let inventory =
            Inventory::discover(compute, working_storage(), &mut resolver, None).await;

        assert!(inventory.compute_degraded());
        assert_eq!(inventory.compute().count(), 0);
        assert!(!inventory.sku_table().is_empty());
        // Storage is still discovered
        assert_eq!(inventory.storage_accounts().count(), 1);
    }
}
