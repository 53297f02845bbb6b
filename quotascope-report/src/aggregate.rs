//! Usage aggregation.
//!
//! Folds canonical usage rows into per-client totals. Rows are classified by
//! meter category; compute rows are weighted by resolved core counts, and
//! storage/networking rows are routed by sub-category patterns. After the
//! row pass, inventory-derived storage sizes are merged additively on top of
//! whatever the billing rows reported.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use quotascope_core::{
    ClientKeyPolicy, ClientUsage, UsageRow, METER_NETWORKING, METER_STORAGE,
    METER_VIRTUAL_MACHINES,
};
use quotascope_inventory::{Inventory, SkuCoreTable, SkuResolver, DEFAULT_CORES};

static DISK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)disk|ssd|hdd").expect("disk pattern is valid"));
static BLOB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)blob|object").expect("blob pattern is valid"));
static DATA_OUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)data\s+out").expect("data-out pattern is valid"));
static DATA_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)data\s+in").expect("data-in pattern is valid"));

// ============================================================================
// Aggregate Outcome
// ============================================================================

/// The result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    /// Per-client accumulated totals, storage merge included.
    pub usage: ClientUsage,
    /// Raw quantity sums per meter category, for the detailed breakdown.
    pub by_category: BTreeMap<String, f64>,
}

// ============================================================================
// Aggregator
// ============================================================================

/// Folds usage rows into [`ClientUsage`].
///
/// Holds the discovery results of the run: the SKU table for core lookups,
/// the inventory for size matching and the storage merge, and the client-key
/// policy for keying merged storage.
pub struct Aggregator<'a> {
    inventory: &'a Inventory,
    skus: &'a SkuCoreTable,
    keying: ClientKeyPolicy,
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator over the run's discovery results.
    pub fn new(inventory: &'a Inventory, skus: &'a SkuCoreTable, keying: ClientKeyPolicy) -> Self {
        Self {
            inventory,
            skus,
            keying,
        }
    }

    /// Aggregates rows into per-client totals and merges inventory storage.
    pub fn aggregate(&self, rows: &[UsageRow]) -> AggregateOutcome {
        let mut outcome = AggregateOutcome::default();

        for row in rows {
            if row.quantity < 0.0 {
                warn!(
                    client = %row.client,
                    meter = %row.meter_subcategory,
                    quantity = row.quantity,
                    "Negative quantity is never summed, skipping row"
                );
                continue;
            }

            let category = row.meter_category.trim();
            if !category.is_empty() {
                *outcome.by_category.entry(category.to_string()).or_default() += row.quantity;
            }

            let totals = outcome.usage.totals_mut(&row.client);
            if category.eq_ignore_ascii_case(METER_VIRTUAL_MACHINES) {
                let cores = self.resolve_cores(&row.meter_subcategory);
                totals.core_hours += row.quantity * f64::from(cores);
            } else if category.eq_ignore_ascii_case(METER_STORAGE) {
                if DISK_RE.is_match(&row.meter_subcategory) {
                    totals.disk_storage_gb += row.quantity;
                } else if BLOB_RE.is_match(&row.meter_subcategory) {
                    totals.blob_storage_gb += row.quantity;
                }
                // Other storage sub-categories carry no tracked metric
            } else if category.eq_ignore_ascii_case(METER_NETWORKING) {
                if DATA_OUT_RE.is_match(&row.meter_subcategory) {
                    totals.data_out_gb += row.quantity;
                } else if DATA_IN_RE.is_match(&row.meter_subcategory) {
                    totals.data_in_gb += row.quantity;
                }
            }
        }

        self.merge_inventory_storage(&mut outcome.usage);

        info!(
            clients = outcome.usage.len(),
            categories = outcome.by_category.len(),
            "Aggregation complete"
        );
        outcome
    }

    /// Resolves a billed sub-category to a core count.
    ///
    /// Billing SKU spellings do not always match discovery-time naming, so
    /// three lookups run in order: the run's SKU table, a size match against
    /// the discovered compute records, and the name heuristic.
    fn resolve_cores(&self, meter_subcategory: &str) -> u32 {
        if let Some(cores) = self.skus.lookup(meter_subcategory) {
            return cores;
        }
        if let Some(cores) = self.inventory.cores_for_size(meter_subcategory) {
            debug!(sku = %meter_subcategory, cores, "Core count matched from inventory");
            return cores;
        }
        match SkuResolver::heuristic_cores(meter_subcategory) {
            Some(cores) => {
                debug!(sku = %meter_subcategory, cores, "Core count estimated from name");
                cores
            }
            None => {
                warn!(
                    sku = %meter_subcategory,
                    cores = DEFAULT_CORES,
                    "Unresolvable SKU, using default core count"
                );
                DEFAULT_CORES
            }
        }
    }

    /// Adds every discovered storage account's blob size and every disk's
    /// size to the owning client's totals.
    ///
    /// The merge is additive and independent of whether billing rows already
    /// reported storage; it keeps the report accurate when the billing API
    /// under-reports storage.
    fn merge_inventory_storage(&self, usage: &mut ClientUsage) {
        for account in self.inventory.storage_accounts() {
            let client = self.keying.client_key(&account.tags);
            usage.totals_mut(&client).blob_storage_gb += account.size_gb;
        }
        for disk in self.inventory.disks() {
            let client = self.keying.client_key(&disk.tags);
            usage.totals_mut(&client).disk_storage_gb += disk.size_gb;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quotascope_core::ResourceRecord;
    use std::collections::BTreeMap as Map;

    fn row(client: &str, category: &str, subcategory: &str, quantity: f64) -> UsageRow {
        UsageRow {
            resource_group: "rg-prod".to_string(),
            client: client.to_string(),
            meter_category: category.to_string(),
            meter_subcategory: subcategory.to_string(),
            resource_type: String::new(),
            service: String::new(),
            quantity,
            estimated: false,
        }
    }

    fn tagged(client: &str) -> Map<String, String> {
        let mut tags = Map::new();
        tags.insert("Client".to_string(), client.to_string());
        tags
    }

    fn empty_inventory() -> Inventory {
        Inventory::empty()
    }

    #[test]
    fn test_vm_row_weighted_by_cores() {
        let inventory = empty_inventory();
        let skus = SkuCoreTable::from_pairs(&[("Standard_D4s_v3", 4)]);
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        let outcome = aggregator.aggregate(&[row(
            "ClientA",
            "Virtual Machines",
            "Standard_D4s_v3",
            100.0,
        )]);

        assert_eq!(outcome.usage.get("ClientA").unwrap().core_hours, 400.0);
    }

    #[test]
    fn test_core_hours_sum_matches_row_sum() {
        let inventory = empty_inventory();
        let skus = SkuCoreTable::from_pairs(&[("Standard_D4s_v3", 4), ("Standard_D2s_v3", 2)]);
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        let rows = vec![
            row("ClientA", "Virtual Machines", "Standard_D4s_v3", 10.0),
            row("ClientB", "Virtual Machines", "Standard_D2s_v3", 5.0),
            row("ClientA", "Virtual Machines", "Standard_D2s_v3", 7.0),
            row("ClientA", "Storage", "Standard SSD Managed Disks", 3.0),
        ];
        let outcome = aggregator.aggregate(&rows);

        let total: f64 = outcome.usage.iter().map(|(_, t)| t.core_hours).sum();
        assert_eq!(total, 10.0 * 4.0 + 5.0 * 2.0 + 7.0 * 2.0);

        // Every metric is non-negative
        for (_, totals) in outcome.usage.iter() {
            assert!(totals.core_hours >= 0.0);
            assert!(totals.disk_storage_gb >= 0.0);
            assert!(totals.blob_storage_gb >= 0.0);
            assert!(totals.data_in_gb >= 0.0);
            assert!(totals.data_out_gb >= 0.0);
        }
    }

    #[test]
    fn test_cores_fallback_table_then_inventory_then_heuristic() {
        let inventory = Inventory::new(
            vec![ResourceRecord::vm(
                "app-01",
                "rg-prod",
                "westeurope",
                "Standard_D8s_v3",
                "Succeeded",
                Map::new(),
                8,
            )],
            SkuCoreTable::new(),
        );
        let skus = SkuCoreTable::from_pairs(&[("Standard_D4s_v3", 4)]);
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        let rows = vec![
            // In the table
            row("A", "Virtual Machines", "Standard_D4s_v3", 1.0),
            // Not in the table; matches a discovered instance size
            row("B", "Virtual Machines", "Standard_D8s_v3", 1.0),
            // Unknown everywhere; heuristic reads 16
            row("C", "Virtual Machines", "Standard_E16s_v3", 1.0),
            // No digits anywhere; default
            row("D", "Virtual Machines", "MysterySize", 1.0),
        ];
        let outcome = aggregator.aggregate(&rows);

        assert_eq!(outcome.usage.get("A").unwrap().core_hours, 4.0);
        assert_eq!(outcome.usage.get("B").unwrap().core_hours, 8.0);
        assert_eq!(outcome.usage.get("C").unwrap().core_hours, 16.0);
        assert_eq!(
            outcome.usage.get("D").unwrap().core_hours,
            f64::from(DEFAULT_CORES)
        );
    }

    #[test]
    fn test_storage_and_networking_classification() {
        let inventory = empty_inventory();
        let skus = SkuCoreTable::new();
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        let rows = vec![
            row("A", "Storage", "Standard SSD Managed Disks", 100.0),
            row("A", "Storage", "Blob Storage", 50.0),
            row("A", "Storage", "Queues", 7.0), // no tracked metric
            row("A", "Networking", "Data Out", 80.0),
            row("A", "Networking", "Data In", 400.0),
            row("A", "Bandwidth", "Something", 9.0), // ignored category
        ];
        let outcome = aggregator.aggregate(&rows);

        let totals = outcome.usage.get("A").unwrap();
        assert_eq!(totals.disk_storage_gb, 100.0);
        assert_eq!(totals.blob_storage_gb, 50.0);
        assert_eq!(totals.data_out_gb, 80.0);
        assert_eq!(totals.data_in_gb, 400.0);
        assert_eq!(totals.core_hours, 0.0);

        // The breakdown still sees every category
        assert_eq!(outcome.by_category.get("Bandwidth"), Some(&9.0));
    }

    #[test]
    fn test_negative_quantity_never_summed() {
        let inventory = empty_inventory();
        let skus = SkuCoreTable::new();
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        let rows = vec![
            row("A", "Networking", "Data Out", 10.0),
            row("A", "Networking", "Data Out", -4.0),
        ];
        let outcome = aggregator.aggregate(&rows);
        assert_eq!(outcome.usage.get("A").unwrap().data_out_gb, 10.0);
    }

    #[test]
    fn test_inventory_storage_merge_in_tag_mode() {
        let inventory = Inventory::new(
            vec![
                ResourceRecord::storage_account(
                    "proddata",
                    "rg-prod",
                    "westeurope",
                    "Standard_LRS",
                    tagged("ClientA-Prod"),
                    450.0,
                ),
                ResourceRecord::managed_disk(
                    "data-disk",
                    "rg-prod",
                    "westeurope",
                    "Premium_LRS",
                    "Attached",
                    tagged("ClientA-Prod"),
                    512.0,
                ),
            ],
            SkuCoreTable::new(),
        );
        let skus = SkuCoreTable::new();
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        // No billing row mentions storage; the merge alone populates it
        let outcome = aggregator.aggregate(&[]);
        let totals = outcome.usage.get("ClientA-Prod").unwrap();
        assert!(totals.blob_storage_gb >= 450.0);
        assert_eq!(totals.disk_storage_gb, 512.0);
    }

    #[test]
    fn test_storage_merge_is_additive_to_billed_rows() {
        let inventory = Inventory::new(
            vec![ResourceRecord::storage_account(
                "proddata",
                "rg-prod",
                "westeurope",
                "Standard_LRS",
                tagged("ClientA"),
                450.0,
            )],
            SkuCoreTable::new(),
        );
        let skus = SkuCoreTable::new();
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        // Billing already reported 50 GB of blob for the same client; the
        // inventory merge still adds its own 450 on top
        let outcome = aggregator.aggregate(&[row("ClientA", "Storage", "Blob Storage", 50.0)]);
        assert_eq!(outcome.usage.get("ClientA").unwrap().blob_storage_gb, 500.0);
    }

    #[test]
    fn test_untagged_storage_merges_to_unknown_in_tag_mode() {
        let inventory = Inventory::new(
            vec![ResourceRecord::storage_account(
                "orphandata",
                "rg-prod",
                "westeurope",
                "Standard_LRS",
                Map::new(),
                10.0,
            )],
            SkuCoreTable::new(),
        );
        let skus = SkuCoreTable::new();
        let aggregator = Aggregator::new(&inventory, &skus, ClientKeyPolicy::tagged());

        let outcome = aggregator.aggregate(&[]);
        assert_eq!(outcome.usage.get("Unknown").unwrap().blob_storage_gb, 10.0);
    }
}
