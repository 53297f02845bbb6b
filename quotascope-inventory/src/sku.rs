//! SKU-to-core resolution.
//!
//! Billing records and discovered resources name compute SKUs (VM sizes);
//! turning those names into vCPU counts is the basis of every core-hour
//! figure in the report. Resolution is total: the authoritative per-region
//! catalog is probed first, then a name heuristic, then a constant default.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use quotascope_core::SkuCatalogSource;

/// Core count assumed when nothing else resolves a SKU name.
pub const DEFAULT_CORES: u32 = 2;

/// Family token with its trailing size number, e.g. `d4s` → (`d`, 4).
static FAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+)(\d+)").expect("family pattern is valid"));

/// Versioned-size suffix, e.g. `_v3`.
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_v\d+").expect("version pattern is valid"));

// ============================================================================
// SKU Core Table
// ============================================================================

/// Mapping from SKU name to vCPU count.
///
/// Populated once per run. Authoritative (catalog) and estimated (heuristic)
/// entries share the table; provenance is logged, not tracked. Lookup is
/// case-insensitive because billing and discovery spellings differ.
#[derive(Debug, Clone, Default)]
pub struct SkuCoreTable(HashMap<String, u32>);

impl SkuCoreTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Creates a table from name/cores pairs.
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        let mut table = Self::new();
        for (name, cores) in pairs {
            table.insert(name, *cores);
        }
        table
    }

    /// The small built-in table used when catalog discovery fails entirely.
    pub fn static_fallback() -> Self {
        Self::from_pairs(&[
            ("Standard_B1s", 1),
            ("Standard_B2s", 2),
            ("Standard_B2ms", 2),
            ("Standard_D2s_v3", 2),
            ("Standard_D4s_v3", 4),
            ("Standard_D8s_v3", 8),
            ("Standard_D16s_v3", 16),
            ("Standard_E2s_v3", 2),
            ("Standard_E4s_v3", 4),
            ("Standard_E8s_v3", 8),
            ("Standard_F2s_v2", 2),
            ("Standard_F4s_v2", 4),
            ("Standard_A1_v2", 1),
            ("Standard_A2_v2", 2),
            ("Standard_A4_v2", 4),
        ])
    }

    /// Records a SKU's core count.
    pub fn insert(&mut self, sku: &str, cores: u32) {
        self.0.insert(sku.trim().to_ascii_lowercase(), cores);
    }

    /// Looks up a SKU's core count.
    pub fn lookup(&self, sku: &str) -> Option<u32> {
        self.0.get(&sku.trim().to_ascii_lowercase()).copied()
    }

    /// Number of known SKUs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no SKU has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// SKU Resolver
// ============================================================================

/// Resolves SKU names to vCPU counts.
///
/// Resolution order: the run's accumulated [`SkuCoreTable`], then the
/// authoritative catalog probed across candidate regions (first hit wins),
/// then the name heuristic, then [`DEFAULT_CORES`]. Never fails.
pub struct SkuResolver {
    catalog: Option<Arc<dyn SkuCatalogSource>>,
    regions: Vec<String>,
    /// Region → size listing; `None` marks a region whose probe failed.
    region_cache: HashMap<String, Option<HashMap<String, u32>>>,
    table: SkuCoreTable,
}

impl SkuResolver {
    /// Creates a resolver backed by the authoritative catalog.
    pub fn new(catalog: Arc<dyn SkuCatalogSource>, regions: Vec<String>) -> Self {
        Self {
            catalog: Some(catalog),
            regions,
            region_cache: HashMap::new(),
            table: SkuCoreTable::new(),
        }
    }

    /// Creates a resolver with no catalog, seeded from an existing table.
    ///
    /// Used when catalog discovery is unavailable (degraded mode) and in
    /// tests; every miss goes straight to the heuristic.
    pub fn offline(table: SkuCoreTable) -> Self {
        Self {
            catalog: None,
            regions: Vec::new(),
            region_cache: HashMap::new(),
            table,
        }
    }

    /// Replaces the candidate region list for catalog probes.
    pub fn set_regions(&mut self, regions: Vec<String>) {
        self.regions = regions;
    }

    /// Resolves a SKU name to a vCPU count. Total; always ≥ 1.
    pub async fn resolve(&mut self, sku: &str) -> u32 {
        if let Some(cores) = self.table.lookup(sku) {
            return cores;
        }

        let key = sku.trim().to_ascii_lowercase();
        for region in self.regions.clone() {
            self.ensure_region(&region).await;
            if let Some(Some(sizes)) = self.region_cache.get(&region) {
                if let Some(&cores) = sizes.get(&key) {
                    debug!(sku, region = %region, cores, "Resolved SKU from catalog");
                    self.table.insert(sku, cores);
                    return cores;
                }
            }
        }

        let cores = Self::heuristic_cores(sku).unwrap_or(DEFAULT_CORES);
        info!(sku, cores, "SKU not in catalog, estimated from name");
        self.table.insert(sku, cores);
        cores
    }

    /// Loads a region's size listing into the cache once.
    async fn ensure_region(&mut self, region: &str) {
        if self.region_cache.contains_key(region) {
            return;
        }
        let Some(catalog) = self.catalog.clone() else {
            self.region_cache.insert(region.to_string(), None);
            return;
        };

        let entry = match catalog.list_vm_sizes(region).await {
            Ok(sizes) => Some(
                sizes
                    .into_iter()
                    .map(|s| (s.name.to_ascii_lowercase(), s.cores))
                    .collect(),
            ),
            Err(e) => {
                warn!(region, error = %e, "VM size catalog probe failed");
                None
            }
        };
        self.region_cache.insert(region.to_string(), entry);
    }

    /// Estimates a core count from the SKU name alone.
    ///
    /// Strips the `Standard_`/`Basic_` prefix and any `_vN` suffix, then
    /// reads the trailing integer of the family token. For most families the
    /// number is the core count; the unversioned A-series maps through a
    /// fixed table instead. Returns `None` for names without a usable number.
    pub fn heuristic_cores(sku: &str) -> Option<u32> {
        let lower = sku.trim().to_ascii_lowercase();
        let rest = lower
            .strip_prefix("standard_")
            .or_else(|| lower.strip_prefix("basic_"))
            .unwrap_or(&lower);

        let versioned = VERSION_RE.is_match(rest);
        let token = rest.split('_').next()?;
        let caps = FAMILY_RE.captures(token)?;
        let family = caps.get(1)?.as_str();
        let number: u32 = caps.get(2)?.as_str().parse().ok()?;

        if family == "a" && !versioned {
            legacy_a_series_cores(number)
        } else if number >= 1 {
            Some(number)
        } else {
            None
        }
    }

    /// The table accumulated so far.
    pub fn table(&self) -> &SkuCoreTable {
        &self.table
    }

    /// Consumes the resolver, returning its table.
    pub fn into_table(self) -> SkuCoreTable {
        self.table
    }
}

/// Unversioned A-series sizes, whose number is not a core count.
fn legacy_a_series_cores(number: u32) -> Option<u32> {
    match number {
        0 | 1 => Some(1),
        2 | 5 => Some(2),
        3 | 6 => Some(4),
        4 | 7 | 8 | 10 => Some(8),
        9 | 11 => Some(16),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotascope_core::{CoreError, VmSizeInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockCatalog {
        /// Regions that answer, with their listings.
        listings: HashMap<String, Vec<VmSizeInfo>>,
        calls: AtomicUsize,
    }

    impl MockCatalog {
        fn new(listings: HashMap<String, Vec<VmSizeInfo>>) -> Self {
            Self {
                listings,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SkuCatalogSource for MockCatalog {
        async fn list_vm_sizes(&self, region: &str) -> Result<Vec<VmSizeInfo>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.listings
                .get(region)
                .cloned()
                .ok_or_else(|| CoreError::Transport(format!("region {region} unavailable")))
        }
    }

    fn size(name: &str, cores: u32) -> VmSizeInfo {
        VmSizeInfo {
            name: name.to_string(),
            cores,
        }
    }

    #[test]
    fn test_heuristic_direct_families() {
        assert_eq!(SkuResolver::heuristic_cores("Standard_D4s_v3"), Some(4));
        assert_eq!(SkuResolver::heuristic_cores("Standard_E16s_v3"), Some(16));
        assert_eq!(SkuResolver::heuristic_cores("Standard_F2s_v2"), Some(2));
        assert_eq!(SkuResolver::heuristic_cores("Standard_B2ms"), Some(2));
        assert_eq!(SkuResolver::heuristic_cores("Standard_DS13"), Some(13));
    }

    #[test]
    fn test_heuristic_legacy_a_series() {
        assert_eq!(SkuResolver::heuristic_cores("Standard_A4"), Some(8));
        assert_eq!(SkuResolver::heuristic_cores("Basic_A2"), Some(2));
        assert_eq!(SkuResolver::heuristic_cores("Standard_A9"), Some(16));
        // Versioned A sizes are direct
        assert_eq!(SkuResolver::heuristic_cores("Standard_A4_v2"), Some(4));
    }

    #[test]
    fn test_heuristic_no_digits() {
        assert_eq!(SkuResolver::heuristic_cores("CustomSize"), None);
        assert_eq!(SkuResolver::heuristic_cores(""), None);
    }

    #[tokio::test]
    async fn test_resolve_defaults_without_catalog() {
        let mut resolver = SkuResolver::offline(SkuCoreTable::new());
        assert_eq!(resolver.resolve("NoDigitsHere").await, DEFAULT_CORES);
        assert_eq!(resolver.resolve("Standard_D8s_v3").await, 8);
    }

    #[tokio::test]
    async fn test_resolve_probes_regions_in_order() {
        let mut listings = HashMap::new();
        listings.insert(
            "westeurope".to_string(),
            vec![size("Standard_D4s_v3", 4), size("Standard_D2s_v3", 2)],
        );
        let catalog = Arc::new(MockCatalog::new(listings));
        let mut resolver = SkuResolver::new(
            catalog.clone(),
            vec!["eastus".to_string(), "westeurope".to_string()],
        );

        // eastus probe fails (absorbed), westeurope answers
        assert_eq!(resolver.resolve("Standard_D4s_v3").await, 4);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);

        // Listings and resolutions are cached: no further catalog calls
        assert_eq!(resolver.resolve("Standard_D4s_v3").await, 4);
        assert_eq!(resolver.resolve("Standard_D2s_v3").await, 2);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_short_circuits_on_first_region_hit() {
        let mut listings = HashMap::new();
        listings.insert("eastus".to_string(), vec![size("Standard_D4s_v3", 4)]);
        listings.insert("westeurope".to_string(), vec![size("Standard_D4s_v3", 4)]);
        let catalog = Arc::new(MockCatalog::new(listings));
        let mut resolver = SkuResolver::new(
            catalog.clone(),
            vec!["eastus".to_string(), "westeurope".to_string()],
        );

        assert_eq!(resolver.resolve("Standard_D4s_v3").await, 4);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        let table = SkuCoreTable::from_pairs(&[("Standard_D4s_v3", 4)]);
        assert_eq!(table.lookup("standard_d4s_v3"), Some(4));
        assert_eq!(table.lookup("STANDARD_D4S_V3"), Some(4));
        assert_eq!(table.lookup("Standard_D8s_v3"), None);
    }

    #[test]
    fn test_static_fallback_nonempty() {
        let table = SkuCoreTable::static_fallback();
        assert!(!table.is_empty());
        assert_eq!(table.lookup("Standard_D4s_v3"), Some(4));
    }
}
