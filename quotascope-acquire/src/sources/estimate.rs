//! Final source: synthetic estimation from the discovered inventory.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use quotascope_core::{DateRange, ResourceGroupFilter, UsageRow};
use quotascope_inventory::Inventory;

use crate::context::AcquireContext;
use crate::error::AcquireError;
use crate::normalize;
use crate::source::{SourceKind, UsageSource};

/// Ceiling on the hour count assumed per estimated period.
pub const MAX_ESTIMATE_HOURS: f64 = 720.0;

/// Synthesizes usage rows directly from the resource inventory.
///
/// One row per discovered compute resource, assuming it ran for the whole
/// period (capped at [`MAX_ESTIMATE_HOURS`]). Storage is not synthesized;
/// inventory-derived storage totals are merged during aggregation instead.
///
/// This source is terminal: it ends the cascade with whatever the inventory
/// holds, even when that is nothing.
pub struct InventoryEstimateSource {
    inventory: Arc<Inventory>,
}

impl InventoryEstimateSource {
    /// Creates the source over a discovered inventory.
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl UsageSource for InventoryEstimateSource {
    fn id(&self) -> &str {
        "inventory.estimate"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::InventoryEstimate
    }

    fn is_terminal(&self) -> bool {
        true
    }

    #[instrument(skip(self, ctx, filter), fields(range = %range))]
    async fn acquire(
        &self,
        ctx: &AcquireContext,
        range: &DateRange,
        filter: Option<&ResourceGroupFilter>,
    ) -> Result<Vec<UsageRow>, AcquireError> {
        let hours = range.total_hours().min(MAX_ESTIMATE_HOURS);

        let rows: Vec<UsageRow> = self
            .inventory
            .compute()
            .filter(|record| filter.is_none_or(|f| f.matches(&record.resource_group)))
            .map(|record| normalize::synthetic_compute_row(record, hours, &ctx.settings.keying))
            .collect();

        if rows.is_empty() {
            warn!("No compute inventory to estimate from");
        } else {
            info!(
                rows = rows.len(),
                hours, "Synthesized usage from inventory"
            );
        }

        Ok(rows)
    }
}

// ============================================================================
// Tests
// ============================================================================
