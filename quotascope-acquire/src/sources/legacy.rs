//! Tertiary source: legacy commerce usage aggregates.

use async_trait::async_trait;
use tracing::{debug, instrument};

use quotascope_core::{DateRange, ResourceGroupFilter, UsageRow};

use crate::context::AcquireContext;
use crate::error::AcquireError;
use crate::normalize;
use crate::source::{SourceKind, UsageSource};

/// Retrieves usage-detail records from the legacy commerce store.
///
/// Same contract as the consumption source, different backing store; useful
/// when the newer APIs are unavailable for a subscription type.
pub struct LegacyUsageSource;

impl LegacyUsageSource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LegacyUsageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageSource for LegacyUsageSource {
    fn id(&self) -> &str {
        "billing.usage_aggregates"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LegacyUsage
    }

    #[instrument(skip(self, ctx, filter), fields(range = %range))]
    async fn acquire(
        &self,
        ctx: &AcquireContext,
        range: &DateRange,
        filter: Option<&ResourceGroupFilter>,
    ) -> Result<Vec<UsageRow>, AcquireError> {
        let records = ctx
            .legacy
            .usage_details(range, ctx.settings.max_detail_records)
            .await?;
        debug!(
            store = ctx.legacy.source_name(),
            records = records.len(),
            "Legacy usage records retrieved"
        );

        Ok(normalize::rows_from_details(
            records,
            &ctx.settings.keying,
            filter,
        ))
    }
}
