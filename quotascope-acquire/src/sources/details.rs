//! Secondary source: consumption detail records.

use async_trait::async_trait;
use tracing::{debug, instrument};

use quotascope_core::{DateRange, ResourceGroupFilter, UsageRow};

use crate::context::AcquireContext;
use crate::error::AcquireError;
use crate::normalize;
use crate::source::{SourceKind, UsageSource};

/// Retrieves individual usage-detail records, bounded by a maximum count.
///
/// The retrieval call has no native resource-group filter; the allow-list is
/// applied client-side during normalization.
pub struct UsageDetailsSource;

impl UsageDetailsSource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl Default for UsageDetailsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageSource for UsageDetailsSource {
    fn id(&self) -> &str {
        "billing.usage_details"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::UsageDetails
    }

    #[instrument(skip(self, ctx, filter), fields(range = %range))]
    async fn acquire(
        &self,
        ctx: &AcquireContext,
        range: &DateRange,
        filter: Option<&ResourceGroupFilter>,
    ) -> Result<Vec<UsageRow>, AcquireError> {
        let records = ctx
            .details
            .usage_details(range, ctx.settings.max_detail_records)
            .await?;
        debug!(
            store = ctx.details.source_name(),
            records = records.len(),
            "Detail records retrieved"
        );

        Ok(normalize::rows_from_details(
            records,
            &ctx.settings.keying,
            filter,
        ))
    }
}
