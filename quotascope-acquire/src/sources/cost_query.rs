//! Primary source: the structured cost query.

use async_trait::async_trait;
use tracing::{debug, instrument};

use quotascope_core::{CostQueryRequest, DateRange, ResourceGroupFilter, UsageRow};

use crate::context::AcquireContext;
use crate::error::AcquireError;
use crate::normalize;
use crate::source::{SourceKind, UsageSource};

/// Runs a grouped, summed usage-quantity query against the cost API.
///
/// This is the highest-fidelity source: grouping happens server-side and the
/// resource-group filter is pushed into the query itself.
pub struct CostQuerySource;

impl CostQuerySource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl Default for CostQuerySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageSource for CostQuerySource {
    fn id(&self) -> &str {
        "billing.cost_query"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CostQuery
    }

    #[instrument(skip(self, ctx, filter), fields(range = %range))]
    async fn acquire(
        &self,
        ctx: &AcquireContext,
        range: &DateRange,
        filter: Option<&ResourceGroupFilter>,
    ) -> Result<Vec<UsageRow>, AcquireError> {
        let request = CostQueryRequest {
            range: *range,
            groupings: normalize::standard_groupings(),
            resource_group_filter: filter.cloned(),
        };

        let response = ctx.cost.query(&request).await?;
        debug!(
            columns = response.columns.len(),
            rows = response.rows.len(),
            "Cost query answered"
        );

        Ok(normalize::rows_from_cost_response(
            &response,
            &ctx.settings.keying,
        ))
    }
}
