//! Consumption usage-detail transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use quotascope_core::{CoreError, DateRange, UsageDetail, UsageDetailApi};

use crate::client::ArmClient;
use crate::wire;

const CONSUMPTION_API_VERSION: &str = "2023-05-01";

/// Page size requested from the service; the overall cap is enforced by the
/// caller-provided maximum.
const PAGE_SIZE: u32 = 1000;

/// ARM Consumption `usageDetails` endpoint.
///
/// Retrieves individual usage records for the period. The endpoint has no
/// resource-group filter parameter; callers filter after retrieval.
pub struct ConsumptionUsageDetails {
    arm: Arc<ArmClient>,
}

impl ConsumptionUsageDetails {
    /// Creates the transport over an ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    fn detail_from_value(value: &Value) -> UsageDetail {
        let resource_id = wire::string_at(value, "/properties/resourceId");
        // Meter fields are nested under meterDetails on newer payloads and
        // flat on older ones.
        let pick = |nested: &str, flat: &str| {
            let v = wire::string_at(value, nested);
            if v.is_empty() {
                wire::string_at(value, flat)
            } else {
                v
            }
        };

        let resource_group = {
            let flat = wire::string_at(value, "/properties/resourceGroup");
            if flat.is_empty() {
                wire::resource_group_from_id(&resource_id)
            } else {
                flat
            }
        };

        UsageDetail {
            resource_group,
            meter_category: pick(
                "/properties/meterDetails/meterCategory",
                "/properties/meterCategory",
            ),
            meter_subcategory: pick(
                "/properties/meterDetails/meterSubCategory",
                "/properties/meterSubCategory",
            ),
            meter_name: pick("/properties/meterDetails/meterName", "/properties/meterName"),
            resource_type: wire::resource_type_from_id(&resource_id),
            consumed_service: wire::string_at(value, "/properties/consumedService"),
            quantity: wire::f64_at(value, "/properties/quantity"),
            tags: wire::tags_at(value, "/tags"),
        }
    }
}

#[async_trait]
impl UsageDetailApi for ConsumptionUsageDetails {
    fn source_name(&self) -> &'static str {
        "consumption"
    }

    #[instrument(skip(self), fields(range = %range, max_records))]
    async fn usage_details(
        &self,
        range: &DateRange,
        max_records: u32,
    ) -> Result<Vec<UsageDetail>, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.Consumption/usageDetails");
        let filter = format!(
            "properties/usageStart ge '{}' and properties/usageEnd le '{}'",
            range.start(),
            range.end()
        );
        let top = PAGE_SIZE.min(max_records).to_string();

        let items = self
            .arm
            .get_list(
                &path,
                CONSUMPTION_API_VERSION,
                &[("$filter", filter.as_str()), ("$top", top.as_str())],
                Some(max_records as usize),
            )
            .await
            .map_err(CoreError::from)?;

        debug!(count = items.len(), "Retrieved usage details");
        Ok(items.iter().map(Self::detail_from_value).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
