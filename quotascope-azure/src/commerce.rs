//! Legacy commerce usage-aggregate transport.

use std::collections::BTreeMap;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use quotascope_core::{CoreError, DateRange, UsageDetail, UsageDetailApi};

use crate::client::ArmClient;
use crate::wire;

const COMMERCE_API_VERSION: &str = "2015-06-25-preview";

/// ARM Commerce `UsageAggregates` endpoint.
///
/// The oldest of the billing stores, kept as the last record-backed source
/// for subscription types the newer APIs do not cover. Resource identity and
/// tags arrive embedded in the `instanceData` JSON string.
pub struct CommerceUsageAggregates {
    arm: Arc<ArmClient>,
}

impl CommerceUsageAggregates {
    /// Creates the transport over an ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    fn detail_from_value(value: &Value) -> UsageDetail {
        let (resource_uri, tags) = Self::parse_instance_data(value);

        UsageDetail {
            resource_group: wire::resource_group_from_id(&resource_uri),
            meter_category: wire::string_at(value, "/properties/meterCategory"),
            meter_subcategory: wire::string_at(value, "/properties/meterSubCategory"),
            meter_name: wire::string_at(value, "/properties/meterName"),
            resource_type: wire::resource_type_from_id(&resource_uri),
            consumed_service: resource_uri
                .split('/')
                .skip_while(|s| !s.eq_ignore_ascii_case("providers"))
                .nth(1)
                .unwrap_or_default()
                .to_string(),
            quantity: wire::f64_at(value, "/properties/quantity"),
            tags,
        }
    }

    /// Unpacks the `instanceData` JSON string into a resource URI and tags.
    fn parse_instance_data(value: &Value) -> (String, BTreeMap<String, String>) {
        let Some(raw) = value
            .pointer("/properties/instanceData")
            .and_then(Value::as_str)
        else {
            return (String::new(), BTreeMap::new());
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(instance) => {
                let uri = wire::string_at(&instance, "/Microsoft.Resources/resourceUri");
                let tags = wire::tags_at(&instance, "/Microsoft.Resources/tags");
                (uri, tags)
            }
            Err(e) => {
                warn!(error = %e, "Unparseable instanceData, record kept without identity");
                (String::new(), BTreeMap::new())
            }
        }
    }
}

#[async_trait]
impl UsageDetailApi for CommerceUsageAggregates {
    fn source_name(&self) -> &'static str {
        "commerce"
    }

    #[instrument(skip(self), fields(range = %range, max_records))]
    async fn usage_details(
        &self,
        range: &DateRange,
        max_records: u32,
    ) -> Result<Vec<UsageDetail>, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.Commerce/UsageAggregates");
        let start = range.start_timestamp();
        let end = range.end_timestamp();

        let items = self
            .arm
            .get_list(
                &path,
                COMMERCE_API_VERSION,
                &[
                    ("reportedStartTime", start.as_str()),
                    ("reportedEndTime", end.as_str()),
                    ("aggregationGranularity", "Daily"),
                ],
                Some(max_records as usize),
            )
            .await
            .map_err(CoreError::from)?;

        debug!(count = items.len(), "Retrieved usage aggregates");
        Ok(items.iter().map(Self::detail_from_value).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
