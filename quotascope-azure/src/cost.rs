//! Cost Management query transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use quotascope_core::{CoreError, CostQueryApi, CostQueryRequest, CostQueryResponse, CostRow};

use crate::client::ArmClient;

const COST_API_VERSION: &str = "2023-11-01";

/// Grouping dimension that is a resource tag rather than a column.
const TAG_GROUPING: &str = "Client";

/// ARM Cost Management `query` endpoint.
///
/// Issues a grouped, summed usage-quantity query; the resource-group filter
/// is pushed into the query body, so filtering happens server-side.
pub struct CostManagementQuery {
    arm: Arc<ArmClient>,
}

impl CostManagementQuery {
    /// Creates the transport over an ARM client.
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    fn build_body(request: &CostQueryRequest) -> Value {
        let grouping: Vec<Value> = request
            .groupings
            .iter()
            .map(|name| {
                if name == TAG_GROUPING {
                    json!({"type": "TagKey", "name": name})
                } else {
                    json!({"type": "Dimension", "name": name})
                }
            })
            .collect();

        let mut dataset = Map::new();
        dataset.insert("granularity".to_string(), json!("None"));
        dataset.insert(
            "aggregation".to_string(),
            json!({"totalQuantity": {"name": "UsageQuantity", "function": "Sum"}}),
        );
        dataset.insert("grouping".to_string(), Value::Array(grouping));
        if let Some(filter) = &request.resource_group_filter {
            dataset.insert(
                "filter".to_string(),
                json!({"dimensions": {
                    "name": "ResourceGroupName",
                    "operator": "In",
                    "values": filter.groups(),
                }}),
            );
        }

        json!({
            "type": "Usage",
            "timeframe": "Custom",
            "timePeriod": {
                "from": request.range.start_timestamp(),
                "to": request.range.end_timestamp(),
            },
            "dataset": Value::Object(dataset),
        })
    }

    fn parse_response(value: &Value) -> Result<CostQueryResponse, CoreError> {
        let columns = value
            .pointer("/properties/columns")
            .and_then(Value::as_array)
            .map(|cols| {
                cols.iter()
                    .map(|c| {
                        c.pointer("/name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();

        let rows = value
            .pointer("/properties/rows")
            .cloned()
            .map(serde_json::from_value::<Vec<CostRow>>)
            .transpose()
            .map_err(|e| CoreError::InvalidData(format!("cost rows: {e}")))?
            .unwrap_or_default();

        Ok(CostQueryResponse { columns, rows })
    }
}

#[async_trait]
impl CostQueryApi for CostManagementQuery {
    #[instrument(skip(self, request), fields(range = %request.range))]
    async fn query(&self, request: &CostQueryRequest) -> Result<CostQueryResponse, CoreError> {
        let path = self
            .arm
            .subscription_path("providers/Microsoft.CostManagement/query");
        let body = Self::build_body(request);

        let value = self
            .arm
            .post(&path, COST_API_VERSION, &body)
            .await
            .map_err(CoreError::from)?;

        let response = Self::parse_response(&value)?;
        debug!(
            columns = response.columns.len(),
            rows = response.rows.len(),
            "Cost query answered"
        );
        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quotascope_core::{DateRange, ResourceGroupFilter};

    fn request(filter: Option<&str>) -> CostQueryRequest {
        CostQueryRequest {
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
            )
            .unwrap(),
            groupings: vec![
                "ResourceGroupName".to_string(),
                "Client".to_string(),
                "MeterCategory".to_string(),
            ],
            resource_group_filter: filter.and_then(ResourceGroupFilter::parse),
        }
    }

    #[test]
    fn test_body_groups_tag_and_dimensions() {
        let body = CostManagementQuery::build_body(&request(None));
        let grouping = body.pointer("/dataset/grouping").unwrap().as_array().unwrap();
        assert_eq!(grouping.len(), 3);
        assert_eq!(grouping[0]["type"], "Dimension");
        assert_eq!(grouping[1]["type"], "TagKey");
        assert_eq!(grouping[1]["name"], "Client");
        assert!(body.pointer("/dataset/filter").is_none());
    }

    #[test]
    fn test_body_pushes_filter_into_query() {
        let body = CostManagementQuery::build_body(&request(Some("rg-prod,rg-dev")));
        let values = body
            .pointer("/dataset/filter/dimensions/values")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(body.pointer("/type").unwrap(), "Usage");
    }

    #[test]
    fn test_parse_response_positional_rows() {
        let value = serde_json::json!({
            "properties": {
                "columns": [
                    {"name": "ResourceGroupName", "type": "String"},
                    {"name": "UsageQuantity", "type": "Number"}
                ],
                "rows": [["rg-prod", 12.5]]
            }
        });
        let response = CostManagementQuery::parse_response(&value).unwrap();
        assert_eq!(response.columns, vec!["ResourceGroupName", "UsageQuantity"]);
        assert_eq!(response.rows.len(), 1);
    }

    #[test]
    fn test_parse_response_empty() {
        let response = CostManagementQuery::parse_response(&serde_json::json!({})).unwrap();
        assert!(response.columns.is_empty());
        assert!(response.rows.is_empty());
    }
}
