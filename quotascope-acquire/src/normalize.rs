//! Record normalization into the canonical usage-row schema.
//!
//! Each acquisition source has its own native record shape: the cost query
//! answers with positional arrays or keyed objects, the detail stores with
//! structured records, and the estimate source synthesizes rows from
//! inventory. Everything is mapped here; no source-specific shape crosses
//! this boundary.

use serde_json::Value;
use tracing::warn;

use quotascope_core::{
    ClientKeyPolicy, CostQueryResponse, CostRow, ResourceGroupFilter, ResourceKind,
    ResourceRecord, UsageDetail, UsageRow, METER_VIRTUAL_MACHINES,
};

// ============================================================================
// Grouping dimensions
// ============================================================================

/// Resource group grouping dimension.
pub const GROUPING_RESOURCE_GROUP: &str = "ResourceGroupName";
/// Client tag grouping dimension.
pub const GROUPING_CLIENT_TAG: &str = "Client";
/// Meter category grouping dimension.
pub const GROUPING_METER_CATEGORY: &str = "MeterCategory";
/// Meter sub-category grouping dimension.
pub const GROUPING_METER_SUBCATEGORY: &str = "MeterSubCategory";
/// Resource type grouping dimension.
pub const GROUPING_RESOURCE_TYPE: &str = "ResourceType";
/// Service name grouping dimension.
pub const GROUPING_SERVICE_NAME: &str = "ServiceName";
/// Summed usage-quantity column.
pub const COLUMN_QUANTITY: &str = "UsageQuantity";

/// The grouping dimensions the cost query is issued with, in column order.
pub fn standard_groupings() -> Vec<String> {
    [
        GROUPING_RESOURCE_GROUP,
        GROUPING_CLIENT_TAG,
        GROUPING_METER_CATEGORY,
        GROUPING_METER_SUBCATEGORY,
        GROUPING_RESOURCE_TYPE,
        GROUPING_SERVICE_NAME,
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

// ============================================================================
// Cost query rows
// ============================================================================

/// Maps a cost query response into canonical rows.
///
/// Handles both row shapes the transport may return. Rows without a
/// parseable, non-negative quantity are logged and skipped.
pub fn rows_from_cost_response(
    response: &CostQueryResponse,
    keying: &ClientKeyPolicy,
) -> Vec<UsageRow> {
    let mut rows = Vec::with_capacity(response.rows.len());
    for (index, row) in response.rows.iter().enumerate() {
        let Some(quantity) = number(lookup(row, &response.columns, COLUMN_QUANTITY)) else {
            warn!(index, "Cost row has no usable quantity, skipping");
            continue;
        };
        if quantity < 0.0 {
            warn!(index, quantity, "Cost row has negative quantity, skipping");
            continue;
        }

        let client_value = lookup(row, &response.columns, GROUPING_CLIENT_TAG)
            .and_then(Value::as_str);

        rows.push(UsageRow {
            resource_group: text(lookup(row, &response.columns, GROUPING_RESOURCE_GROUP)),
            client: keying.from_value(client_value),
            meter_category: text(lookup(row, &response.columns, GROUPING_METER_CATEGORY)),
            meter_subcategory: text(lookup(row, &response.columns, GROUPING_METER_SUBCATEGORY)),
            resource_type: text(lookup(row, &response.columns, GROUPING_RESOURCE_TYPE)),
            service: text(lookup(row, &response.columns, GROUPING_SERVICE_NAME)),
            quantity,
            estimated: false,
        });
    }
    rows
}

/// Finds a field in either row shape, by column name.
fn lookup<'a>(row: &'a CostRow, columns: &[String], name: &str) -> Option<&'a Value> {
    match row {
        CostRow::Positional(values) => {
            let index = columns.iter().position(|c| c.eq_ignore_ascii_case(name))?;
            values.get(index)
        }
        CostRow::Keyed(map) => map
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value),
    }
}

fn text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Detail records
// ============================================================================

/// Maps detail records into canonical rows.
///
/// The detail transports have no native resource-group filter, so the
/// allow-list is applied here, after retrieval. A blank sub-category falls
/// back to the meter name, which carries the size for some stores.
pub fn rows_from_details(
    records: Vec<UsageDetail>,
    keying: &ClientKeyPolicy,
    filter: Option<&ResourceGroupFilter>,
) -> Vec<UsageRow> {
    records
        .into_iter()
        .filter(|record| filter.is_none_or(|f| f.matches(&record.resource_group)))
        .filter(|record| {
            if record.quantity < 0.0 {
                warn!(
                    meter = %record.meter_name,
                    quantity = record.quantity,
                    "Detail record has negative quantity, skipping"
                );
                return false;
            }
            true
        })
        .map(|record| {
            let client = keying.client_key(&record.tags);
            let meter_subcategory = if record.meter_subcategory.trim().is_empty() {
                record.meter_name
            } else {
                record.meter_subcategory
            };
            UsageRow {
                resource_group: record.resource_group,
                client,
                meter_category: record.meter_category,
                meter_subcategory,
                resource_type: record.resource_type,
                service: record.consumed_service,
                quantity: record.quantity,
                estimated: false,
            }
        })
        .collect()
}

// ============================================================================
// Synthetic rows
// ============================================================================

/// Builds one synthetic compute row from an inventory record.
///
/// Quantity is instance-hours (`hours * capacity`), with the SKU as the
/// sub-category, so aggregation multiplies it by the per-instance core count
/// and lands on `total_cores * hours`.
pub fn synthetic_compute_row(
    record: &ResourceRecord,
    hours: f64,
    keying: &ClientKeyPolicy,
) -> UsageRow {
    let instances = f64::from(record.capacity.max(1));
    let resource_type = match record.kind {
        ResourceKind::ScaleSet => "virtualMachineScaleSets",
        _ => "virtualMachines",
    };
    UsageRow {
        resource_group: record.resource_group.clone(),
        client: keying.client_key(&record.tags),
        meter_category: METER_VIRTUAL_MACHINES.to_string(),
        meter_subcategory: record.sku.clone(),
        resource_type: resource_type.to_string(),
        service: "Microsoft.Compute".to_string(),
        quantity: hours * instances,
        estimated: true,
    }
}

// ============================================================================
// Tests
// ============================================================================
