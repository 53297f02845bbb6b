//! Integration tests for core model types.

use quotascope_core::{
    ClientQuota, CostRow, ReportMode, ReportRecord, UsageRow, UsageTotals,
};

#[test]
fn test_usage_row_serialization_roundtrip() {
    let row = UsageRow {
        resource_group: "rg-prod".to_string(),
        client: "ClientA".to_string(),
        meter_category: "Virtual Machines".to_string(),
        meter_subcategory: "Standard_D4s_v3".to_string(),
        resource_type: "virtualMachines".to_string(),
        service: "Microsoft.Compute".to_string(),
        quantity: 100.0,
        estimated: false,
    };
    let json = serde_json::to_string(&row).unwrap();
    let parsed: UsageRow = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.client, "ClientA");
    assert_eq!(parsed.quantity, 100.0);
}

#[test]
fn test_estimated_flag_defaults_to_false() {
    let json = r#"{
        "resource_group": "rg",
        "client": "ClientA",
        "meter_category": "Virtual Machines",
        "meter_subcategory": "Standard_D2s_v3",
        "resource_type": "virtualMachines",
        "service": "Microsoft.Compute",
        "quantity": 1.0
    }"#;
    let row: UsageRow = serde_json::from_str(json).unwrap();
    assert!(!row.estimated);
}

#[test]
fn test_report_mode_serializes_as_label() {
    let record = ReportRecord::with_quota(
        "ClientA",
        UsageTotals::default(),
        ClientQuota::default(),
    );
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains(r#""mode":"Usage vs Quota""#));
}

#[test]
fn test_usage_only_record_omits_quota_fields() {
    let record = ReportRecord::usage_only(
        "ClientB",
        UsageTotals::default(),
        ReportMode::UsageOnlyNoQuotaForClient,
    );
    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("quota"));
    assert!(!json.contains("remaining"));
    assert!(json.contains("Usage Only (No Quota for Client)"));
}

#[test]
fn test_cost_rows_accept_both_shapes_in_one_response() {
    let json = r#"[
        ["rg-prod", "ClientA", "Virtual Machines", "Standard_D4s_v3", "virtualMachines", "compute", 12.0],
        {"ResourceGroupName": "rg-dev", "Client": "ClientB", "MeterCategory": "Storage", "UsageQuantity": 5.0}
    ]"#;
    let rows: Vec<CostRow> = serde_json::from_str(json).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(matches!(rows[0], CostRow::Positional(_)));
    assert!(matches!(rows[1], CostRow::Keyed(_)));
}
