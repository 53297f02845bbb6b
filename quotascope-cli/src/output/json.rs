//! JSON output formatting.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use quotascope_core::{
    ClientQuota, DateRange, Remaining, ReportRecord, ResourceRecord, UsageTotals,
};
use quotascope_inventory::Inventory;
use quotascope_report::QuotaBook;

// ============================================================================
// Output Types
// ============================================================================

/// JSON envelope for the usage report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportOutput<'a> {
    period_start: String,
    period_end: String,
    source: &'a str,
    estimated: bool,
    records: Vec<ReportRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeMap<String, f64>>,
}

/// JSON envelope for the inventory listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InventoryOutput<'a> {
    resources: &'a [ResourceRecord],
    compute_degraded: bool,
    storage_degraded: bool,
}

// ============================================================================
// Rounding
// ============================================================================

/// Rounds to two decimals; presentation only, accumulation keeps precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_totals(totals: UsageTotals) -> UsageTotals {
    UsageTotals {
        core_hours: round2(totals.core_hours),
        data_out_gb: round2(totals.data_out_gb),
        data_in_gb: round2(totals.data_in_gb),
        disk_storage_gb: round2(totals.disk_storage_gb),
        blob_storage_gb: round2(totals.blob_storage_gb),
    }
}

fn round_quota(quota: ClientQuota) -> ClientQuota {
    ClientQuota {
        core_hours: round2(quota.core_hours),
        data_out_gb: round2(quota.data_out_gb),
        data_in_gb: round2(quota.data_in_gb),
        disk_storage_gb: round2(quota.disk_storage_gb),
        blob_storage_gb: round2(quota.blob_storage_gb),
    }
}

fn round_remaining(remaining: Remaining) -> Remaining {
    Remaining {
        core_hours: round2(remaining.core_hours),
        data_out_gb: round2(remaining.data_out_gb),
        data_in_gb: round2(remaining.data_in_gb),
        disk_storage_gb: round2(remaining.disk_storage_gb),
        blob_storage_gb: round2(remaining.blob_storage_gb),
    }
}

fn round_record(record: &ReportRecord) -> ReportRecord {
    ReportRecord {
        client: record.client.clone(),
        mode: record.mode,
        usage: round_totals(record.usage),
        quota: record.quota.map(round_quota),
        remaining: record.remaining.map(round_remaining),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter with optional pretty-printing.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }

    /// Formats the usage report.
    pub fn format_report(
        &self,
        records: &[ReportRecord],
        range: &DateRange,
        source: &str,
        estimated: bool,
        categories: Option<&BTreeMap<String, f64>>,
    ) -> Result<String> {
        let output = ReportOutput {
            period_start: range.start().to_string(),
            period_end: range.end().to_string(),
            source,
            estimated,
            records: records.iter().map(round_record).collect(),
            categories: categories
                .map(|c| c.iter().map(|(k, v)| (k.clone(), round2(*v))).collect()),
        };
        self.serialize(&output)
    }

    /// Formats the inventory listing.
    pub fn format_inventory(&self, inventory: &Inventory) -> Result<String> {
        let output = InventoryOutput {
            resources: inventory.records(),
            compute_degraded: inventory.compute_degraded(),
            storage_degraded: inventory.storage_degraded(),
        };
        self.serialize(&output)
    }

    /// Formats the quota book.
    pub fn format_quotas(&self, book: &QuotaBook) -> Result<String> {
        self.serialize(book)
    }
}
