//! Text output formatting with colors.

use std::collections::BTreeMap;
use std::path::Path;

use quotascope_core::{DateRange, ReportRecord, ResourceKind};
use quotascope_inventory::Inventory;
use quotascope_report::QuotaBook;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// The five tracked metrics, as (label, accessor) pairs.
const METRIC_LABELS: [&str; 5] = [
    "Core Hours",
    "Data Out GB",
    "Data In GB",
    "Disk Storage GB",
    "Blob Storage GB",
];

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------
    // Report
    // ------------------------------------------------------------------

    /// Formats the full usage report.
    pub fn format_report(
        &self,
        records: &[ReportRecord],
        range: &DateRange,
        source: &str,
        estimated: bool,
        categories: Option<&BTreeMap<String, f64>>,
    ) -> String {
        let mut lines = Vec::new();

        let mut header = format!("Usage Report  {range}");
        if estimated {
            header.push_str("  (estimated from inventory)");
        }
        lines.push(self.bold(&header));
        lines.push(self.dim(&format!("source: {source}")));

        if records.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("(no usage found for the period)"));
            return lines.join("\n");
        }

        for record in records {
            lines.push(String::new());
            lines.push(format!(
                "{}  {}",
                self.bold(&record.client),
                self.dim(&format!("[{}]", record.mode.label()))
            ));

            let used = metric_values(record);
            let quota = record.quota.map(|q| {
                [
                    q.core_hours,
                    q.data_out_gb,
                    q.data_in_gb,
                    q.disk_storage_gb,
                    q.blob_storage_gb,
                ]
            });
            let remaining = record.remaining.map(|r| {
                [
                    r.core_hours,
                    r.data_out_gb,
                    r.data_in_gb,
                    r.disk_storage_gb,
                    r.blob_storage_gb,
                ]
            });

            for (i, label) in METRIC_LABELS.iter().enumerate() {
                lines.push(self.metric_line(
                    label,
                    used[i],
                    quota.map(|q| q[i]),
                    remaining.map(|r| r[i]),
                ));
            }
        }

        if let Some(categories) = categories {
            lines.push(String::new());
            lines.push(self.bold("By meter category"));
            for (category, quantity) in categories {
                lines.push(format!("  {category:<32} {quantity:>14.2}"));
            }
        }

        lines.join("\n")
    }

    /// Formats one metric line; quota and remaining appear together.
    fn metric_line(
        &self,
        label: &str,
        used: f64,
        quota: Option<f64>,
        remaining: Option<f64>,
    ) -> String {
        let mut line = format!("  {label:<16} {used:>12.2}");
        if let Some(quota) = quota {
            line.push_str(&format!(" / {quota:.2}"));
        }
        if let Some(remaining) = remaining {
            let text = format!("remaining {remaining:.2}");
            let painted = if remaining < 0.0 {
                self.paint(RED, &text)
            } else {
                self.paint(GREEN, &text)
            };
            line.push_str(&format!("   {painted}"));
        }
        line
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// Formats the discovered resource catalog.
    pub fn format_inventory(&self, inventory: &Inventory) -> String {
        let mut lines = Vec::new();
        lines.push(self.bold("Resource Inventory"));

        if inventory.is_empty() {
            lines.push(self.dim("(no resources discovered)"));
            return lines.join("\n");
        }

        for record in inventory.records() {
            let detail = match record.kind {
                ResourceKind::Vm => format!("{} cores", record.cores),
                ResourceKind::ScaleSet => format!(
                    "{} x {} = {} cores",
                    record.cores, record.capacity, record.total_cores
                ),
                ResourceKind::StorageAccount | ResourceKind::ManagedDisk => {
                    format!("{:.2} GB", record.size_gb)
                }
            };
            lines.push(format!(
                "  {:<16} {:<24} {:<20} {:<20} {}",
                record.kind.display_name(),
                record.name,
                self.paint(CYAN, &record.resource_group),
                record.sku,
                detail
            ));
        }

        let compute: u32 = inventory.compute().map(|r| r.total_cores).sum();
        lines.push(String::new());
        lines.push(self.dim(&format!(
            "{} resources, {} total compute cores",
            inventory.records().len(),
            compute
        )));

        lines.join("\n")
    }

    // ------------------------------------------------------------------
    // Quotas
    // ------------------------------------------------------------------

    /// Formats the configured quota book.
    pub fn format_quotas(&self, book: &QuotaBook, path: &Path) -> String {
        let mut lines = Vec::new();
        lines.push(self.bold("Configured Quotas"));
        lines.push(self.dim(&format!("file: {}", path.display())));

        if book.is_empty() {
            lines.push(self.dim("(no quotas configured)"));
            return lines.join("\n");
        }

        for (client, quota) in &book.clients {
            lines.push(String::new());
            lines.push(self.bold(client));
            let values = [
                quota.core_hours,
                quota.data_out_gb,
                quota.data_in_gb,
                quota.disk_storage_gb,
                quota.blob_storage_gb,
            ];
            for (label, value) in METRIC_LABELS.iter().zip(values) {
                lines.push(format!("  {label:<16} {value:>12.2}"));
            }
        }

        lines.join("\n")
    }

    // ------------------------------------------------------------------
    // Color helpers
    // ------------------------------------------------------------------

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }
}

/// The five tracked metrics of a record, in label order.
fn metric_values(record: &ReportRecord) -> [f64; 5] {
    [
        record.usage.core_hours,
        record.usage.data_out_gb,
        record.usage.data_in_gb,
        record.usage.disk_storage_gb,
        record.usage.blob_storage_gb,
    ]
}
