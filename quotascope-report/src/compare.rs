//! Quota comparison.
//!
//! Joins aggregated usage with the configured quota book and emits one
//! report record per client. Exactly one branch applies per client, chosen
//! by `(use_client_tags, quota exists)`.

use tracing::debug;

use quotascope_core::{ClientUsage, ReportMode, ReportRecord};

use crate::quotas::QuotaBook;

/// Produces one report record per client in the usage accumulation.
///
/// A configured quota always yields a full comparison record; without one,
/// the usage-only wording depends on the reporting mode.
pub fn compare(
    usage: &ClientUsage,
    quotas: &QuotaBook,
    use_client_tags: bool,
) -> Vec<ReportRecord> {
    usage
        .iter()
        .map(|(client, totals)| match quotas.get(client) {
            Some(quota) => {
                debug!(client = %client, "Comparing usage against quota");
                ReportRecord::with_quota(client.clone(), *totals, *quota)
            }
            None if use_client_tags => ReportRecord::usage_only(
                client.clone(),
                *totals,
                ReportMode::UsageOnlyNoQuotaForClient,
            ),
            None => ReportRecord::usage_only(
                client.clone(),
                *totals,
                ReportMode::UsageOnlyNoQuotaDefined,
            ),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quotascope_core::{ClientQuota, UsageTotals};

    fn usage_with(client: &str, totals: UsageTotals) -> ClientUsage {
        let mut usage = ClientUsage::new();
        *usage.totals_mut(client) = totals;
        usage
    }

    #[test]
    fn test_overall_mode_without_quota() {
        let usage = usage_with("Default", UsageTotals::default());
        let records = compare(&usage, &QuotaBook::default(), false);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mode, ReportMode::UsageOnlyNoQuotaDefined);
        assert!(records[0].quota.is_none());
    }

    #[test]
    fn test_tag_mode_without_quota() {
        let usage = usage_with("ClientB", UsageTotals::default());
        let records = compare(&usage, &QuotaBook::default(), true);
        assert_eq!(records[0].mode, ReportMode::UsageOnlyNoQuotaForClient);
    }

    #[test]
    fn test_quota_wins_in_either_mode() {
        let mut quotas = QuotaBook::default();
        quotas.insert("ClientA", ClientQuota::default());
        let usage = usage_with("ClientA", UsageTotals::default());

        for mode in [false, true] {
            let records = compare(&usage, &quotas, mode);
            assert_eq!(records[0].mode, ReportMode::UsageVsQuota);
        }
    }

    #[test]
    fn test_comparison_scenario() {
        let mut quotas = QuotaBook::default();
        quotas.insert(
            "ClientA",
            ClientQuota {
                core_hours: 10000.0,
                data_out_gb: 100.0,
                data_in_gb: 500.0,
                disk_storage_gb: 1000.0,
                blob_storage_gb: 500.0,
            },
        );
        let usage = usage_with(
            "ClientA",
            UsageTotals {
                core_hours: 9500.0,
                data_out_gb: 80.0,
                data_in_gb: 400.0,
                disk_storage_gb: 900.0,
                blob_storage_gb: 450.0,
            },
        );

        let records = compare(&usage, &quotas, true);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.mode, ReportMode::UsageVsQuota);
        assert_eq!(record.usage.core_hours, 9500.0);
        assert_eq!(record.quota.unwrap().core_hours, 10000.0);

        let remaining = record.remaining.unwrap();
        assert_eq!(remaining.core_hours, 500.0);
        assert_eq!(remaining.data_out_gb, 20.0);
        assert_eq!(remaining.data_in_gb, 100.0);
        assert_eq!(remaining.disk_storage_gb, 100.0);
        assert_eq!(remaining.blob_storage_gb, 50.0);
    }

    #[test]
    fn test_every_usage_client_gets_a_record() {
        let mut usage = ClientUsage::new();
        usage.totals_mut("A");
        usage.totals_mut("B");
        usage.totals_mut("C");

        let mut quotas = QuotaBook::default();
        quotas.insert("B", ClientQuota::default());
        // A quota-only client never appears in the report
        quotas.insert("Ghost", ClientQuota::default());

        let records = compare(&usage, &quotas, true);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| usage.get(&r.client).is_some()));
    }
}
