//! CLI command implementations.

pub mod inventory;
pub mod quotas;
pub mod report;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, warn};

use quotascope_core::{DateRange, TokenProvider};
use quotascope_azure::{ClientSecretCredentials, ClientSecretTokenProvider, StaticTokenProvider};

// ============================================================================
// Credentials
// ============================================================================

/// Error marker for "no usable credentials", mapped to its own exit code.
#[derive(Debug)]
pub struct AuthMissing;

impl fmt::Display for AuthMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no credentials found; set {} or AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET",
            quotascope_azure::auth::TOKEN_ENV
        )
    }
}

impl std::error::Error for AuthMissing {}

/// Builds a token provider from the environment, static token first.
pub fn token_provider() -> Result<Arc<dyn TokenProvider>, AuthMissing> {
    if let Some(provider) = StaticTokenProvider::from_env() {
        debug!("Using pre-acquired token from environment");
        return Ok(Arc::new(provider));
    }
    if let Some(creds) = ClientSecretCredentials::from_env() {
        debug!(client_id = %creds.client_id, "Using client-credentials flow");
        return Ok(Arc::new(ClientSecretTokenProvider::new(creds)));
    }
    Err(AuthMissing)
}

/// Resolves the subscription id from the flag or environment.
pub fn subscription_id(arg: Option<&String>) -> Result<String> {
    if let Some(sub) = arg.filter(|s| !s.trim().is_empty()) {
        return Ok(sub.clone());
    }
    std::env::var("AZURE_SUBSCRIPTION_ID")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("no subscription id; pass --subscription or set AZURE_SUBSCRIPTION_ID"))
}

// ============================================================================
// Date range
// ============================================================================

/// Resolves the report period.
///
/// Defaults to the first day of the current month through today. An inverted
/// range is fatal; an end date in the future is only worth a warning.
pub fn resolve_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<DateRange> {
    let today = Local::now().date_naive();
    let month_start = today.with_day(1).expect("day 1 is always valid");

    let range = DateRange::new(from.unwrap_or(month_start), to.unwrap_or(today))?;
    if range.ends_in_future() {
        warn!(range = %range, "Report period ends in the future");
    }
    Ok(range)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_explicit() {
        let range = resolve_range(Some(date(2026, 7, 1)), Some(date(2026, 7, 31))).unwrap();
        assert_eq!(range.total_hours(), 720.0);
    }

    #[test]
    fn test_resolve_range_inverted_is_fatal() {
        let result = resolve_range(Some(date(2026, 8, 1)), Some(date(2026, 7, 1)));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_range_defaults_to_current_month() {
        let range = resolve_range(None, None).unwrap();
        assert_eq!(range.start().day(), 1);
        assert!(range.start() <= range.end());
    }

    #[test]
    fn test_subscription_id_prefers_flag() {
        let sub = subscription_id(Some(&"sub-42".to_string())).unwrap();
        assert_eq!(sub, "sub-42");
    }
}
