//! Domain models for Quotascope.
//!
//! This module contains all model types organized by area:
//! - [`resource`] - Discovered inventory records
//! - [`usage`] - Canonical usage rows and per-client accumulation
//! - [`quota`] - Configured per-client ceilings
//! - [`report`] - Report records and comparison modes
//! - [`range`] - The validated report period

pub mod quota;
pub mod range;
pub mod report;
pub mod resource;
pub mod usage;

pub use quota::ClientQuota;
pub use range::DateRange;
pub use report::{Remaining, ReportMode, ReportRecord};
pub use resource::{ResourceGroupFilter, ResourceKind, ResourceRecord};
pub use usage::{
    ClientKeyPolicy, ClientUsage, UsageRow, UsageTotals, CLIENT_TAG, METER_NETWORKING,
    METER_STORAGE, METER_VIRTUAL_MACHINES, UNKNOWN_CLIENT,
};
