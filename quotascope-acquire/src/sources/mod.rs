//! The four acquisition sources, in cascade order.

mod cost_query;
mod details;
mod estimate;
mod legacy;

pub use cost_query::CostQuerySource;
pub use details::UsageDetailsSource;
pub use estimate::{InventoryEstimateSource, MAX_ESTIMATE_HOURS};
pub use legacy::LegacyUsageSource;
