//! Usage source trait and types.
//!
//! A source represents one method of obtaining usage rows for a report
//! period. Sources are tried strictly in cascade order by the pipeline;
//! each is attempted only if the prior one failed or returned an unusable
//! result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use quotascope_core::{DateRange, ResourceGroupFilter, UsageRow};

use crate::context::AcquireContext;
use crate::error::AcquireError;

// ============================================================================
// Source Kind
// ============================================================================

/// The kind of data source a usage source reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Structured, grouped billing/cost query.
    CostQuery,
    /// Detail-record retrieval from the consumption store.
    UsageDetails,
    /// Detail-record retrieval from the legacy commerce store.
    LegacyUsage,
    /// Synthetic estimation from the discovered inventory.
    InventoryEstimate,
}

impl SourceKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CostQuery => "Cost Query",
            Self::UsageDetails => "Usage Details",
            Self::LegacyUsage => "Legacy Usage",
            Self::InventoryEstimate => "Inventory Estimate",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Acquired Usage
// ============================================================================

/// The result of a successful acquisition.
#[derive(Debug, Clone)]
pub struct AcquiredUsage {
    /// The normalized usage rows.
    pub rows: Vec<UsageRow>,
    /// The source that produced them.
    pub source_id: String,
    /// The kind of source used.
    pub kind: SourceKind,
}

impl AcquiredUsage {
    /// Creates an acquisition result.
    pub fn new(rows: Vec<UsageRow>, source_id: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            rows,
            source_id: source_id.into(),
            kind,
        }
    }

    /// True if every row was synthesized rather than billed.
    pub fn is_estimated(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.estimated)
    }
}

// ============================================================================
// Usability
// ============================================================================

/// Whether a result set can drive aggregation.
///
/// A result is unusable if it is empty or its first row lacks a meter
/// category; either way the cascade advances to the next source.
pub fn result_is_usable(rows: &[UsageRow]) -> bool {
    rows.first()
        .is_some_and(|row| !row.meter_category.trim().is_empty())
}

// ============================================================================
// Usage Source Trait
// ============================================================================

/// One method of acquiring usage rows.
///
/// ## Implementing a Source
///
/// ```ignore
/// struct CostQuerySource;
///
/// #[async_trait]
/// impl UsageSource for CostQuerySource {
///     fn id(&self) -> &str {
///         "billing.cost_query"
///     }
///
///     fn kind(&self) -> SourceKind {
///         SourceKind::CostQuery
///     }
///
///     async fn acquire(
///         &self,
///         ctx: &AcquireContext,
///         range: &DateRange,
///         filter: Option<&ResourceGroupFilter>,
///     ) -> Result<Vec<UsageRow>, AcquireError> {
///         let response = ctx.cost.query(&request).await?;
///         Ok(normalize::rows_from_cost_response(&response, &ctx.settings.keying))
///     }
/// }
/// ```
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Unique identifier for this source (e.g., "billing.cost_query").
    fn id(&self) -> &str;

    /// The kind of data source this reads.
    fn kind(&self) -> SourceKind;

    /// Human-readable name for this source.
    fn display_name(&self) -> String {
        format!("{} ({})", self.id(), self.kind().display_name())
    }

    /// Whether this source ends the cascade unconditionally.
    ///
    /// A terminal source's result is accepted even when unusable, so the
    /// cascade is guaranteed to produce a result, however empty, from its
    /// last source.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Acquires normalized usage rows for the period.
    async fn acquire(
        &self,
        ctx: &AcquireContext,
        range: &DateRange,
        filter: Option<&ResourceGroupFilter>,
    ) -> Result<Vec<UsageRow>, AcquireError>;
}

// ============================================================================
// Tests
// ============================================================================
