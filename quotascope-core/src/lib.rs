// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Quotascope Core
//!
//! Core types, models, and traits for the Quotascope reporting tool.
//!
//! This crate provides the foundational abstractions used across all other
//! Quotascope crates, including:
//!
//! - Domain models (resources, usage rows, quotas, report records)
//! - Error types
//! - Trait definitions for the external collaborators (token provider,
//!   cost query, usage detail retrieval, inventory listings)
//!
//! ## Key Types
//!
//! ### Inventory Types
//! - [`ResourceRecord`] - One discovered compute or storage resource
//! - [`ResourceKind`] - VM, scale set, storage account, or managed disk
//! - [`ResourceGroupFilter`] - Optional resource-group allow-list
//!
//! ### Usage Types
//! - [`UsageRow`] - The canonical usage record every source normalizes into
//! - [`ClientUsage`] - Accumulated per-client totals
//! - [`UsageTotals`] - The five tracked metrics for one client
//! - [`ClientKeyPolicy`] - How rows are assigned to a client key
//!
//! ### Quota & Report Types
//! - [`ClientQuota`] - Configured ceilings for one client
//! - [`ReportRecord`] - One report line per client
//! - [`ReportMode`] - Which comparison branch produced the record
//!
//! ### Time
//! - [`DateRange`] - Validated report period

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Inventory types
    ResourceGroupFilter,
    ResourceKind,
    ResourceRecord,
    // Usage types
    ClientKeyPolicy,
    ClientUsage,
    UsageRow,
    UsageTotals,
    CLIENT_TAG,
    METER_NETWORKING,
    METER_STORAGE,
    METER_VIRTUAL_MACHINES,
    UNKNOWN_CLIENT,
    // Quota & report types
    ClientQuota,
    Remaining,
    ReportMode,
    ReportRecord,
    // Time
    DateRange,
};

// Re-export collaborator traits and their data shapes
pub use traits::{
    ComputeInventoryApi, ContainerStats, CostQueryApi, CostQueryRequest, CostQueryResponse,
    CostRow, DiskInfo, ScaleSetInfo, SkuCatalogSource, StorageAccountInfo, StorageInventoryApi,
    TokenProvider, UsageDetail, UsageDetailApi, VmInfo, VmSizeInfo,
};
