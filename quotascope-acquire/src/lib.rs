// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Quotascope Acquire
//!
//! Usage acquisition sources and the fallback pipeline that drives them.
//!
//! Usage data for a report period can come from several places of
//! decreasing fidelity. The pipeline tries them strictly in order and stops
//! at the first usable result:
//!
//! 1. [`sources::CostQuerySource`] - structured, grouped billing query
//! 2. [`sources::UsageDetailsSource`] - bounded detail-record retrieval
//! 3. [`sources::LegacyUsageSource`] - alternative detail-record store
//! 4. [`sources::InventoryEstimateSource`] - synthetic rows derived from
//!    the discovered inventory (terminal; always yields a result)
//!
//! ## Key Types
//!
//! - [`source::UsageSource`] - Trait one acquisition method implements
//! - [`pipeline::AcquisitionPipeline`] - Executes sources in order
//! - [`context::AcquireContext`] - Transports and settings for sources
//! - [`normalize`] - Maps every source's native shape into [`quotascope_core::UsageRow`]
//!
//! ## Example
//!
//! ```ignore
//! use quotascope_acquire::{AcquireContext, AcquisitionPipeline};
//!
//! let ctx = AcquireContext::new(cost, details, legacy, settings);
//! let pipeline = AcquisitionPipeline::standard(inventory);
//! let outcome = pipeline.execute(&ctx, &range, filter.as_ref()).await;
//! ```

pub mod context;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod sources;

// Re-export key types at crate root
pub use context::{AcquireContext, AcquireSettings};
pub use error::AcquireError;
pub use pipeline::{AcquireOutcome, AcquisitionPipeline, SourceAttempt};
pub use source::{result_is_usable, AcquiredUsage, SourceKind, UsageSource};
