// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Quotascope Inventory
//!
//! Resource inventory discovery and SKU resolution.
//!
//! This crate builds the authoritative in-memory catalog of compute and
//! storage resources for one report run:
//!
//! - [`sku::SkuResolver`] - Resolves a VM size name to a vCPU count using
//!   the authoritative per-region catalog first and a name heuristic as
//!   fallback. Resolution is total; every SKU yields a positive count.
//! - [`discover::Inventory`] - Discovers VMs, scale sets, storage accounts,
//!   and managed disks, optionally filtered by a resource-group allow-list,
//!   annotating each record with derived core and size metrics.
//!
//! Discovery degrades rather than fails: individual sub-resource errors are
//! logged and skipped, and a whole-category failure falls back to a small
//! static SKU table with zero discovered instances so the rest of the
//! reporting pipeline can proceed.

pub mod discover;
pub mod sku;

pub use discover::Inventory;
pub use sku::{SkuCoreTable, SkuResolver, DEFAULT_CORES};
