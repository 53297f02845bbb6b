// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Quotascope Azure
//!
//! Azure Resource Manager (ARM) implementations of the Quotascope
//! collaborator traits:
//!
//! - [`auth`] - Token providers: a static/env token and an OAuth2
//!   client-credentials flow against the Microsoft identity platform
//! - [`client::ArmClient`] - Wrapped HTTP client with bearer injection,
//!   api-version handling, and `nextLink` paging
//! - [`cost::CostManagementQuery`] - Cost Management `query` endpoint
//! - [`consumption::ConsumptionUsageDetails`] - Consumption `usageDetails`
//! - [`commerce::CommerceUsageAggregates`] - Legacy commerce `UsageAggregates`
//! - [`compute::ComputeInventory`] - VM, scale set, and VM size listings
//! - [`storage::StorageInventory`] - Storage account, container, and disk
//!   listings

pub mod auth;
pub mod client;
pub mod commerce;
pub mod compute;
pub mod consumption;
pub mod cost;
pub mod error;
pub mod storage;
mod wire;

pub use auth::{ClientSecretCredentials, ClientSecretTokenProvider, StaticTokenProvider};
pub use client::ArmClient;
pub use commerce::CommerceUsageAggregates;
pub use compute::ComputeInventory;
pub use consumption::ConsumptionUsageDetails;
pub use cost::CostManagementQuery;
pub use error::AzureError;
pub use storage::StorageInventory;
