//! Inventory command - discover and print the resource catalog.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use quotascope_azure::{ArmClient, ComputeInventory, StorageInventory};
use quotascope_core::ResourceGroupFilter;
use quotascope_inventory::{Inventory, SkuResolver};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

use super::{subscription_id, token_provider};

/// Arguments for the inventory command.
#[derive(Args, Default)]
pub struct InventoryArgs {
    /// Comma-separated resource-group allow-list.
    #[arg(long)]
    pub resource_groups: Option<String>,
}

/// Runs the inventory command.
pub async fn run(args: &InventoryArgs, cli: &Cli) -> Result<()> {
    let subscription = subscription_id(cli.subscription.as_ref())?;
    let tokens = token_provider()?;
    let filter = args
        .resource_groups
        .as_deref()
        .and_then(ResourceGroupFilter::parse);

    info!(subscription = %subscription, "Discovering inventory");

    let arm = Arc::new(ArmClient::new(tokens, subscription));
    let compute = Arc::new(ComputeInventory::new(Arc::clone(&arm)));
    let storage = Arc::new(StorageInventory::new(Arc::clone(&arm)));
    let mut resolver = SkuResolver::new(
        Arc::clone(&compute) as Arc<dyn quotascope_core::SkuCatalogSource>,
        Vec::new(),
    );
    let inventory = Inventory::discover(compute, storage, &mut resolver, filter.as_ref()).await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_inventory(&inventory));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_inventory(&inventory)?);
        }
    }

    Ok(())
}
