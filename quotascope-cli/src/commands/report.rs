//! Report command - acquire usage, aggregate, and compare against quotas.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use tracing::{info, warn};

use quotascope_acquire::{AcquireContext, AcquireSettings, AcquisitionPipeline, SourceKind};
use quotascope_azure::{
    ArmClient, CommerceUsageAggregates, ComputeInventory, ConsumptionUsageDetails,
    CostManagementQuery, StorageInventory,
};
use quotascope_core::{ClientKeyPolicy, ResourceGroupFilter};
use quotascope_inventory::{Inventory, SkuResolver};
use quotascope_report::{compare, Aggregator, QuotaBook};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

use super::{resolve_range, subscription_id, token_provider};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Period start (YYYY-MM-DD); defaults to the first of the current month.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Period end (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Group usage by the "Client" resource tag instead of one overall bucket.
    #[arg(long)]
    pub client_tags: bool,

    /// Client name used for everything when not grouping by tags.
    #[arg(long, default_value = "Default")]
    pub default_client: String,

    /// Comma-separated resource-group allow-list.
    #[arg(long)]
    pub resource_groups: Option<String>,

    /// Include the per-category usage breakdown.
    #[arg(long)]
    pub detailed: bool,

    /// Quota configuration file (defaults to the user config directory).
    #[arg(long)]
    pub quota_file: Option<PathBuf>,

    /// Maximum detail records retrieved per billing source.
    #[arg(long, default_value = "1000")]
    pub max_records: u32,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            client_tags: false,
            default_client: "Default".to_string(),
            resource_groups: None,
            detailed: false,
            quota_file: None,
            max_records: 1000,
        }
    }
}

/// Runs the report command.
pub async fn run(args: &ReportArgs, cli: &Cli) -> Result<()> {
    let range = resolve_range(args.from, args.to)?;
    let subscription = subscription_id(cli.subscription.as_ref())?;
    let tokens = token_provider()?;
    let filter = args
        .resource_groups
        .as_deref()
        .and_then(ResourceGroupFilter::parse);

    info!(%range, subscription = %subscription, tag_mode = args.client_tags, "Building usage report");

    // Discovery
    let arm = Arc::new(ArmClient::new(tokens, subscription));
    let compute = Arc::new(ComputeInventory::new(Arc::clone(&arm)));
    let storage = Arc::new(StorageInventory::new(Arc::clone(&arm)));
    let mut resolver = SkuResolver::new(
        Arc::clone(&compute) as Arc<dyn quotascope_core::SkuCatalogSource>,
        Vec::new(),
    );
    let inventory = Arc::new(
        Inventory::discover(compute, storage, &mut resolver, filter.as_ref()).await,
    );

    // Acquisition
    let keying = if args.client_tags {
        ClientKeyPolicy::tagged()
    } else {
        ClientKeyPolicy::overall(args.default_client.clone())
    };
    let settings = AcquireSettings::with_keying(keying.clone())
        .with_max_detail_records(args.max_records.max(1));
    let ctx = AcquireContext::new(
        Arc::new(CostManagementQuery::new(Arc::clone(&arm))),
        Arc::new(ConsumptionUsageDetails::new(Arc::clone(&arm))),
        Arc::new(CommerceUsageAggregates::new(Arc::clone(&arm))),
        settings,
    );

    let pipeline = AcquisitionPipeline::standard(Arc::clone(&inventory));
    let outcome = pipeline.execute(&ctx, &range, filter.as_ref()).await;
    for attempt in &outcome.attempts {
        info!(
            source = %attempt.source_id,
            success = attempt.success,
            error = attempt.error.as_deref().unwrap_or(""),
            "Acquisition attempt"
        );
    }
    let acquired = match outcome.result {
        Ok(acquired) => acquired,
        Err(e) if inventory.is_empty() => {
            return Err(e).context("usage acquisition failed and no inventory to estimate from");
        }
        Err(e) => return Err(e).context("usage acquisition failed"),
    };
    let estimated = acquired.kind == SourceKind::InventoryEstimate;

    // Aggregation and comparison
    let aggregator = Aggregator::new(&inventory, inventory.sku_table(), keying);
    let aggregated = aggregator.aggregate(&acquired.rows);

    let quota_path = args
        .quota_file
        .clone()
        .unwrap_or_else(QuotaBook::default_path);
    let quotas = QuotaBook::load_from(&quota_path)?;

    let records = compare(&aggregated.usage, &quotas, args.client_tags);
    if records.is_empty() {
        warn!("Report is empty: no usage rows and no inventory-derived storage");
    }

    // Output
    let categories = args.detailed.then_some(&aggregated.by_category);
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_report(&records, &range, &acquired.source_id, estimated, categories)
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_report(&records, &range, &acquired.source_id, estimated, categories)?
            );
        }
    }

    Ok(())
}
