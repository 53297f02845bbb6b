// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Quotascope CLI - per-client usage reporting against configured quotas.
//!
//! # Examples
//!
//! ```bash
//! # Overall usage report for the current month
//! quotascope
//!
//! # Per-client report grouped by the "Client" resource tag
//! quotascope report --client-tags
//!
//! # Explicit period and resource-group allow-list
//! quotascope report --from 2026-07-01 --to 2026-07-31 --resource-groups rg-prod,rg-dev
//!
//! # JSON output
//! quotascope report --format json --pretty
//!
//! # Show the discovered resource catalog
//! quotascope inventory
//!
//! # Show the configured quotas
//! quotascope quotas
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quotascope_core::CoreError;

use commands::{inventory, quotas, report, AuthMissing};

// ============================================================================
// CLI Definition
// ============================================================================

/// Quotascope CLI - subscription usage vs. quota reporting.
#[derive(Parser)]
#[command(name = "quotascope")]
#[command(about = "Per-client cloud usage reporting against configured quotas")]
#[command(long_about = r"
Quotascope builds a per-client usage report for one subscription, comparing
consumption over a date range against configured quotas.

Usage data is acquired through a fallback cascade: the cost query API first,
then detail-record retrieval, then the legacy usage store, and finally a
synthetic estimate derived from the live resource inventory, so a report is
produced even when the billing APIs are unavailable.

Credentials (first match wins):
  QUOTASCOPE_ACCESS_TOKEN                            pre-acquired ARM token
  AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET  service principal

Examples:
  quotascope                                  # current month, overall
  quotascope report --client-tags             # group by the Client tag
  quotascope report --from 2026-07-01 --to 2026-07-31
  quotascope report --format json --pretty
  quotascope inventory                        # discovered resources
  quotascope quotas                           # configured quotas
")]
#[command(version)]
#[command(author = "Quotascope Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'report' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subscription id (defaults to AZURE_SUBSCRIPTION_ID).
    #[arg(long, short, global = true)]
    pub subscription: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Build the usage report (default if no command specified).
    #[command(visible_alias = "r")]
    Report(report::ReportArgs),

    /// Show the discovered resource inventory.
    #[command(visible_alias = "i")]
    Inventory(inventory::InventoryArgs),

    /// Show the configured quota book.
    #[command(visible_alias = "q")]
    Quotas(quotas::QuotasArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No usable credentials.
    AuthMissing = 2,
    /// Invalid arguments (e.g., inverted date range).
    InvalidArguments = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("quotascope=debug,info")
    } else {
        EnvFilter::new("quotascope=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Report(args)) => report::run(args, &cli).await,
        Some(Commands::Inventory(args)) => inventory::run(args, &cli).await,
        Some(Commands::Quotas(args)) => quotas::run(args, &cli),
        None => report::run(&report::ReportArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

/// Maps an error to the documented exit codes.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    if error.downcast_ref::<AuthMissing>().is_some() {
        return ExitCode::AuthMissing;
    }
    if matches!(
        error.downcast_ref::<CoreError>(),
        Some(CoreError::InvalidDateRange { .. })
    ) {
        return ExitCode::InvalidArguments;
    }
    ExitCode::Error
}
