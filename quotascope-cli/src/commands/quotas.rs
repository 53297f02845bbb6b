//! Quotas command - print the configured quota book.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use quotascope_report::QuotaBook;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the quotas command.
#[derive(Args, Default)]
pub struct QuotasArgs {
    /// Quota configuration file (defaults to the user config directory).
    #[arg(long)]
    pub quota_file: Option<PathBuf>,
}

/// Runs the quotas command.
pub fn run(args: &QuotasArgs, cli: &Cli) -> Result<()> {
    let path = args
        .quota_file
        .clone()
        .unwrap_or_else(QuotaBook::default_path);
    let book = QuotaBook::load_from(&path)?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_quotas(&book, &path));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_quotas(&book)?);
        }
    }

    Ok(())
}
