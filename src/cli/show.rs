//! Show command: print the stripped config tree or one section of it.

use super::Context;
use crate::config::Config;
use crate::format::{OutputFormat, format_tree};
use anyhow::{Context as _, Result};
use clap::Args;
use tracing::warn;

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Top-level section to print (default: whole config)
    pub key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Run the show command.
pub fn run_show(ctx: &Context, args: &ShowArgs) -> Result<()> {
    let config = Config::load(&ctx.config_dir, ctx.schema.clone(), ctx.defaults.clone())
        .with_context(|| format!("Failed to load config from {}", ctx.config_dir.display()))?;
    if !config.is_valid() {
        warn!("Showing config that failed validation; run 'check' for details");
    }

    let value = config.get(args.key.as_deref())?;
    print!("{}", format_tree(value, args.format));
    Ok(())
}
