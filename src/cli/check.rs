//! Check command: load the config directory and report validation issues.

use super::Context;
use crate::config::Config;
use crate::format::{OutputFormat, format_issues};
use anyhow::{Context as _, Result};
use clap::Args;

/// Arguments for the check command.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Issue output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Run the check command. Returns whether the config is valid.
pub fn run_check(ctx: &Context, args: &CheckArgs) -> Result<bool> {
    let config = Config::load(&ctx.config_dir, ctx.schema.clone(), ctx.defaults.clone())
        .with_context(|| format!("Failed to load config from {}", ctx.config_dir.display()))?;

    if config.is_valid() {
        println!("Config in '{}' is valid.", ctx.config_dir.display());
    } else {
        println!(
            "Config in '{}' is invalid ({} issue(s)):",
            ctx.config_dir.display(),
            config.issues().len()
        );
        print!("{}", format_issues(config.issues(), args.format));
    }
    Ok(config.is_valid())
}
