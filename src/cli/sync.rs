//! Sync command: write recognized environment variables into the config files.

use super::Context;
use super::check::{CheckArgs, run_check};
use crate::config::{EnvSource, ProcessEnv, sync_env_overlay};
use anyhow::{Context as _, Result};
use clap::Args;

/// Arguments for the sync command.
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Skip validating the directory after the overlay is written.
    #[arg(long)]
    pub no_check: bool,
}

/// Run the sync command against the process environment. Returns whether the
/// resulting config is valid (always true with `--no-check`).
pub fn run_sync(ctx: &Context, args: &SyncArgs) -> Result<bool> {
    run_sync_with(ctx, args, &ProcessEnv)
}

/// Run the sync command reading variables from `env`.
pub fn run_sync_with(ctx: &Context, args: &SyncArgs, env: &impl EnvSource) -> Result<bool> {
    let outcome = sync_env_overlay(&ctx.config_dir, &ctx.schema, env).with_context(|| {
        format!(
            "Failed to apply environment overlay to {}",
            ctx.config_dir.display()
        )
    })?;

    if outcome.is_empty() {
        println!("No recognized environment variables set; nothing written.");
    }
    for file in &outcome.files {
        println!(
            "Updated {} ({}: {})",
            file.path.display(),
            file.target,
            file.keys.join(", ")
        );
    }

    if args.no_check {
        return Ok(true);
    }
    run_check(ctx, &CheckArgs::default())
}
