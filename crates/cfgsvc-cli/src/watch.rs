//! # Watch Subcommand
//!
//! Polls a configuration and prints each changed document as pretty JSON.
//! Poll errors go to stderr and polling continues. Ctrl-C stops the watcher
//! and tears the SDK down.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use cfgsvc_client::ConfigSdk;

/// Arguments for the `cfgsvc watch` subcommand.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Configuration name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Seconds between polls.
    #[arg(long, default_value_t = 5, value_name = "SECS")]
    pub interval_secs: u64,
}

/// Execute the watch subcommand until Ctrl-C.
pub async fn run_watch(args: &WatchArgs, sdk: &ConfigSdk) -> Result<u8> {
    run_watch_until(args, sdk, async {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")
    })
    .await
}

/// Execute the watch subcommand until `shutdown` resolves.
pub async fn run_watch_until<F>(args: &WatchArgs, sdk: &ConfigSdk, shutdown: F) -> Result<u8>
where
    F: Future<Output = Result<()>>,
{
    let name = args.name.clone();
    let handle = sdk.watch(
        &args.name,
        move |event| match event {
            Ok(doc) => match serde_json::to_string_pretty(&doc) {
                Ok(text) => println!("{text}"),
                Err(e) => tracing::warn!(config = %name, "failed to encode document: {e}"),
            },
            Err(e) => eprintln!("ERROR: {e}"),
        },
        Duration::from_secs(args.interval_secs),
    );

    let outcome = shutdown.await;
    handle.stop();
    sdk.destroy();
    outcome?;
    Ok(0)
}
