//! # Schema Subcommand
//!
//! Loads and prints a schema, followed by lint warnings for constraints no
//! value could satisfy.

use anyhow::{Context, Result};
use clap::Args;

use cfgsvc_client::ConfigSdk;

use crate::document::print_json;

/// Arguments for the `cfgsvc schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Configuration name.
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Execute the schema subcommand. Lint warnings do not change the exit code.
pub async fn run_schema(args: &SchemaArgs, sdk: &ConfigSdk) -> Result<u8> {
    let schema = sdk
        .load_schema(&args.name)
        .await
        .with_context(|| format!("failed to load schema for {}", args.name))?;
    print_json(&schema)?;
    for warning in schema.lint() {
        eprintln!("WARN: {warning}");
    }
    Ok(0)
}
