//! # CRUD Subcommand
//!
//! Prints the CRUD rules for a configuration. `--check` also loads the
//! schema and lists every inconsistency between the two.

use anyhow::{Context, Result};
use clap::Args;

use cfgsvc_client::{check_consistency, ConfigSdk};

use crate::document::print_json;

/// Arguments for the `cfgsvc crud` subcommand.
#[derive(Args, Debug)]
pub struct CrudArgs {
    /// Configuration name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Check the rules against the configuration's schema.
    #[arg(long)]
    pub check: bool,
}

/// Execute the crud subcommand.
///
/// Returns 1 when `--check` finds issues.
pub async fn run_crud(args: &CrudArgs, sdk: &ConfigSdk) -> Result<u8> {
    let crud = sdk
        .get_crud(&args.name)
        .await
        .with_context(|| format!("failed to fetch CRUD rules for {}", args.name))?;
    print_json(&crud)?;

    if !args.check {
        return Ok(0);
    }

    let schema = sdk
        .load_schema(&args.name)
        .await
        .with_context(|| format!("failed to load schema for {}", args.name))?;
    let issues = check_consistency(&crud, &schema);
    if issues.is_empty() {
        println!("OK: CRUD rules for {} match the schema", args.name);
        Ok(0)
    } else {
        println!("FAIL: {} CRUD consistency issue(s) for {}", issues.len(), args.name);
        for issue in &issues {
            println!("  - {issue}");
        }
        Ok(1)
    }
}
