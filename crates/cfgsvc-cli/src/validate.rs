//! # Validate Subcommand
//!
//! Validates a local JSON document against the remote schema without
//! sending it anywhere.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cfgsvc_client::ConfigSdk;

use crate::document::{print_failures, read_document};

/// Arguments for the `cfgsvc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration name whose schema applies.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// JSON document to check.
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when valid, 1 when the document has errors.
pub async fn run_validate(args: &ValidateArgs, sdk: &ConfigSdk) -> Result<u8> {
    let data = read_document(&args.file)?;
    sdk.load_schema(&args.name)
        .await
        .with_context(|| format!("failed to load schema for {}", args.name))?;

    let result = sdk.validate(&data, &args.name);
    if result.valid {
        println!("OK: {} is valid against schema {}", args.file.display(), args.name);
        Ok(0)
    } else {
        print_failures(
            &format!("{} is invalid against schema {}", args.file.display(), args.name),
            &result.errors,
        );
        Ok(1)
    }
}
