//! # Get Subcommand
//!
//! Fetches a configuration document and prints it as pretty JSON. With
//! `--validate` the schema is loaded first and an invalid document is
//! reported instead of printed.

use anyhow::{Context, Result};
use clap::Args;

use cfgsvc_client::{ConfigSdk, GetOptions, SdkError};

use crate::document::{print_failures, print_json};

/// Arguments for the `cfgsvc get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Validate the fetched document against its schema.
    #[arg(long)]
    pub validate: bool,
}

/// Execute the get subcommand.
pub async fn run_get(args: &GetArgs, sdk: &ConfigSdk) -> Result<u8> {
    let mut options = GetOptions::FRESH;
    if args.validate {
        sdk.load_schema(&args.name)
            .await
            .with_context(|| format!("failed to load schema for {}", args.name))?;
        options = options.validated();
    }

    match sdk.get(&args.name, options).await {
        Ok(doc) => {
            print_json(&doc)?;
            Ok(0)
        }
        Err(SdkError::Validation { name, errors }) => {
            print_failures(&format!("{name} does not match its schema"), &errors);
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("failed to fetch {}", args.name)),
    }
}
