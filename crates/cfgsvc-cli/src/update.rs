//! # Update and Patch Subcommands
//!
//! `update` replaces a document wholesale from a local JSON file. `patch`
//! sends only the given keys, built from `--set KEY=VALUE` pairs or a file.
//!
//! Both validate by default: the schema is loaded, then the document (for
//! `patch`, the current document with the changes merged over it) must pass
//! before anything is sent. `--no-validate` skips the schema entirely.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};

use cfgsvc_client::{ConfigDocument, ConfigSdk, SdkError, UpdateOptions};

use crate::document::{assignments_to_document, print_failures, print_json, read_document};

/// Arguments for the `cfgsvc update` subcommand.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Configuration name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// JSON file holding the full replacement document.
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Send without validating against the schema.
    #[arg(long)]
    pub no_validate: bool,
}

/// Arguments for the `cfgsvc patch` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("changes").required(true).args(["set", "file"])))]
pub struct PatchArgs {
    /// Configuration name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Key to change. VALUE is parsed as JSON, falling back to a string.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// JSON file holding the keys to change.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Send without validating against the schema.
    #[arg(long)]
    pub no_validate: bool,
}

impl PatchArgs {
    /// The partial document described by `--set` or `--file`.
    pub fn changes(&self) -> Result<ConfigDocument> {
        match &self.file {
            Some(path) => read_document(path),
            None => assignments_to_document(&self.set),
        }
    }
}

/// Execute the update subcommand.
pub async fn run_update(args: &UpdateArgs, sdk: &ConfigSdk) -> Result<u8> {
    let data = read_document(&args.file)?;
    let options = prepare(sdk, &args.name, args.no_validate).await?;
    let result = sdk.update(&args.name, &data, options).await;
    report(&args.name, "update", result)
}

/// Execute the patch subcommand.
pub async fn run_patch(args: &PatchArgs, sdk: &ConfigSdk) -> Result<u8> {
    let changes = args.changes()?;
    let options = prepare(sdk, &args.name, args.no_validate).await?;
    let result = sdk.patch(&args.name, &changes, options).await;
    report(&args.name, "patch", result)
}

async fn prepare(sdk: &ConfigSdk, name: &str, no_validate: bool) -> Result<UpdateOptions> {
    if no_validate {
        return Ok(UpdateOptions::default());
    }
    sdk.load_schema(name)
        .await
        .with_context(|| format!("failed to load schema for {name}"))?;
    Ok(UpdateOptions::validated())
}

fn report(name: &str, action: &str, result: Result<ConfigDocument, SdkError>) -> Result<u8> {
    match result {
        Ok(doc) => {
            tracing::info!(config = name, action, "configuration written");
            print_json(&doc)?;
            Ok(0)
        }
        Err(SdkError::Validation { errors, .. }) => {
            print_failures(&format!("{action} of {name} rejected by schema"), &errors);
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("{action} of {name} failed")),
    }
}
