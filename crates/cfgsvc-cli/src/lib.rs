//! # cfgsvc-cli -- Command-line front end for the configuration service
//!
//! Provides the `cfgsvc` binary on top of [`cfgsvc_client::ConfigSdk`].
//!
//! ## Subcommands
//!
//! - `cfgsvc get` -- Fetch and print a configuration document.
//! - `cfgsvc update` -- Replace a document from a local JSON file.
//! - `cfgsvc patch` -- Partially update a document.
//! - `cfgsvc crud` -- Print CRUD rules, optionally checked against the schema.
//! - `cfgsvc schema` -- Print a schema and its lint warnings.
//! - `cfgsvc validate` -- Validate a local document against the remote schema.
//! - `cfgsvc watch` -- Print every change to a document until Ctrl-C.
//!
//! Every handler returns an exit code: 0 on success, 1 when the operation
//! ran but failed (invalid document, consistency issues). Errors bubble up
//! as `anyhow::Error` and `main` maps them to 1.
//!
//! ```bash
//! cfgsvc --base-url http://localhost:3000/api get display
//! cfgsvc patch display --set brightness=80 --set mode='"night"'
//! cfgsvc -H 'Authorization: Bearer abc' watch display --interval-secs 2
//! ```

pub mod crud;
pub mod document;
pub mod get;
pub mod schema;
pub mod update;
pub mod validate;
pub mod watch;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use cfgsvc_client::{config::parse_header_pair, ConfigSdk, SdkOptions};

/// Connection flags shared by every subcommand. Each overrides the matching
/// `CFGSVC_*` environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Service base URL (env: CFGSVC_BASE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (env: CFGSVC_TIMEOUT_SECS).
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Extra request header. Repeatable.
    #[arg(short = 'H', long = "header", global = true, value_name = "NAME: VALUE")]
    pub headers: Vec<String>,
}

impl ServiceArgs {
    /// Environment options with the flags applied on top.
    pub fn sdk_options(&self) -> Result<SdkOptions> {
        let mut options = SdkOptions::from_env().context("invalid CFGSVC_* environment")?;
        if let Some(base_url) = &self.base_url {
            options.base_url = base_url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            options.timeout = Duration::from_secs(secs);
        }
        for raw in &self.headers {
            let (name, value) = parse_header_pair(raw).context("invalid --header")?;
            options.headers.insert(name, value);
        }
        Ok(options)
    }

    /// Build an SDK from these flags.
    pub fn connect(&self) -> Result<ConfigSdk> {
        let options = self.sdk_options()?;
        ConfigSdk::new(options).context("failed to initialise configuration client")
    }
}
