//! # cfgsvc CLI entry point
//!
//! Parses command-line arguments, installs logging, builds the SDK from the
//! connection flags, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cfgsvc_cli::crud::{run_crud, CrudArgs};
use cfgsvc_cli::get::{run_get, GetArgs};
use cfgsvc_cli::schema::{run_schema, SchemaArgs};
use cfgsvc_cli::update::{run_patch, run_update, PatchArgs, UpdateArgs};
use cfgsvc_cli::validate::{run_validate, ValidateArgs};
use cfgsvc_cli::watch::{run_watch, WatchArgs};
use cfgsvc_cli::ServiceArgs;

/// Configuration service client.
///
/// Reads, writes, validates, and watches named configuration documents on a
/// remote configuration service.
#[derive(Parser, Debug)]
#[command(name = "cfgsvc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a configuration document.
    Get(GetArgs),

    /// Replace a configuration document from a JSON file.
    Update(UpdateArgs),

    /// Change selected keys of a configuration document.
    Patch(PatchArgs),

    /// Show CRUD rules, optionally checked against the schema.
    Crud(CrudArgs),

    /// Show a schema and its lint warnings.
    Schema(SchemaArgs),

    /// Validate a local JSON document against a remote schema.
    Validate(ValidateArgs),

    /// Print every change to a configuration until interrupted.
    Watch(WatchArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries command output.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "cfgsvc CLI starting");

    let result = match cli.service.connect() {
        Ok(sdk) => {
            tracing::debug!(base_url = %sdk.base_url(), "connected");
            match &cli.command {
                Commands::Get(args) => run_get(args, &sdk).await,
                Commands::Update(args) => run_update(args, &sdk).await,
                Commands::Patch(args) => run_patch(args, &sdk).await,
                Commands::Crud(args) => run_crud(args, &sdk).await,
                Commands::Schema(args) => run_schema(args, &sdk).await,
                Commands::Validate(args) => run_validate(args, &sdk).await,
                Commands::Watch(args) => run_watch(args, &sdk).await,
            }
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
