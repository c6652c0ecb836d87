//! # bridge
//!
//! Operator console for the Bridge registry of namespaces and resources.
//!
//! This is the main entry point for the `bridge` binary. It parses the command
//! line, sets up logging and the panic hook, resolves configuration, and
//! dispatches to the command handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use bridge_core::error::{BridgeError, BridgeResult};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Browse and edit the Bridge resource registry
#[derive(Parser)]
#[command(name = "bridge", version, long_version = long_version(), about = "Bridge registry console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Use this file instead of searching for bridge.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

/// Fields of a resource given on the command line
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Provider identifier of the resource
    #[arg(long)]
    pub arn: Option<String>,

    /// Resource type, e.g. secret or queue
    #[arg(long = "type", value_name = "TYPE")]
    pub resource_type: Option<String>,

    /// Stored value
    #[arg(long)]
    pub value: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List namespaces
    Namespaces,
    /// List resources of a namespace
    List {
        /// Namespace to show (default: configured default or first)
        #[arg(short, long)]
        namespace: Option<String>,
        /// Only show resources whose name contains this term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one resource
    Get {
        name: String,
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Create a resource
    Add {
        name: String,
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Change fields of an existing resource
    Update {
        name: String,
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Delete a resource
    Delete {
        name: String,
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Create a namespace
    CreateNamespace { name: String },
    /// Interactive console
    Watch,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.global.verbose);
    setup_panic_handler();

    info!("Starting bridge v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> BridgeResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BridgeError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(&cli.global).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (built ",
        env!("BRIDGE_BUILD_DATE"),
        ", ",
        env!("BRIDGE_RUSTC_VERSION"),
        ")"
    )
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "bridge={level},bridge_core={level},bridge_config={level},bridge_registry={level},bridge_store={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("bridge encountered an unexpected error: {}", panic_info);
        eprintln!("bridge crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/bridge-registry/bridge/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
