//! MiCam CLI - Command-line tool for dashcam configuration
//!
//! Reads and writes settings through the device's Config.cgi endpoint.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use micam_client::{CancellationToken, DeviceConfigClient};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ArgOverrides, Config};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "micam-cli")]
#[command(author, version, about = "MiCam Dashcam Configuration CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Config.cgi URI of the device
    #[arg(short, long, env = "MICAM_DEVICE")]
    device: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "MICAM_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum attempts per request
    #[arg(long)]
    retries: Option<u32>,

    /// Wait between failed attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read device properties
    Get {
        /// Property name(s), e.g. Camera.Menu.VideoRes
        #[arg(required = true)]
        properties: Vec<String>,
    },

    /// Write a device property
    Set {
        /// Property name
        property: String,

        /// New value, sent verbatim
        value: String,
    },

    /// Issue a request to an arbitrary endpoint and parse the answer
    Request {
        /// Absolute URI, device path (/cgi-bin/...) or query (?action=...)
        uri: String,
    },

    /// Send a single attempt and print the raw answer
    Raw {
        /// Absolute URI, device path (/cgi-bin/...) or query (?action=...)
        uri: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        device: cli.device.as_deref(),
        retries: cli.retries,
        retry_delay_ms: cli.retry_delay_ms,
        timeout_ms: cli.timeout_ms,
        no_color: cli.no_color,
    });
    debug!("Resolved client config: {:?}", merged.client);

    let ctx = OutputContext::new(cli.output, merged.no_color, cli.quiet);

    let client =
        DeviceConfigClient::from_config(merged.client).context("Failed to create device client")?;

    // Ctrl-C aborts the in-flight request, including a pending retry
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel())?;

    match &cli.command {
        Commands::Get { properties } => {
            commands::get(&client, properties, &cancel, &ctx).await?;
        }

        Commands::Set { property, value } => {
            commands::set(&client, property, value, &cancel, &ctx).await?;
        }

        Commands::Request { uri } => {
            commands::request(&client, uri, &cancel, &ctx).await?;
        }

        Commands::Raw { uri } => {
            commands::raw(&client, uri, &cancel, &ctx).await?;
        }
    }

    Ok(())
}
