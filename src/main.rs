//! protoobj - run an object-model scenario and print the resulting objects

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use protoobj::{scenario, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Object runtime scenario runner
#[derive(Parser, Debug)]
#[command(
    name = "protoobj",
    version,
    about = "Derive classes, create instances and report their state as JSON"
)]
struct Args {
    /// TOML file describing classes and instances
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    if let Some(path) = &args.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let config = Config::load(args.config.as_deref())
        .map_err(|e| anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    let report = scenario::run(&config)?;
    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

/// Initialize tracing on stderr so stdout carries only the report
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
