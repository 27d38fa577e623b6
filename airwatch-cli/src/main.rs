//! Binary crate for the `airwatch` command-line dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and location picking
//! - Human-friendly output formatting
//!
//! # Environment Variables
//! - `AIRWATCH_API_BASE` (optional) – backend base URL, same as `--api-base`
//! - `AIRWATCH_LOG_LEVEL` (optional) – log verbosity when `RUST_LOG` is unset (default: `warn`)

use std::{env, io::IsTerminal};

use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

mod cli;
mod notify;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

/// Install the global subscriber. Logs go to stderr so they never mix with
/// the dashboard printed on stdout.
fn init_tracing() {
    // Use RUST_LOG if available, otherwise fall back to AIRWATCH_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AIRWATCH_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
