//! Force-login gateway (v1)
//!
//! Sits in front of a storefront and sends anonymous visitors to the login
//! page unless the requested path is whitelisted.
//!
//! # Architecture Overview
//!
//! ```text
//!  Client ──▶ [session proxy] ──▶ request ID ──▶ force-login ──allow──▶ forward ──▶ Storefront
//!                                                     │
//!                                                     └──redirect──▶ 302 Location: <login page>
//!
//!  The optional session proxy is the only party allowed to set the
//!  authenticated marker header (see `gate.authenticated_header`).
//!
//!  config.toml ──▶ loader ──▶ ArcSwap<GateConfig> ◀── watcher (hot reload)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use force_login::check::check;
use force_login::config::{load_config, GateConfig};
use force_login::lifecycle::startup;

#[derive(Parser)]
#[command(name = "force-login")]
#[command(about = "Force-login gateway for storefronts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway (default)
    Serve,
    /// Evaluate a URL or path against the configuration
    Check {
        /// Absolute URL or path, e.g. /checkout/cart
        url: String,

        /// Store code to evaluate in
        #[arg(short, long)]
        store: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => startup::serve(cli.config.as_deref()).await,
        Commands::Check { url, store, json } => {
            run_check(cli.config, &url, store.as_deref(), json)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_check(
    config_path: Option<PathBuf>,
    url: &str,
    store: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => GateConfig::default(),
    };

    let report = check(Arc::new(config), url, store)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.decision);
    }
    Ok(())
}
