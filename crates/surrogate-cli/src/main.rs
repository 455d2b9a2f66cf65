//! Surrogate command-line tool
//!
//! Wraps a demonstration model in a synthesized proxy and either calls every
//! forward (`demo`) or prints the proxy type's layout (`inspect`).

mod commands;
mod model;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use surrogate_engine::defaults::LOG_ENV_VAR;
use surrogate_engine::ProxyConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "surrogate")]
#[command(about = "Runtime forwarding proxies", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file with a [proxy] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap the demo model and call every forwarded method
    Demo,

    /// Print the layout of the synthesized proxy type
    Inspect {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("surrogate_engine=debug"),
        _ => EnvFilter::new("surrogate_engine=trace"),
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ProxyConfig> {
    match path {
        Some(path) => ProxyConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(ProxyConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    tracing::debug!(?config, "configuration loaded");

    let choice = output::resolve_color_choice(cli.color.as_deref());
    let mut out = output::StyledOutput::new(choice);

    match cli.command {
        Commands::Demo => commands::demo::execute(config, &mut out),
        Commands::Inspect { json } => commands::inspect::execute(config, json, &mut out),
    }
}
