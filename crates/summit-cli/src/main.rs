mod cli;
mod commands;
mod input;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use summit_core::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("summit={level}").parse()?)
                .add_directive(format!("summit_core={level}").parse()?),
        )
        .init();

    let config = load_config(&args.config);

    match args.command {
        Some(Command::Track { csv }) => commands::track::run(&config, csv.as_deref()),
        Some(Command::Scan { pid }) => commands::scan::run(&config, pid),
        Some(Command::Status { pid, json }) => commands::status::run(&config, pid, json),
        None => commands::track::run(&config, None),
    }
}

fn load_config(path: &std::path::Path) -> Config {
    match Config::load(path) {
        Ok(config) => {
            info!("Loaded config from {:?}", path);
            config
        }
        Err(e) if e.is_not_found() => {
            info!("No config at {:?}, using defaults", path);
            Config::default()
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    }
}
