use std::env;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use nexport::{Config, migrate};

/// Convert default exports to named exports and update every reference to them
#[derive(Parser, Debug)]
#[command(name = "nexport", version, about)]
struct Cli {
    /// Glob selecting the project's modules, relative to the current directory
    #[arg(long = "projectFiles", value_name = "GLOB")]
    project_files: String,

    /// Glob narrowing which modules have their default export converted
    #[arg(long = "workOn", value_name = "GLOB")]
    work_on: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let root = env::current_dir().context("Failed to determine the current directory")?;
    let config = Config::load(root, cli.project_files, cli.work_on)?;
    let report = migrate(&config)?;
    debug!("{report:#?}");
    Ok(())
}
