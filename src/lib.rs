pub mod cli;
pub mod data;
pub mod export;
pub mod loader;
pub mod merge;
pub mod reconcile;
pub mod resolver;
pub mod similarity;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{cli::Cli, reconcile::ReconcileConfig};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("addr_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Arguments: {:?}", cli);
    let output_dir = env::current_dir().context("Resolving current working directory")?;
    let config = ReconcileConfig::new(cli.source_file, cli.detail_file, output_dir);
    let summary = reconcile::execute(&config)?;
    debug!(
        "{} source row(s), {} resolved, {} joined to detail rows",
        summary.source_rows, summary.resolved_rows, summary.joined_rows
    );
    println!("{}", summary.outputs.report());
    Ok(())
}
