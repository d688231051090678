// src/main.rs

use anyhow::{Context, Result};
use busfactor::cli::Args;
use clap::Parser;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let result = busfactor::run(&args).with_context(|| format!("analyzing {}", args.root.display()))?;

    info!(
        "Analysis finished in {:.2?}. {} of {} files have a single author.",
        start_time.elapsed(),
        result.table.len(),
        result.total_files
    );

    for rank in &result.ranking {
        println!("{}\t{}", rank.author, rank.file_count);
    }

    Ok(())
}
