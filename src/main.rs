//! Orderlens: prints the order dashboard views for a date range
//!
//! Loads the order export, filters it and renders every view as text or JSON.

use anyhow::{Context, Result};
use clap::Parser;
use orderlens::cli::OutputFormat;
use orderlens::{build_dashboard, load_orders, logging, report, Args};
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_level, args.verbose);

    let start_time = Instant::now();

    let df = load_orders(&args.input)
        .with_context(|| format!("failed to load orders from {}", args.input))?;
    info!(rows = df.height(), input = %args.input, "orders loaded");

    let views = build_dashboard(&df, args.start, args.end, &args.dashboard_config())
        .context("failed to compute dashboard views")?;

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(&views)),
        OutputFormat::Json => println!("{}", report::render_json(&views)?),
    }

    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "report complete"
    );
    Ok(())
}
