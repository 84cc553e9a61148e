use anyhow::Context;
use env_logger::Env;

use sst_indonesia::config::Config;
use sst_indonesia::{animate, extract, trend};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load().context("Failed to load configuration")?;

    let summary = extract::run(&config).context("Extraction failed")?;
    log::info!(
        "{} rows over {} time steps written to {}",
        summary.rows,
        summary.time_steps,
        summary.path.display()
    );

    let report = trend::run(&config).context("Trend analysis failed")?;
    println!("{}", report);

    let animation = animate::run(&config).context("Animation failed")?;
    if !animation.skipped.is_empty() {
        log::warn!("Years without data: {:?}", animation.skipped);
    }

    Ok(())
}
