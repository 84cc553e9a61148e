use anyhow::Context;
use env_logger::Env;

use sst_indonesia::animate;
use sst_indonesia::config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load().context("Failed to load configuration")?;
    let summary = animate::run(&config)
        .with_context(|| format!("Failed to animate {}", config.table().display()))?;
    log::info!("{} frames, {} without data", summary.frames, summary.skipped.len());

    Ok(())
}
