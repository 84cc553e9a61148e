use anyhow::Context;
use env_logger::Env;

use sst_indonesia::config::Config;
use sst_indonesia::trend;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load().context("Failed to load configuration")?;
    let report = trend::run(&config)
        .with_context(|| format!("Failed to analyse {}", config.table().display()))?;
    println!("{}", report);

    Ok(())
}
