use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;
use weatherdb::{OpenWeatherClient, WeatherDb, WeatherDbConfig, WeatherUpdater, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("WEATHERDB_CONFIG").map(PathBuf::from);
    let config = WeatherDbConfig::load_from_path(config_path)?;
    logging::init(&config.logging)?;

    let mut locations: Vec<String> = std::env::args().skip(1).collect();
    if locations.is_empty() {
        locations = config.defaults.locations.clone();
    }
    if locations.is_empty() {
        bail!("Usage: weatherdb <LOCATION>... (or set defaults.locations in the config file)");
    }

    let client = OpenWeatherClient::new(&config.provider)
        .context("Failed to create weather provider client")?;
    let client = Arc::new(client);
    let updater = WeatherUpdater::new(Arc::clone(&client), client).with_units(config.provider.units);

    let mut db = WeatherDb::new();
    let failures = db.refresh(&updater, locations.as_slice()).await;
    info!(
        "{} of {} locations updated, {} points held",
        locations.len() - failures.len(),
        locations.len(),
        db.dataset().len()
    );

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, db.dataset()).context("Failed to write dataset")?;
    writeln!(stdout)?;
    Ok(())
}
