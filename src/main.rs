//! skyprompt - Render a weather segment for a shell prompt
//!
//! Runs once per prompt draw: restores the response cache from disk, renders the
//! segment, saves the cache back and prints the segment text.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, warn};

use skyprompt::cache::{CacheError, CacheFile, TtlCache};
use skyprompt::cli::{Cli, StartupConfig};
use skyprompt::logging;
use skyprompt::segment::{WeatherClient, WeatherSegment};

/// TTL for cache writes that do not choose their own
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Restores persisted entries; any failure leaves the cache cold
fn restore_cache(file: &CacheFile, cache: &TtlCache) {
    match file.load_into(cache) {
        Ok(merged) => debug!(merged, path = %file.path().display(), "Cache restored"),
        Err(CacheError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %file.path().display(), "No cache file yet, starting cold")
        }
        Err(err) => warn!(error = %err, path = %file.path().display(), "Ignoring unreadable cache file"),
    }
}

/// Persists the cache; failures only cost future cache hits
fn persist_cache(file: &CacheFile, cache: &TtlCache) {
    if let Err(err) = file.save_from(cache) {
        warn!(error = %err, path = %file.path().display(), "Failed to save cache");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("skyprompt: {}", err);
            process::exit(2);
        }
    };

    let client = WeatherClient::new()?;
    let cache = TtlCache::new(DEFAULT_TTL);
    if let Some(file) = &config.cache_file {
        restore_cache(file, &cache);
    }

    let segment = WeatherSegment::new(config.weather, client, &cache);
    let text = segment.render().await;

    if let Some(file) = &config.cache_file {
        persist_cache(file, &cache);
    }

    if let Some(text) = text {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", text)?;
        stdout.flush()?;
    }

    Ok(())
}
