//! Command-line interface parsing for skyprompt
//!
//! This module handles parsing of CLI arguments using clap and turns them into a
//! validated `StartupConfig` for the segment and the persistent cache.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::debug;

use crate::cache::CacheFile;
use crate::segment::{Units, WeatherProps};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified units name is not recognized
    #[error("Invalid units: '{0}'. Valid units: standard, metric, imperial")]
    InvalidUnits(String),
}

/// skyprompt - Render a weather segment for your shell prompt
#[derive(Parser, Debug)]
#[command(name = "skyprompt")]
#[command(about = "Weather segment for shell prompts, cached across prompt draws")]
#[command(version)]
pub struct Cli {
    /// OpenWeatherMap API key
    #[arg(long, env = "SKYPROMPT_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Location to report, as "CITY,COUNTRY"
    #[arg(long, env = "SKYPROMPT_LOCATION", default_value = "DE BILT,NL")]
    pub location: String,

    /// Temperature units: standard, metric or imperial
    #[arg(long, value_name = "UNITS", default_value = "standard")]
    pub units: String,

    /// Minutes an API response is reused; 0 disables caching
    #[arg(long, value_name = "MINUTES", default_value_t = 10)]
    pub cache_timeout: u64,

    /// Path of the persistent cache file (defaults to the XDG cache directory)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Do not read or write the persistent cache file
    #[arg(long)]
    pub no_cache: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Settings for the weather segment
    pub weather: WeatherProps,
    /// Where the cache is persisted, or `None` to keep it in memory only
    pub cache_file: Option<CacheFile>,
}

/// Parses a units string argument into a Units enum.
pub fn parse_units_arg(s: &str) -> Result<Units, CliError> {
    Units::parse(s).ok_or_else(|| CliError::InvalidUnits(s.to_string()))
}

/// Picks the persistent cache location, or `None` when the run stays memory-only
///
/// `default_location` is consulted only when no explicit `--cache-file` is given.
pub fn resolve_cache_file(
    cli: &Cli,
    default_location: impl FnOnce() -> Option<CacheFile>,
) -> Option<CacheFile> {
    if cli.no_cache {
        debug!("Persistent cache disabled by --no-cache");
        return None;
    }

    let file = match &cli.cache_file {
        Some(path) => Some(CacheFile::at(path)),
        None => default_location(),
    };
    if file.is_none() {
        debug!("No cache directory available, persistent cache is off");
    }
    file
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if an invalid units name was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let units = parse_units_arg(&cli.units)?;

        let cache_file = resolve_cache_file(cli, CacheFile::new);

        Ok(StartupConfig {
            weather: WeatherProps {
                api_key: cli.api_key.clone(),
                location: cli.location.clone(),
                units,
                cache_timeout: Duration::from_secs(cli.cache_timeout.saturating_mul(60)),
            },
            cache_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_logs;
    use std::path::Path;

    #[test]
    fn test_parse_units_arg_valid() {
        assert_eq!(parse_units_arg("metric").unwrap(), Units::Metric);
        assert_eq!(parse_units_arg("imperial").unwrap(), Units::Imperial);
        assert_eq!(parse_units_arg("standard").unwrap(), Units::Standard);
    }

    #[test]
    fn test_parse_units_arg_invalid() {
        let result = parse_units_arg("kelvin");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid units"));
        assert!(err.to_string().contains("kelvin"));
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["skyprompt", "--api-key", "key", "--location", "AMSTERDAM,NL"]);
        assert_eq!(cli.api_key, "key");
        assert_eq!(cli.location, "AMSTERDAM,NL");
        assert_eq!(cli.units, "standard");
        assert_eq!(cli.cache_timeout, 10);
        assert!(cli.cache_file.is_none());
        assert!(!cli.no_cache);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_startup_config_converts_timeout_to_minutes() {
        let cli = Cli::parse_from(["skyprompt", "--api-key", "key", "--cache-timeout", "3"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.weather.cache_timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_startup_config_with_explicit_cache_file() {
        let cli = Cli::parse_from([
            "skyprompt",
            "--api-key",
            "key",
            "--units",
            "metric",
            "--cache-file",
            "/tmp/skyprompt-test.bin",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.weather.units, Units::Metric);
        let file = config.cache_file.expect("Cache file should be configured");
        assert_eq!(file.path(), Path::new("/tmp/skyprompt-test.bin"));
    }

    #[test]
    fn test_startup_config_no_cache_disables_persistence() {
        let cli = Cli::parse_from([
            "skyprompt",
            "--api-key",
            "key",
            "--no-cache",
            "--cache-file",
            "/tmp/ignored.bin",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.cache_file.is_none());
    }

    #[test]
    fn test_resolve_cache_file_without_cache_dir_is_memory_only() {
        let (_guard, logs) = capture_logs();
        let cli = Cli::parse_from(["skyprompt", "--api-key", "key"]);

        let file = resolve_cache_file(&cli, || None);

        assert!(file.is_none());
        assert!(
            logs.contents().contains("persistent cache is off"),
            "Expected a diagnostic, got: {}",
            logs.contents()
        );
    }

    #[test]
    fn test_resolve_cache_file_prefers_explicit_path() {
        let cli = Cli::parse_from(["skyprompt", "--api-key", "key", "--cache-file", "/tmp/a.bin"]);

        let file = resolve_cache_file(&cli, || panic!("Default location should not be used"));

        assert_eq!(file.unwrap().path(), Path::new("/tmp/a.bin"));
    }

    #[test]
    fn test_resolve_cache_file_no_cache_logs_reason() {
        let (_guard, logs) = capture_logs();
        let cli = Cli::parse_from(["skyprompt", "--api-key", "key", "--no-cache"]);

        assert!(resolve_cache_file(&cli, || Some(CacheFile::at("/tmp/b.bin"))).is_none());
        assert!(logs.contents().contains("--no-cache"));
    }

    #[test]
    fn test_startup_config_invalid_units() {
        let cli = Cli::parse_from(["skyprompt", "--api-key", "key", "--units", "kelvin"]);
        assert!(StartupConfig::from_cli(&cli).is_err());
    }
}
