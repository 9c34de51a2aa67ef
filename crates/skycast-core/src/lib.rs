//! Shared configuration, error types and logging setup for SkyCast.

pub mod config;
pub mod error;

pub use config::{Config, GeocodingConfig, TemperatureUnit, ValidationResult, WeatherConfig};
pub use error::{
    AppError, ConfigError, FavoritesError, NetworkError, ReqwestErrorExt, WeatherError,
};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("SkyCast core initialized");
    Ok(())
}
