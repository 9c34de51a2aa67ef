//! Centralized error types for SkyCast.
//!
//! This module provides a typed error hierarchy that:
//! - Separates network, configuration, weather and storage failures
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Every failure surfaced by the binary converts into this type.
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Favorites error: {0}")]
    Favorites(#[from] FavoritesError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Favorites(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors raised while loading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "Could not locate a configuration directory.",
            ConfigError::Io { .. } => "Could not read or write the configuration file.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API key not configured")]
    MissingApiKey,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Weather for current location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Weather API error: {0}")]
    ApiError(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::MissingApiKey => "Weather API key not configured",
            WeatherError::CityNotFound(_) => "City not found",
            WeatherError::InvalidCoordinates(_) => "Invalid coordinates received",
            WeatherError::LocationUnavailable(_) => {
                "Failed to get weather for your location. Please try searching manually."
            }
            WeatherError::ApiError(_) => "Failed to fetch weather data",
        }
    }
}

/// Favorites storage errors.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("Failed to save favorites: {0}")]
    SaveFailed(String),

    #[error("Favorite not found: {0}")]
    NotFound(String),
}

impl FavoritesError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FavoritesError::SaveFailed(_) => "Could not save your favorites. Please try again.",
            FavoritesError::NotFound(_) => "That favorite no longer exists.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Weather(WeatherError::MissingApiKey),
            AppError::Favorites(FavoritesError::SaveFailed("disk full".into())),
            AppError::Config(ConfigError::NoConfigDir),
        ];

        for error in errors {
            assert!(!error.user_message().is_empty(), "empty message for {:?}", error);
        }
    }

    #[test]
    fn test_server_error_messages_by_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(server.user_message().contains("later"));

        let client = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert!(!client.user_message().contains("later"));
    }

    #[test]
    fn test_weather_messages_match_dashboard_wording() {
        assert_eq!(
            WeatherError::MissingApiKey.user_message(),
            "Weather API key not configured"
        );
        assert_eq!(
            WeatherError::CityNotFound("Atlantis".into()).user_message(),
            "City not found"
        );
        assert!(WeatherError::LocationUnavailable("timeout".into())
            .user_message()
            .contains("searching manually"));
    }

    #[test]
    fn test_app_error_display_keeps_context() {
        let err: AppError = WeatherError::CityNotFound("Atlantis".into()).into();
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_malformed_config_message() {
        let err: AppError = ConfigError::ParseError("expected `=`".into()).into();
        assert_eq!(
            err.user_message(),
            "Configuration file is malformed. Check your settings."
        );
        assert!(err.to_string().contains("expected `=`"));
    }
}
