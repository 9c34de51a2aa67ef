use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (favorites live here too)
    pub config_dir: PathBuf,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Reverse geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key as written in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenWeatherMap base URL
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// City shown when no query is given
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Temperature unit preference
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_city() -> String {
    "London".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            default_city: default_city(),
            temperature_unit: TemperatureUnit::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    /// Key from the file, else `OPENWEATHER_API_KEY`. The env value is
    /// looked up per call and never stored in the config.
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| env_key(WEATHER_API_KEY_ENV))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Google Maps Platform key as written in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,

    /// Google Geocoding v4 reverse endpoint
    #[serde(default = "default_google_primary_url")]
    pub google_primary_url: String,

    /// Google Geocoding legacy JSON endpoint
    #[serde(default = "default_google_legacy_url")]
    pub google_legacy_url: String,
}

fn default_google_primary_url() -> String {
    "https://geocode.googleapis.com/v4beta/geocode/location".to_string()
}

fn default_google_legacy_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_primary_url: default_google_primary_url(),
            google_legacy_url: default_google_legacy_url(),
        }
    }
}

impl GeocodingConfig {
    /// Key from the file, else `GOOGLE_MAPS_API_KEY`.
    pub fn resolved_google_api_key(&self) -> Option<String> {
        non_empty(self.google_api_key.clone()).or_else(|| env_key(GOOGLE_API_KEY_ENV))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn env_key(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating defaults if missing
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).map_err(|e| io_error(config_path, e))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails; warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(
            &self.geocoding.google_primary_url,
            "geocoding.google_primary_url",
            &mut result,
        );
        self.validate_url(
            &self.geocoding.google_legacy_url,
            "geocoding.google_legacy_url",
            &mut result,
        );

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.timeout_secs > 120 {
            result.add_warning(
                "weather.timeout_secs",
                "Timeout is unusually long (>120 seconds)",
            );
        }

        if self.weather.default_city.trim().is_empty() {
            result.add_error("weather.default_city", "Default city must not be empty");
        }

        if self.weather.resolved_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - lookups will fail",
            );
        }

        if self.geocoding.resolved_google_api_key().is_none() {
            result.add_warning(
                "geocoding.google_api_key",
                "Google geocoding not configured - place names come from OpenWeatherMap only",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(config_path, contents).map_err(|e| io_error(config_path, e))
    }

    /// Path of the favorites file inside the config directory
    pub fn favorites_path(&self) -> PathBuf {
        self.config_dir.join("favorites.json")
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that read or write the key env vars take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn configured() -> Config {
        let mut config = Config::default();
        config.weather.api_key = Some("weather-key".to_string());
        config.geocoding.google_api_key = Some("google-key".to_string());
        config
    }

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = configured();
        config.weather.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = configured();
        config.geocoding.google_legacy_url = "ftp://maps.example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = configured();
        config.weather.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.timeout_secs"));
    }

    #[test]
    fn test_missing_keys_are_warnings() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var(WEATHER_API_KEY_ENV);
        std::env::remove_var(GOOGLE_API_KEY_ENV);

        let mut config = configured();
        config.weather.api_key = None;
        config.geocoding.google_api_key = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.api_key"));
        assert!(result.warnings.iter().any(|w| w.field == "geocoding.google_api_key"));
    }

    #[test]
    fn test_load_from_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.weather.default_city, "London");
        assert_eq!(config.favorites_path(), dir.path().join("favorites.json"));
    }

    #[test]
    fn test_load_from_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "config_dir = \"/tmp/skycast\"\n\n[weather]\ndefault_city = \"Harare\"\ntemperature_unit = \"fahrenheit\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.weather.default_city, "Harare");
        assert_eq!(config.weather.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.weather.timeout_secs, 10);
        assert!(config.geocoding.google_legacy_url.contains("maps.googleapis.com"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_env_keys_are_never_written_to_disk() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::env::set_var(WEATHER_API_KEY_ENV, "secret-from-env");
        std::env::set_var(GOOGLE_API_KEY_ENV, "google-from-env");
        let config = Config::load_from(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret-from-env"));
        assert!(!written.contains("google-from-env"));
        assert_eq!(config.weather.api_key, None);
        assert_eq!(config.weather.resolved_api_key().as_deref(), Some("secret-from-env"));

        std::env::set_var(WEATHER_API_KEY_ENV, "rotated-key");
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.weather.resolved_api_key().as_deref(), Some("rotated-key"));
        assert_eq!(
            reloaded.geocoding.resolved_google_api_key().as_deref(),
            Some("google-from-env")
        );

        std::env::remove_var(WEATHER_API_KEY_ENV);
        std::env::remove_var(GOOGLE_API_KEY_ENV);
    }

    #[test]
    fn test_file_key_wins_over_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(WEATHER_API_KEY_ENV, "from-env");

        let mut config = Config::default();
        config.weather.api_key = Some("from-file".to_string());
        assert_eq!(config.weather.resolved_api_key().as_deref(), Some("from-file"));

        config.weather.api_key = Some("   ".to_string());
        assert_eq!(config.weather.resolved_api_key().as_deref(), Some("from-env"));

        std::env::remove_var(WEATHER_API_KEY_ENV);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[weather\ndefault_city = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
