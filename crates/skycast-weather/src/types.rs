use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature unit used for display. API values are always Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// The other unit
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Convert a Celsius reading into this unit
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Rounded reading with unit symbol, e.g. "21°C"
    pub fn format(self, celsius: f64) -> String {
        format!("{}{}", self.convert(celsius).round(), self.symbol())
    }
}

/// Weather condition groups reported in OpenWeatherMap's `weather[].main`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    /// Mist, smoke, haze, dust, fog, sand and ash
    Atmosphere,
    Squall,
    Tornado,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Map an OpenWeatherMap condition group name
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_main(main: &str) -> Self {
        match main {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Thunderstorm" => Self::Thunderstorm,
            "Snow" => Self::Snow,
            "Mist" | "Smoke" | "Haze" | "Dust" | "Fog" | "Sand" | "Ash" => Self::Atmosphere,
            "Squall" => Self::Squall,
            "Tornado" => Self::Tornado,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Cloudy",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Atmosphere => "Low Visibility",
            Self::Squall => "Squall",
            Self::Tornado => "Tornado",
            Self::Unknown => "Fair",
        }
    }

    /// Glyph shown next to a reading
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Clouds => "☁️",
            Self::Rain => "🌧️",
            Self::Drizzle => "🌦️",
            Self::Thunderstorm => "⛈️",
            Self::Snow => "❄️",
            Self::Atmosphere => "🌫️",
            Self::Squall => "💨",
            Self::Tornado => "🌪️",
            Self::Unknown => "🌤️",
        }
    }
}

/// Current conditions for one place, temperatures in Celsius
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    /// Metres; absent when the station does not report it
    pub visibility: Option<u32>,
    pub condition: WeatherCondition,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix timestamp (seconds)
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: u8,
    pub condition: WeatherCondition,
    pub description: String,
}

impl ForecastEntry {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Current conditions plus the raw 3-hourly forecast, if one was fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Option<Vec<ForecastEntry>>,
}

/// Location errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key not configured")]
    MissingApiKey,
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Weather API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_is_identity() {
        assert_eq!(TemperatureUnit::Celsius.convert(21.5), 21.5);
    }

    #[test]
    fn test_fahrenheit_conversion() {
        assert_eq!(TemperatureUnit::Fahrenheit.convert(0.0), 32.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(100.0), 212.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(-40.0), -40.0);
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(TemperatureUnit::Celsius.toggle(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::Celsius.toggle().toggle(), TemperatureUnit::Celsius);
    }

    #[test]
    fn test_format_rounds() {
        assert_eq!(TemperatureUnit::Celsius.format(21.6), "22°C");
        assert_eq!(TemperatureUnit::Fahrenheit.format(20.0), "68°F");
    }

    #[test]
    fn test_condition_groups() {
        assert_eq!(WeatherCondition::from_main("Clear"), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_main("Clouds"), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::from_main("Thunderstorm"), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_atmosphere_conditions_share_icon() {
        for main in ["Mist", "Smoke", "Haze", "Dust", "Fog", "Sand", "Ash"] {
            let condition = WeatherCondition::from_main(main);
            assert_eq!(condition, WeatherCondition::Atmosphere, "{}", main);
            assert_eq!(condition.icon(), "🌫️");
        }
    }

    #[test]
    fn test_unknown_condition_defaults() {
        let condition = WeatherCondition::from_main("Volcano");
        assert_eq!(condition, WeatherCondition::Unknown);
        assert_eq!(condition.icon(), "🌤️");
    }

    #[test]
    fn test_forecast_entry_time() {
        let entry = ForecastEntry {
            timestamp: 1_700_000_000,
            temperature: 12.0,
            humidity: 70,
            condition: WeatherCondition::Rain,
            description: "light rain".to_string(),
        };
        assert_eq!(entry.time().map(|t| t.timestamp()), Some(1_700_000_000));
    }
}
