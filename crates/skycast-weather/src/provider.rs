//! OpenWeatherMap client for current conditions and the 5-day forecast.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::location::Coordinates;
use crate::types::{CurrentWeather, ForecastEntry, WeatherCondition, WeatherError, WeatherReport};

const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

/// Forecast entries are 3 hours apart, so every 8th one is a new day.
const ENTRIES_PER_DAY: usize = 8;
const FORECAST_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: ApiSys,
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    #[serde(default)]
    wind: ApiWind,
    visibility: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    #[serde(default)]
    list: Vec<ApiForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastItem {
    dt: i64,
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn condition_of(weather: &[ApiCondition]) -> (WeatherCondition, String) {
    weather
        .first()
        .map(|w| (WeatherCondition::from_main(&w.main), w.description.clone()))
        .unwrap_or_default()
}

impl From<ApiCurrent> for CurrentWeather {
    fn from(api: ApiCurrent) -> Self {
        let (condition, description) = condition_of(&api.weather);
        Self {
            name: api.name,
            country: api.sys.country,
            temperature: api.main.temp,
            feels_like: api.main.feels_like.unwrap_or(api.main.temp),
            humidity: api.main.humidity,
            pressure: api.main.pressure,
            wind_speed: api.wind.speed,
            visibility: api.visibility,
            condition,
            description,
            fetched_at: Utc::now(),
        }
    }
}

impl From<ApiForecastItem> for ForecastEntry {
    fn from(api: ApiForecastItem) -> Self {
        let (condition, description) = condition_of(&api.weather);
        Self {
            timestamp: api.dt,
            temperature: api.main.temp,
            humidity: api.main.humidity,
            condition,
            description,
        }
    }
}

/// One entry per day from the 3-hourly list, at most five days.
pub fn daily_forecast(entries: &[ForecastEntry]) -> Vec<ForecastEntry> {
    entries
        .iter()
        .step_by(ENTRIES_PER_DAY)
        .take(FORECAST_DAYS)
        .cloned()
        .collect()
}

/// What to look weather up by
#[derive(Debug, Clone, Copy)]
enum Place<'a> {
    City(&'a str),
    Coordinates(Coordinates),
}

impl Place<'_> {
    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Place::City(city) => vec![("q", city.to_string())],
            Place::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHER_BASE_URL, timeout)
    }

    pub fn with_base_url(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// HTTP client, for sharing with the geocoding chain
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Current conditions and forecast for a city by name.
    ///
    /// Both lookups must succeed; any non-success status is reported as the
    /// city not being found.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn fetch_by_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::CityNotFound(String::new()));
        }
        let place = Place::City(city);

        let (current, forecast) =
            tokio::join!(self.get("weather", place), self.get("forecast", place));
        let (current, forecast) = (current?, forecast?);

        if !current.status().is_success() || !forecast.status().is_success() {
            tracing::debug!(
                "City lookup failed: weather {}, forecast {}",
                current.status(),
                forecast.status()
            );
            return Err(WeatherError::CityNotFound(city.to_string()));
        }

        let current: ApiCurrent = decode(current).await?;
        let forecast: ApiForecast = decode(forecast).await?;

        Ok(WeatherReport {
            current: current.into(),
            forecast: Some(forecast.list.into_iter().map(ForecastEntry::from).collect()),
        })
    }

    /// Current conditions and, when available, the forecast for a position.
    ///
    /// A failed forecast is logged and left out rather than failing the call.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherReport, WeatherError> {
        coords.validate()?;
        let place = Place::Coordinates(coords);

        let current = self.get("weather", place).await?;
        if !current.status().is_success() {
            return Err(WeatherError::Api(api_error_message(current).await));
        }
        let current: ApiCurrent = decode(current).await?;

        let forecast = match self.get("forecast", place).await {
            Ok(response) if response.status().is_success() => {
                match decode::<ApiForecast>(response).await {
                    Ok(forecast) => {
                        Some(forecast.list.into_iter().map(ForecastEntry::from).collect())
                    }
                    Err(e) => {
                        tracing::warn!("Forecast parse failed: {}", e);
                        None
                    }
                }
            }
            Ok(response) => {
                tracing::warn!("Forecast fetch failed: {}", api_error_message(response).await);
                None
            }
            Err(e) => {
                tracing::warn!("Forecast fetch failed: {}", e);
                None
            }
        };

        Ok(WeatherReport {
            current: current.into(),
            forecast,
        })
    }

    /// Current conditions only, as shown on a favorite tile.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let response = self.get("weather", Place::City(city)).await?;
        if !response.status().is_success() {
            return Err(WeatherError::CityNotFound(city.to_string()));
        }
        let current: ApiCurrent = decode(response).await?;
        Ok(current.into())
    }

    async fn get(&self, endpoint: &str, place: Place<'_>) -> Result<Response, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}/data/2.5/{}", self.base_url, endpoint);

        let mut query = place.query();
        query.push(("appid", api_key.to_string()));
        query.push(("units", "metric".to_string()));

        Ok(self.client.get(url).query(&query).send().await?)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, WeatherError> {
    response
        .json()
        .await
        .map_err(|e| WeatherError::Parse(e.to_string()))
}

/// The API's own `message` when it sends one, else the HTTP reason phrase.
async fn api_error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string());

    match response.json::<ApiErrorBody>().await {
        Ok(ApiErrorBody {
            message: Some(message),
        }) if !message.is_empty() => message,
        _ => fallback,
    }
}
