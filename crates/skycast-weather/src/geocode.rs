//! Reverse geocoding: turn a GPS fix into the most specific place name available.
//!
//! Providers are tried in a fixed order and the first usable answer wins:
//! Google Geocoding v4, the legacy Google Geocoding JSON API, then
//! OpenWeatherMap Geo. A provider without credentials is skipped. Any network,
//! status or payload failure is logged and the next provider is tried; the
//! chain as a whole never fails, it only comes back empty-handed.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::location::Coordinates;
use crate::resolver::{AddressResult, GeocodeCandidate, GeocodeInput, ResolvedLocation};
use crate::types::CurrentWeather;

const GOOGLE_PRIMARY_URL: &str = "https://geocode.googleapis.com/v4beta/geocode/location";
const GOOGLE_LEGACY_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const OPENWEATHER_RESULT_LIMIT: u8 = 5;
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

/// Failure of a single provider attempt. Never escapes the chain.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{step} returned status {status}")]
    Status { step: GeocodeStep, status: u16 },
    #[error("{step} rejected the request: {message}")]
    Rejected { step: GeocodeStep, message: String },
    #[error("Malformed {step} payload: {message}")]
    Parse { step: GeocodeStep, message: String },
}

/// API keys for the reverse geocoders. Absent keys disable their provider.
#[derive(Debug, Clone, Default)]
pub struct GeocodeCredentials {
    pub google_api_key: Option<String>,
    pub openweather_api_key: Option<String>,
}

/// Endpoint URLs, overridable for self-hosted proxies and tests.
#[derive(Debug, Clone)]
pub struct GeocodeEndpoints {
    pub google_primary: String,
    pub google_legacy: String,
    pub openweather_base: String,
}

impl Default for GeocodeEndpoints {
    fn default() -> Self {
        Self {
            google_primary: GOOGLE_PRIMARY_URL.to_string(),
            google_legacy: GOOGLE_LEGACY_URL.to_string(),
            openweather_base: OPENWEATHER_BASE_URL.to_string(),
        }
    }
}

/// One provider attempt in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeStep {
    GooglePrimary,
    GoogleLegacy,
    OpenWeather,
}

impl GeocodeStep {
    /// Attempt order, most specific source first
    pub const ORDER: [GeocodeStep; 3] = [
        GeocodeStep::GooglePrimary,
        GeocodeStep::GoogleLegacy,
        GeocodeStep::OpenWeather,
    ];
}

impl fmt::Display for GeocodeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GooglePrimary => "Google Geocoding v4",
            Self::GoogleLegacy => "Google Geocoding (legacy)",
            Self::OpenWeather => "OpenWeatherMap Geo",
        };
        f.write_str(name)
    }
}

/// Both Google API versions wrap their results the same way; the legacy one
/// also reports a status string alongside HTTP 200.
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    results: Vec<Value>,
    status: Option<String>,
    error_message: Option<String>,
}

/// Ordered reverse-geocoding fallback chain.
#[derive(Debug, Clone)]
pub struct LocationNameChain {
    client: Client,
    credentials: GeocodeCredentials,
    endpoints: GeocodeEndpoints,
}

impl LocationNameChain {
    pub fn new(
        credentials: GeocodeCredentials,
        endpoints: GeocodeEndpoints,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, credentials, endpoints))
    }

    /// Share an existing HTTP client (and its timeout settings).
    pub fn with_client(
        client: Client,
        credentials: GeocodeCredentials,
        endpoints: GeocodeEndpoints,
    ) -> Self {
        Self {
            client,
            credentials,
            endpoints,
        }
    }

    /// Steps that will actually be attempted with the configured credentials.
    pub fn available_steps(&self) -> Vec<GeocodeStep> {
        GeocodeStep::ORDER
            .into_iter()
            .filter(|step| self.key_for(*step).is_some())
            .collect()
    }

    fn key_for(&self, step: GeocodeStep) -> Option<&str> {
        let key = match step {
            GeocodeStep::GooglePrimary | GeocodeStep::GoogleLegacy => &self.credentials.google_api_key,
            GeocodeStep::OpenWeather => &self.credentials.openweather_api_key,
        };
        key.as_deref().filter(|k| !k.is_empty())
    }

    /// Resolve coordinates to a place name, trying each provider in order.
    ///
    /// Returns `None` when no provider is configured or none produced a
    /// usable name; callers then keep whatever name they already have.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, coords: Coordinates) -> Option<ResolvedLocation> {
        for step in GeocodeStep::ORDER {
            let Some(key) = self.key_for(step) else {
                tracing::debug!("Skipping {}: no API key configured", step);
                continue;
            };

            match self.fetch(step, key, coords).await {
                Ok(input) => match input.resolve() {
                    Some(location) => {
                        tracing::info!(
                            "Reverse geocoded to {}, {} via {}",
                            location.name,
                            location.country,
                            step
                        );
                        return Some(location);
                    }
                    None => tracing::debug!("{} returned no usable place name", step),
                },
                Err(e) => tracing::warn!("{} lookup failed: {}", step, e),
            }
        }

        tracing::debug!("No geocoding provider produced a name; keeping original");
        None
    }

    /// Overwrite the reading's name and country when a better name is found.
    ///
    /// Returns whether the reading was changed.
    pub async fn apply_to(&self, weather: &mut CurrentWeather, coords: Coordinates) -> bool {
        match self.resolve(coords).await {
            Some(location) => {
                apply_location(weather, location);
                true
            }
            None => false,
        }
    }

    async fn fetch(
        &self,
        step: GeocodeStep,
        key: &str,
        coords: Coordinates,
    ) -> Result<GeocodeInput, GeocodeError> {
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        let request = match step {
            GeocodeStep::GooglePrimary => self.client.get(&self.endpoints.google_primary).query(&[
                ("location.latitude", lat.as_str()),
                ("location.longitude", lon.as_str()),
                ("key", key),
            ]),
            GeocodeStep::GoogleLegacy => {
                let latlng = format!("{},{}", lat, lon);
                self.client
                    .get(&self.endpoints.google_legacy)
                    .query(&[("latlng", latlng.as_str()), ("key", key)])
            }
            GeocodeStep::OpenWeather => {
                let url = format!(
                    "{}/geo/1.0/reverse",
                    self.endpoints.openweather_base.trim_end_matches('/')
                );
                let limit = OPENWEATHER_RESULT_LIMIT.to_string();
                self.client.get(url).query(&[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("limit", limit.as_str()),
                    ("appid", key),
                ])
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                step,
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| GeocodeError::Parse {
            step,
            message: e.to_string(),
        })?;

        match step {
            GeocodeStep::GooglePrimary | GeocodeStep::GoogleLegacy => {
                parse_google(step, body).map(GeocodeInput::AddressResults)
            }
            GeocodeStep::OpenWeather => parse_openweather(body).map(GeocodeInput::Candidates),
        }
    }
}

/// Copy a resolved name onto a weather reading.
pub fn apply_location(weather: &mut CurrentWeather, location: ResolvedLocation) {
    weather.name = location.name;
    weather.country = location.country;
}

fn parse_google(step: GeocodeStep, body: Value) -> Result<Vec<AddressResult>, GeocodeError> {
    let response: GoogleResponse =
        serde_json::from_value(body).map_err(|e| GeocodeError::Parse {
            step,
            message: e.to_string(),
        })?;

    if let Some(status) = response.status.as_deref() {
        if status != "OK" && status != "ZERO_RESULTS" {
            return Err(GeocodeError::Rejected {
                step,
                message: response
                    .error_message
                    .unwrap_or_else(|| status.to_string()),
            });
        }
    }

    Ok(lenient_items(step, response.results))
}

fn parse_openweather(body: Value) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    match body {
        Value::Array(items) => Ok(lenient_items(GeocodeStep::OpenWeather, items)),
        other => Err(GeocodeError::Parse {
            step: GeocodeStep::OpenWeather,
            message: format!("expected an array, got {}", json_kind(&other)),
        }),
    }
}

/// Deserialize each item on its own so one bad entry does not sink the rest.
fn lenient_items<T: serde::de::DeserializeOwned>(step: GeocodeStep, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!("Skipping malformed {} entry: {}", step, e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
