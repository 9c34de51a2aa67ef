//! Ties the weather provider, the place-name chain and favorites together.

use crate::favorites::FavoritesStore;
use crate::geocode::{apply_location, LocationNameChain};
use crate::location::Coordinates;
use crate::provider::{daily_forecast, WeatherProvider};
use crate::types::{CurrentWeather, ForecastEntry, TemperatureUnit, WeatherError, WeatherReport};

/// Everything needed to show one lookup
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub current: CurrentWeather,
    /// One entry per day, at most five; empty when no forecast came back
    pub daily: Vec<ForecastEntry>,
    pub unit: TemperatureUnit,
}

impl DashboardView {
    fn from_report(report: WeatherReport, unit: TemperatureUnit) -> Self {
        let daily = report
            .forecast
            .as_deref()
            .map(daily_forecast)
            .unwrap_or_default();
        Self {
            current: report.current,
            daily,
            unit,
        }
    }

    pub fn is_favorite(&self, favorites: &FavoritesStore) -> bool {
        favorites.is_favorited(&self.current.name, &self.current.country)
    }
}

pub struct Dashboard {
    provider: WeatherProvider,
    names: LocationNameChain,
    favorites: FavoritesStore,
    unit: TemperatureUnit,
}

impl Dashboard {
    pub fn new(
        provider: WeatherProvider,
        names: LocationNameChain,
        favorites: FavoritesStore,
        unit: TemperatureUnit,
    ) -> Self {
        Self {
            provider,
            names,
            favorites,
            unit,
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Switch between Celsius and Fahrenheit, returning the new unit.
    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggle();
        self.unit
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    /// Look a city up by name.
    ///
    /// # Errors
    /// `MissingApiKey` without a key, `CityNotFound` when either lookup fails.
    pub async fn search(&self, city: &str) -> Result<DashboardView, WeatherError> {
        let report = self.provider.fetch_by_city(city).await?;
        Ok(DashboardView::from_report(report, self.unit))
    }

    /// Look up weather for a GPS fix, naming it as specifically as possible.
    ///
    /// The weather fetch and the reverse-geocoding chain run concurrently;
    /// a resolved name replaces the one the weather API reported.
    ///
    /// # Errors
    /// Invalid coordinates, a missing key, or a failed current-weather fetch.
    pub async fn locate(&self, coords: Coordinates) -> Result<DashboardView, WeatherError> {
        coords.validate()?;
        if !self.provider.has_api_key() {
            return Err(WeatherError::MissingApiKey);
        }

        let (report, resolved) = tokio::join!(
            self.provider.fetch_by_coordinates(coords),
            self.names.resolve(coords)
        );

        let mut report = report?;
        match resolved {
            Some(location) => {
                tracing::debug!(
                    "Replacing '{}' with resolved name '{}'",
                    report.current.name,
                    location.name
                );
                apply_location(&mut report.current, location);
            }
            None => tracing::debug!("Keeping weather API name '{}'", report.current.name),
        }

        Ok(DashboardView::from_report(report, self.unit))
    }

    /// Current conditions for every favorite, in list order.
    ///
    /// Each tile fails on its own; one bad city does not hide the others.
    pub async fn favorite_tiles(&self) -> Vec<(String, Result<CurrentWeather, WeatherError>)> {
        let mut tiles = Vec::with_capacity(self.favorites.list().len());
        for favorite in self.favorites.list() {
            let result = self.provider.fetch_current(&favorite.name).await;
            if let Err(e) = &result {
                tracing::debug!("Favorite tile for {} failed: {}", favorite.name, e);
            }
            tiles.push((favorite.id.clone(), result));
        }
        tiles
    }
}
