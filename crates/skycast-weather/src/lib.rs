//! Weather lookups for SkyCast
//!
//! Current conditions and forecasts from OpenWeatherMap, place names for GPS
//! fixes from a chain of reverse geocoders, and a persisted favorites list.

pub mod dashboard;
pub mod favorites;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod resolver;
pub mod types;

pub use dashboard::{Dashboard, DashboardView};
pub use favorites::{FavoriteCity, FavoritesError, FavoritesStore};
pub use geocode::{GeocodeCredentials, GeocodeEndpoints, GeocodeStep, LocationNameChain};
pub use location::Coordinates;
pub use provider::{daily_forecast, WeatherProvider};
pub use resolver::{
    resolve_from_address_components, resolve_from_candidates, AddressComponent, AddressResult,
    GeocodeCandidate, GeocodeInput, Granularity, ResolvedLocation,
};
pub use types::*;
