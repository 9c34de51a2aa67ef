//! Conversions from weather-crate errors into the application error hierarchy.

use skycast_core::{AppError, FavoritesError, NetworkError, ReqwestErrorExt, WeatherError};
use skycast_weather::WeatherError as LookupError;

pub fn weather(e: LookupError) -> AppError {
    match e {
        LookupError::MissingApiKey => AppError::Weather(WeatherError::MissingApiKey),
        LookupError::CityNotFound(city) => AppError::Weather(WeatherError::CityNotFound(city)),
        LookupError::Api(message) => AppError::Weather(WeatherError::ApiError(message)),
        LookupError::Network(e) => AppError::Network(e.into_network_error()),
        LookupError::Parse(message) => AppError::Network(NetworkError::InvalidResponse(message)),
        LookupError::Location(e) => {
            AppError::Weather(WeatherError::InvalidCoordinates(e.to_string()))
        }
    }
}

/// Lookups by position collapse into one "try searching instead" error,
/// except for problems the user can fix directly.
pub fn locate(e: LookupError) -> AppError {
    match e {
        LookupError::MissingApiKey | LookupError::Location(_) => weather(e),
        other => AppError::Weather(WeatherError::LocationUnavailable(other.to_string())),
    }
}

pub fn favorites(e: skycast_weather::FavoritesError) -> AppError {
    AppError::Favorites(FavoritesError::SaveFailed(e.to_string()))
}
