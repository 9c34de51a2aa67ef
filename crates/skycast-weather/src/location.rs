//! Coordinates supplied by the caller (GPS fix or manual entry).

use serde::{Deserialize, Serialize};

use crate::types::LocationError;

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build validated coordinates.
    ///
    /// A zero in either axis is treated as "no fix" and rejected, matching
    /// what positioning backends report when they have nothing.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let coords = Self {
            latitude,
            longitude,
        };
        coords.validate()?;
        Ok(coords)
    }

    pub fn validate(&self) -> Result<(), LocationError> {
        let Self {
            latitude,
            longitude,
        } = *self;

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(LocationError::InvalidCoordinates(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        if latitude == 0.0 || longitude == 0.0 {
            return Err(LocationError::InvalidCoordinates(format!(
                "no position fix ({}, {})",
                latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::InvalidCoordinates(format!(
                "latitude {} out of range",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidCoordinates(format!(
                "longitude {} out of range",
                longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
