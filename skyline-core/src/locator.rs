use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::LocationError,
    model::{Coordinate, LocationQuery},
};

/// Device position capability.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// A position known up front (command line or config file). `None` behaves
/// like a device without location support.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator(pub Option<Coordinate>);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::Unavailable)
    }
}

/// Always refuses, as when the user declines location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

#[async_trait]
impl Geolocator for Box<dyn Geolocator> {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.as_ref().current_position().await
    }
}

/// Resolves where to fetch weather for. Never fails: any geolocation error
/// falls back to the default city.
#[derive(Debug)]
pub struct Locator<G> {
    geolocator: G,
    default_city: String,
}

impl<G: Geolocator> Locator<G> {
    pub fn new(geolocator: G, default_city: impl Into<String>) -> Self {
        Self {
            geolocator,
            default_city: default_city.into(),
        }
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    pub async fn locate(&self) -> LocationQuery {
        match self.geolocator.current_position().await {
            Ok(coordinate) => {
                tracing::debug!(%coordinate, "using device position");
                LocationQuery::Coordinate(coordinate)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    city = %self.default_city,
                    "geolocation failed, falling back to default city"
                );
                LocationQuery::City(self.default_city.clone())
            }
        }
    }
}
