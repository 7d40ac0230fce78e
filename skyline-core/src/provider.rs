use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, LocationQuery, RawSample},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Source of current conditions and raw forecast samples.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
    ) -> Result<CurrentConditions, WeatherError>;

    /// Forecast samples for a city name as resolved by [`Self::fetch_current`].
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<RawSample>, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Result<OpenWeatherProvider, WeatherError> {
    let api_key = config.api_key()?;
    Ok(OpenWeatherProvider::new(api_key.to_owned()).with_base_url(&config.base_url))
}
