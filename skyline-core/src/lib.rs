//! Core library for the `skyline` weather digest.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and the geolocation fallback
//! - Aggregation of 3-hour forecast samples into daily summaries
//! - Presentation: display strings, chart series and the failure banner
//! - The request pipeline tying them together
//!
//! It is used by `skyline-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod locator;
pub mod model;
pub mod pipeline;
pub mod presenter;
pub mod provider;
pub mod units;

pub use aggregate::aggregate;
pub use chart::{ChartConfig, ChartHandle, ChartRenderer, ChartSeries, build_series};
pub use config::Config;
pub use error::{FAILURE_MESSAGE, LocationError, WeatherError};
pub use locator::{DeniedGeolocator, FixedGeolocator, Geolocator, Locator};
pub use model::{
    Coordinate, CurrentConditions, DailyForecast, LocationQuery, RawSample, TemperatureUnit,
    WeatherSnapshot,
};
pub use pipeline::{App, Outcome, Pipeline, PipelineState, Request};
pub use presenter::{Banner, CurrentView, ForecastRow, Presenter, RenderedView};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
