use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::WeatherError,
    model::{CurrentConditions, LocationQuery, RawSample},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Icon images live on the main site, not the API host.
pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/w";

pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}.png")
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(%url, endpoint, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Provider {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_weather(
    endpoint: &'static str,
    weather: Vec<OwWeather>,
) -> Result<OwWeather, WeatherError> {
    weather.into_iter().next().ok_or_else(|| WeatherError::Decode {
        endpoint,
        reason: "response contained no weather entry".to_string(),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
    ) -> Result<CurrentConditions, WeatherError> {
        let params = match query {
            LocationQuery::Coordinate(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            LocationQuery::City(city) => vec![("q", city.clone())],
        };

        let parsed: OwCurrentResponse = self.get("current", "weather", &params).await?;
        let weather = first_weather("current", parsed.weather)?;

        Ok(CurrentConditions {
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity.clamp(0.0, 100.0).round() as u8,
            description: weather.description,
            icon: weather.icon,
            city: parsed.name,
            country: parsed.sys.country,
            wind_speed: parsed.wind.speed,
        })
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<RawSample>, WeatherError> {
        let parsed: OwForecastResponse = self
            .get("forecast", "forecast", &[("q", city.to_string())])
            .await?;

        parsed
            .list
            .into_iter()
            .map(|entry| {
                let timestamp =
                    DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| WeatherError::Decode {
                        endpoint: "forecast",
                        reason: format!("timestamp {} out of range", entry.dt),
                    })?;
                let weather = first_weather("forecast", entry.weather)?;

                Ok(RawSample {
                    timestamp,
                    temperature: entry.main.temp,
                    humidity: entry.main.humidity,
                    description: weather.description,
                    icon: weather.icon,
                })
            })
            .collect()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
