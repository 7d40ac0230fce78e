#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use skyline_core::{ChartConfig, ChartHandle, ChartRenderer, OpenWeatherProvider};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const API_KEY: &str = "test-key";

/// Reference "now" for all scenarios: Friday 2026-10-16, noon UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

pub fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(API_KEY.to_string()).with_base_url(&server.uri())
}

pub fn current_body(city: &str, country: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 77.22, "lat": 28.67 },
        "weather": [
            { "id": 721, "main": "Haze", "description": "haze", "icon": "50d" }
        ],
        "main": {
            "temp": 305.15,
            "feels_like": 307.0,
            "temp_min": 305.15,
            "temp_max": 305.15,
            "pressure": 1008,
            "humidity": 52
        },
        "wind": { "speed": 2.57, "deg": 290 },
        "dt": 1792152000,
        "sys": { "country": country, "sunrise": 1792113000, "sunset": 1792154000 },
        "name": city,
        "cod": 200
    })
}

/// Five days of 3-hour samples starting at `now()`.
pub fn forecast_body() -> serde_json::Value {
    let start = now();
    let list: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            let at = start + Duration::hours(3 * i);
            serde_json::json!({
                "dt": at.timestamp(),
                "main": { "temp": 290.0 + i as f64 * 0.5, "humidity": 60 },
                "weather": [
                    { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
                ],
                "dt_txt": at.format("%Y-%m-%d %H:%M:%S").to_string()
            })
        })
        .collect();

    serde_json::json!({ "cod": "200", "cnt": list.len(), "list": list, "city": { "name": "Delhi" } })
}

pub async fn mount_current(server: &MockServer, city: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", city))
        .and(query_param("appid", API_KEY))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_forecast(server: &MockServer, city: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", city))
        .and(query_param("appid", API_KEY))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Chart renderer that remembers what it drew.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub charts: Arc<Mutex<Vec<ChartConfig>>>,
    pub destroyed: Arc<Mutex<usize>>,
}

#[derive(Debug)]
pub struct RecordingHandle(Arc<Mutex<usize>>);

impl ChartHandle for RecordingHandle {
    fn destroy(self) {
        *self.0.lock().unwrap() += 1;
    }
}

impl ChartRenderer for RecordingRenderer {
    type Handle = RecordingHandle;

    fn create(&mut self, config: &ChartConfig) -> anyhow::Result<RecordingHandle> {
        self.charts.lock().unwrap().push(config.clone());
        Ok(RecordingHandle(self.destroyed.clone()))
    }
}
