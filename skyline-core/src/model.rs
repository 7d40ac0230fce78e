use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A device position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (-90.0..=90.0).contains(&latitude),
            "latitude must be between -90 and 90, got {latitude}"
        );
        anyhow::ensure!(
            (-180.0..=180.0).contains(&longitude),
            "longitude must be between -180 and 180, got {longitude}"
        );
        Ok(Self { latitude, longitude })
    }
}

impl FromStr for Coordinate {
    type Err = anyhow::Error;

    /// Parses `"lat,lon"`, e.g. `"28.61,77.21"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("expected coordinates as LAT,LON, got '{s}'"))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid latitude '{}'", lat.trim()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid longitude '{}'", lon.trim()))?;

        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// What the current-conditions lookup is keyed by.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinate(Coordinate),
    City(String),
}

/// Temperature unit used for display. Provider values are always Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{s}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => f.write_str("celsius"),
            TemperatureUnit::Fahrenheit => f.write_str("fahrenheit"),
        }
    }
}

/// One 3-hour forecast entry as delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    /// Kelvin.
    pub temperature: f64,
    /// Percent, 0-100.
    pub humidity: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Kelvin.
    pub temperature: f64,
    pub humidity: u8,
    pub description: String,
    pub icon: String,
    /// City name as resolved by the provider; the forecast is keyed by it.
    pub city: String,
    pub country: String,
    /// Metres per second.
    pub wind_speed: f64,
}

/// A finalized day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Bucket index in `0..=7`; 0 is today.
    pub offset: u8,
    pub date: NaiveDate,
    /// Kelvin.
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
}

/// Everything one render cycle needs: current conditions plus the
/// forward-looking days.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    forecast: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    pub const MAX_FORECAST_DAYS: usize = 7;

    /// Drops today's bucket and orders the remaining days by offset, keeping
    /// at most [`Self::MAX_FORECAST_DAYS`] entries with unique offsets.
    pub fn new(current: CurrentConditions, daily: Vec<DailyForecast>) -> Self {
        let mut forecast: Vec<DailyForecast> =
            daily.into_iter().filter(|day| day.offset != 0).collect();
        forecast.sort_by_key(|day| day.offset);
        forecast.dedup_by_key(|day| day.offset);
        forecast.truncate(Self::MAX_FORECAST_DAYS);

        Self { current, forecast }
    }

    pub fn forecast(&self) -> &[DailyForecast] {
        &self.forecast
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).expect("valid date")
    }

    #[test]
    fn parses_coordinates() {
        let c: Coordinate = "28.61, 77.21".parse().expect("should parse");
        assert_eq!(c, Coordinate { latitude: 28.61, longitude: 77.21 });
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let err = "95,10".parse::<Coordinate>().unwrap_err();
        assert!(err.to_string().contains("latitude"));

        let err = "10,190".parse::<Coordinate>().unwrap_err();
        assert!(err.to_string().contains("longitude"));

        assert!("10".parse::<Coordinate>().is_err());
    }

    #[test]
    fn unit_parsing_accepts_short_names() {
        assert_eq!("F".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!("celsius".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
    }

    #[test]
    fn snapshot_excludes_today_and_orders_by_offset() {
        let daily = vec![
            day(0, date(16), 290.0, 50.0),
            day(2, date(18), 291.0, 51.0),
            day(1, date(17), 292.0, 52.0),
        ];

        let snapshot = WeatherSnapshot::new(current("Delhi"), daily);
        let offsets: Vec<u8> = snapshot.forecast().iter().map(|d| d.offset).collect();
        assert_eq!(offsets, vec![1, 2]);
    }

    #[test]
    fn snapshot_holds_at_most_seven_days() {
        let daily = (0..=7).map(|o| day(o, date(16 + u32::from(o)), 290.0, 50.0)).collect();

        let snapshot = WeatherSnapshot::new(current("Delhi"), daily);
        assert_eq!(snapshot.forecast().len(), 7);
        assert!(snapshot.forecast().windows(2).all(|w| w[0].offset < w[1].offset));
    }
}
