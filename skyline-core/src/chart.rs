//! Forecast chart data: seven daily labels with temperature and humidity
//! series, plus the bar-chart configuration handed to a renderer.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::{
    model::{DailyForecast, TemperatureUnit},
    units::kelvin_to,
};

/// Days shown on the chart, starting tomorrow.
pub const CHART_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    /// Display unit. `None` where no forecast day was available.
    pub temperatures: Vec<Option<f64>>,
    pub humidities: Vec<Option<f64>>,
}

/// Short en-US day label, e.g. `Sat, Oct 17`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

fn mean(values: &[Option<f64>]) -> f64 {
    let known: Vec<f64> = values.iter().flatten().copied().collect();
    if known.is_empty() {
        0.0
    } else {
        known.iter().sum::<f64>() / known.len() as f64
    }
}

/// Builds the seven chart columns for tomorrow through a week out.
///
/// Days one to six read `forecast[day - 1]`. The seventh column is never read
/// from the forecast: it holds the mean of the six values before it, or 0 if
/// there are none.
pub fn build_series(
    forecast: &[DailyForecast],
    today: NaiveDate,
    unit: TemperatureUnit,
) -> ChartSeries {
    let mut labels = Vec::with_capacity(CHART_DAYS);
    let mut temperatures = Vec::with_capacity(CHART_DAYS);
    let mut humidities = Vec::with_capacity(CHART_DAYS);

    for day in 1..=CHART_DAYS {
        let date = today
            .checked_add_days(Days::new(day as u64))
            .unwrap_or(NaiveDate::MAX);
        labels.push(day_label(date));

        if day == CHART_DAYS {
            let temperature = mean(&temperatures);
            let humidity = mean(&humidities);
            temperatures.push(Some(temperature));
            humidities.push(Some(humidity));
        } else {
            let entry = forecast.get(day - 1);
            temperatures.push(entry.map(|f| kelvin_to(unit, f.temperature) as f64));
            humidities.push(entry.map(|f| f.humidity));
        }
    }

    ChartSeries {
        labels,
        temperatures,
        humidities,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    #[serde(rename = "yAxisID")]
    pub y_axis_id: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub draw_on_chart_area: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub display: bool,
    pub position: &'static str,
    pub title: AxisTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub temp: Axis,
    pub humidity: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub scales: Scales,
}

/// Bar chart configuration with a temperature axis on the left and a
/// humidity axis on the right. Serializes to a Chart.js config object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn bar(series: ChartSeries, unit: TemperatureUnit) -> Self {
        let temperature_label = format!("Temperature (°{})", unit.symbol());
        let humidity_label = "Humidity (%)".to_string();

        Self {
            kind: "bar",
            data: ChartData {
                labels: series.labels,
                datasets: vec![
                    Dataset {
                        label: temperature_label.clone(),
                        data: series.temperatures,
                        border_color: "rgb(255, 99, 132)",
                        background_color: "rgba(255, 99, 132, 0.2)",
                        y_axis_id: "temp",
                    },
                    Dataset {
                        label: humidity_label.clone(),
                        data: series.humidities,
                        border_color: "rgb(54, 162, 235)",
                        background_color: "rgba(54, 162, 235, 0.2)",
                        y_axis_id: "humidity",
                    },
                ],
            },
            options: ChartOptions {
                scales: Scales {
                    temp: Axis {
                        kind: "linear",
                        display: true,
                        position: "left",
                        title: AxisTitle {
                            display: true,
                            text: temperature_label,
                        },
                        grid: None,
                    },
                    humidity: Axis {
                        kind: "linear",
                        display: true,
                        position: "right",
                        title: AxisTitle {
                            display: true,
                            text: humidity_label,
                        },
                        grid: Some(GridOptions {
                            draw_on_chart_area: false,
                        }),
                    },
                },
            },
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }
}

/// A live chart that must be torn down before another one is drawn.
pub trait ChartHandle {
    fn destroy(self);
}

/// Something that can draw a [`ChartConfig`].
pub trait ChartRenderer {
    type Handle: ChartHandle;

    fn create(&mut self, config: &ChartConfig) -> anyhow::Result<Self::Handle>;
}
