use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::{
    chart::{ChartConfig, ChartHandle, ChartRenderer, build_series},
    error::FAILURE_MESSAGE,
    model::{CurrentConditions, DailyForecast, TemperatureUnit, WeatherSnapshot},
    provider::openweather::icon_url,
    units::kelvin_to,
};

/// Long en-US timestamp, e.g. `Friday, October 16, 2026 at 3:04:05 PM`.
pub fn long_datetime<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d, %Y at %-I:%M:%S %p").to_string()
}

pub fn format_temperature(unit: TemperatureUnit, kelvin: f64) -> String {
    format!("{} °{}", kelvin_to(unit, kelvin), unit.symbol())
}

/// Display strings for the current conditions panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub icon_url: String,
    pub temperature: String,
    pub description: String,
    pub location: String,
    pub wind: String,
    pub humidity: String,
    pub datetime: String,
}

impl CurrentView {
    pub fn from_conditions<Tz: TimeZone>(
        current: &CurrentConditions,
        unit: TemperatureUnit,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            icon_url: icon_url(&current.icon),
            temperature: format_temperature(unit, current.temperature),
            description: current.description.clone(),
            location: format!("{}, {}", current.city, current.country),
            wind: format!("Wind Speed: {} m/s", current.wind_speed),
            humidity: format!("Humidity: {}%", current.humidity),
            datetime: long_datetime(now),
        }
    }
}

/// One line of the textual forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: String,
    pub temperature: String,
    pub humidity: String,
    pub description: String,
    pub icon_url: String,
}

impl ForecastRow {
    pub fn from_daily(day: &DailyForecast, unit: TemperatureUnit) -> Self {
        Self {
            date: day.date.format("%a, %b %-d").to_string(),
            temperature: format_temperature(unit, day.temperature),
            humidity: format!("{:.0}%", day.humidity),
            description: day.description.clone(),
            icon_url: icon_url(&day.icon),
        }
    }
}

/// The finished output of one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub current: CurrentView,
    pub forecast: Vec<ForecastRow>,
    pub chart: ChartConfig,
}

/// Failure banner. Hidden until a fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    message: Option<String>,
}

impl Banner {
    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn show(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }

    fn hide(&mut self) {
        self.message = None;
    }
}

/// Turns snapshots into display strings and keeps at most one chart alive.
pub struct Presenter<R: ChartRenderer> {
    renderer: R,
    chart: Option<R::Handle>,
    banner: Banner,
    unit: TemperatureUnit,
}

impl<R: ChartRenderer> Presenter<R> {
    pub fn new(renderer: R, unit: TemperatureUnit) -> Self {
        Self {
            renderer,
            chart: None,
            banner: Banner::default(),
            unit,
        }
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renders a snapshot, replacing any chart drawn by a previous cycle.
    ///
    /// If the renderer cannot draw the new chart, the failure banner is shown
    /// and no chart remains.
    pub fn render<Tz: TimeZone>(
        &mut self,
        snapshot: WeatherSnapshot,
        now: &DateTime<Tz>,
    ) -> anyhow::Result<RenderedView>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.banner.hide();

        let current = CurrentView::from_conditions(&snapshot.current, self.unit, now);
        let forecast = snapshot
            .forecast()
            .iter()
            .map(|day| ForecastRow::from_daily(day, self.unit))
            .collect();

        let series = build_series(snapshot.forecast(), now.date_naive(), self.unit);
        let chart = ChartConfig::bar(series, self.unit);

        if let Some(previous) = self.chart.take() {
            previous.destroy();
        }
        match self.renderer.create(&chart) {
            Ok(handle) => self.chart = Some(handle),
            Err(err) => {
                self.fail();
                return Err(err);
            }
        }

        Ok(RenderedView {
            current,
            forecast,
            chart,
        })
    }

    /// Shows the failure banner. The previous chart, if any, stays as is.
    pub fn fail(&mut self) {
        self.banner.show(FAILURE_MESSAGE);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;
    use crate::model::fixtures::{current, day};
    use chrono::{NaiveDate, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 15, 4, 5).unwrap()
    }

    fn snapshot() -> WeatherSnapshot {
        let daily = (0..=7)
            .map(|o| {
                let date = NaiveDate::from_ymd_opt(2026, 10, 16 + u32::from(o)).unwrap();
                day(o, date, 290.0, 55.0)
            })
            .collect();
        WeatherSnapshot::new(current("Delhi"), daily)
    }

    #[test]
    fn formats_current_conditions() {
        let view = CurrentView::from_conditions(&current("Delhi"), TemperatureUnit::Celsius, &now());

        assert_eq!(view.icon_url, "https://openweathermap.org/img/w/01d.png");
        assert_eq!(view.temperature, "27 °C");
        assert_eq!(view.description, "clear sky");
        assert_eq!(view.location, "Delhi, IN");
        assert_eq!(view.wind, "Wind Speed: 3.6 m/s");
        assert_eq!(view.humidity, "Humidity: 40%");
        assert_eq!(view.datetime, "Friday, October 16, 2026 at 3:04:05 PM");
    }

    #[test]
    fn forecast_row_rounds_humidity() {
        let d = day(1, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(), 283.4, 41.6);
        let row = ForecastRow::from_daily(&d, TemperatureUnit::Fahrenheit);

        assert_eq!(row.date, "Sat, Oct 17");
        assert_eq!(row.temperature, "50 °F");
        assert_eq!(row.humidity, "42%");
    }

    #[test]
    fn render_hides_banner_and_draws_one_chart() {
        let recorder = Recorder::default();
        let mut presenter = Presenter::new(recorder.clone(), TemperatureUnit::Celsius);

        presenter.fail();
        assert!(presenter.banner().is_visible());

        let view = presenter.render(snapshot(), &now()).expect("render");
        assert!(!presenter.banner().is_visible());
        assert!(presenter.has_chart());
        assert_eq!(view.chart.labels().len(), 7);
        assert_eq!(view.forecast.len(), 7);
        assert_eq!(recorder.created.lock().unwrap().len(), 1);
        assert_eq!(*recorder.destroyed.lock().unwrap(), 0);
    }

    #[test]
    fn rerender_destroys_previous_chart_first() {
        let recorder = Recorder::default();
        let mut presenter = Presenter::new(recorder.clone(), TemperatureUnit::Celsius);

        presenter.render(snapshot(), &now()).expect("first render");
        presenter.render(snapshot(), &now()).expect("second render");

        assert_eq!(recorder.created.lock().unwrap().len(), 2);
        assert_eq!(*recorder.destroyed.lock().unwrap(), 1);
    }

    #[derive(Debug)]
    struct BrokenRenderer;

    impl ChartRenderer for BrokenRenderer {
        type Handle = super::testing::RecordedChart;

        fn create(&mut self, _config: &ChartConfig) -> anyhow::Result<Self::Handle> {
            anyhow::bail!("no drawing surface")
        }
    }

    #[test]
    fn renderer_error_shows_banner_and_leaves_no_chart() {
        let mut presenter = Presenter::new(BrokenRenderer, TemperatureUnit::Celsius);

        let err = presenter.render(snapshot(), &now()).unwrap_err();
        assert_eq!(err.to_string(), "no drawing surface");
        assert!(presenter.banner().is_visible());
        assert_eq!(presenter.banner().message(), Some(FAILURE_MESSAGE));
        assert!(!presenter.has_chart());
    }

    #[test]
    fn fail_shows_fixed_message_without_chart() {
        let mut presenter = Presenter::new(Recorder::default(), TemperatureUnit::Celsius);
        presenter.fail();

        assert_eq!(
            presenter.banner().message(),
            Some("Failed to fetch weather data. Please try again.")
        );
        assert!(!presenter.has_chart());
    }
}
