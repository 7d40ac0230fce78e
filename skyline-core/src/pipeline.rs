//! The request cycle: locate, fetch current conditions, fetch the forecast,
//! aggregate and hand the snapshot to the presenter.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::{Mutex, watch};

use crate::{
    aggregate::aggregate,
    chart::ChartRenderer,
    error::WeatherError,
    locator::{Geolocator, Locator},
    model::{LocationQuery, WeatherSnapshot},
    presenter::{Presenter, RenderedView},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Locating,
    FetchingCurrent,
    FetchingForecast,
    Rendered,
    Failed,
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Use the device position, or the default city.
    Locate,
    City(String),
}

impl Request {
    /// A city request from free-form input. Blank input is rejected.
    pub fn city(input: &str) -> Result<Self, WeatherError> {
        let city = input.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }
        Ok(Request::City(city.to_string()))
    }
}

/// Identifies one run of the pipeline. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Pipeline<P, G> {
    provider: P,
    locator: Locator<G>,
    generation: AtomicU64,
    state: watch::Sender<PipelineState>,
}

impl<P: WeatherProvider, G: Geolocator> Pipeline<P, G> {
    pub fn new(provider: P, locator: Locator<G>) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            provider,
            locator,
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Starts a new generation; results of older tickets become stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    fn transition(&self, ticket: Ticket, next: PipelineState) {
        if self.is_current(ticket) {
            tracing::info!(generation = ticket.0, state = ?next, "pipeline");
            self.state.send_replace(next);
        }
    }

    /// Marks the end of a run that the caller has rendered or reported.
    pub fn finish(&self, ticket: Ticket, ok: bool) {
        let state = if ok {
            PipelineState::Rendered
        } else {
            PipelineState::Failed
        };
        self.transition(ticket, state);
    }

    /// Runs the fetch stages for `ticket`. `today` fixes both the reference
    /// day and the time zone used for bucketing.
    pub async fn fetch<Tz: TimeZone>(
        &self,
        ticket: Ticket,
        request: &Request,
        today: &DateTime<Tz>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let query = match request {
            Request::Locate => {
                self.transition(ticket, PipelineState::Locating);
                self.locator.locate().await
            }
            Request::City(city) => LocationQuery::City(city.clone()),
        };

        self.transition(ticket, PipelineState::FetchingCurrent);
        let current = self.provider.fetch_current(&query).await?;

        // The forecast is keyed by the name the provider resolved, not the
        // original query.
        self.transition(ticket, PipelineState::FetchingForecast);
        let samples = self.provider.fetch_forecast(&current.city).await?;

        let daily = aggregate(&samples, today);
        Ok(WeatherSnapshot::new(current, daily))
    }
}

/// Result of one user-triggered refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rendered(RenderedView),
    /// The banner is showing this message.
    Failed(String),
    /// A newer request started before this one finished; nothing changed.
    Stale,
}

/// Couples a pipeline with the presenter that displays its results.
pub struct App<P, G, R: ChartRenderer> {
    pipeline: Pipeline<P, G>,
    presenter: Mutex<Presenter<R>>,
}

impl<P, G, R> App<P, G, R>
where
    P: WeatherProvider,
    G: Geolocator,
    R: ChartRenderer,
{
    pub fn new(pipeline: Pipeline<P, G>, presenter: Presenter<R>) -> Self {
        Self {
            pipeline,
            presenter: Mutex::new(presenter),
        }
    }

    pub fn pipeline(&self) -> &Pipeline<P, G> {
        &self.pipeline
    }

    pub fn presenter(&self) -> &Mutex<Presenter<R>> {
        &self.presenter
    }

    pub async fn refresh(&self, request: Request) -> anyhow::Result<Outcome> {
        self.refresh_at(request, &Local::now()).await
    }

    /// Runs one cycle as of `now`. Fetch failures show the banner; results
    /// of superseded requests are dropped.
    pub async fn refresh_at<Tz: TimeZone>(
        &self,
        request: Request,
        now: &DateTime<Tz>,
    ) -> anyhow::Result<Outcome>
    where
        Tz::Offset: std::fmt::Display,
    {
        let ticket = self.pipeline.begin();
        let result = self.pipeline.fetch(ticket, &request, now).await;

        if !self.pipeline.is_current(ticket) {
            tracing::debug!(?request, "dropping result of superseded request");
            return Ok(Outcome::Stale);
        }

        let mut presenter = self.presenter.lock().await;
        match result {
            Ok(snapshot) => {
                let view = presenter.render(snapshot, now);
                self.pipeline.finish(ticket, view.is_ok());
                Ok(Outcome::Rendered(view?))
            }
            Err(err) if err.is_fetch_failure() => {
                tracing::error!(error = %err, "error fetching weather");
                presenter.fail();
                self.pipeline.finish(ticket, false);
                let message = presenter.banner().message().unwrap_or_default().to_string();
                Ok(Outcome::Failed(message))
            }
            Err(err) => {
                self.pipeline.finish(ticket, false);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        locator::DeniedGeolocator,
        model::{CurrentConditions, RawSample, TemperatureUnit, fixtures},
        presenter::testing::Recorder,
    };
    use chrono::Utc;

    #[derive(Debug)]
    struct Canned;

    #[async_trait]
    impl WeatherProvider for Canned {
        async fn fetch_current(
            &self,
            query: &LocationQuery,
        ) -> Result<CurrentConditions, WeatherError> {
            match query {
                LocationQuery::City(city) if city == "Nowhere" => Err(WeatherError::Provider {
                    endpoint: "current",
                    status: 404,
                    body: "city not found".into(),
                }),
                LocationQuery::City(city) => Ok(fixtures::current(&format!("{city} City"))),
                LocationQuery::Coordinate(_) => Ok(fixtures::current("Here")),
            }
        }

        async fn fetch_forecast(&self, city: &str) -> Result<Vec<RawSample>, WeatherError> {
            assert!(city.ends_with("City"), "forecast keyed by resolved name");
            Ok(Vec::new())
        }
    }

    fn app() -> App<Canned, DeniedGeolocator, Recorder> {
        let pipeline = Pipeline::new(Canned, Locator::new(DeniedGeolocator, "Delhi"));
        App::new(pipeline, Presenter::new(Recorder::default(), TemperatureUnit::Celsius))
    }

    #[test]
    fn blank_city_is_rejected() {
        assert!(matches!(Request::city("   "), Err(WeatherError::EmptyCity)));
        assert_eq!(Request::city(" Oslo ").unwrap(), Request::City("Oslo".into()));
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let pipeline = Pipeline::new(Canned, Locator::new(DeniedGeolocator, "Delhi"));
        let first = pipeline.begin();
        assert!(pipeline.is_current(first));

        let second = pipeline.begin();
        assert!(second > first);
        assert!(!pipeline.is_current(first));
        assert!(pipeline.is_current(second));
    }

    #[tokio::test]
    async fn locate_falls_back_and_renders() {
        let app = app();
        let outcome = app.refresh_at(Request::Locate, &Utc::now()).await.unwrap();

        match outcome {
            Outcome::Rendered(view) => assert_eq!(view.current.location, "Delhi City, IN"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(app.pipeline().state(), PipelineState::Rendered);
    }

    #[tokio::test]
    async fn provider_error_shows_banner() {
        let app = app();
        let outcome = app
            .refresh_at(Request::City("Nowhere".into()), &Utc::now())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed("Failed to fetch weather data. Please try again.".into())
        );
        assert_eq!(app.pipeline().state(), PipelineState::Failed);
        assert!(!app.presenter().lock().await.has_chart());
    }
}
