use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use skyline_core::{
    App, Config, Coordinate, DeniedGeolocator, FixedGeolocator, Geolocator, Locator,
    OpenWeatherProvider, Outcome, Pipeline, Presenter, RenderedView, Request, TemperatureUnit,
    WeatherError, provider::provider_from_config,
};

use crate::{page, render::TerminalChart};

type CliApp = App<OpenWeatherProvider, Box<dyn Geolocator>, TerminalChart>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skyline",
    version,
    about = "Current weather and a week of daily forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the commands that fetch weather.
#[derive(Debug, clap::Args)]
pub struct DisplayArgs {
    /// Device position as LAT,LON; overrides the config file.
    #[arg(long, allow_hyphen_values = true)]
    coords: Option<Coordinate>,

    /// Behave as if location access was refused.
    #[arg(long, conflicts_with = "coords")]
    no_locate: bool,

    /// Temperature unit: celsius (c) or fahrenheit (f).
    #[arg(long)]
    unit: Option<TemperatureUnit>,

    /// Also write a browser page with the chart to this path.
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, default city and temperature unit.
    Configure,

    /// Show weather once, for a city or the current location.
    Show {
        /// City name; if absent, the device position or default city is used.
        city: Option<String>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Show weather for the current location, then prompt for cities.
    Interactive {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, display } => {
                let config = Config::load()?;
                let app = build_app(&config, &display)?;

                let request = match city {
                    Some(city) => Request::city(&city)?,
                    None => Request::Locate,
                };

                let outcome = app.refresh(request).await?;
                let failed = matches!(outcome, Outcome::Failed(_));
                report(&app, &outcome, display.html.as_deref()).await?;

                if failed {
                    std::process::exit(1);
                }
                Ok(())
            }
            Command::Interactive { display } => {
                let config = Config::load()?;
                let app = build_app(&config, &display)?;

                let outcome = app.refresh(Request::Locate).await?;
                report(&app, &outcome, display.html.as_deref()).await?;

                loop {
                    let input = match Text::new("City:")
                        .with_help_message("Esc to quit")
                        .prompt()
                    {
                        Ok(input) => input,
                        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                            return Ok(());
                        }
                        Err(err) => return Err(err.into()),
                    };

                    let request = match Request::city(&input) {
                        Ok(request) => request,
                        Err(err @ WeatherError::EmptyCity) => {
                            println!("{err}");
                            continue;
                        }
                        Err(err) => return Err(err.into()),
                    };

                    let outcome = app.refresh(request).await?;
                    report(&app, &outcome, display.html.as_deref()).await?;
                }
            }
        }
    }
}

fn build_app(config: &Config, display: &DisplayArgs) -> anyhow::Result<CliApp> {
    let provider = provider_from_config(config)?;

    let geolocator: Box<dyn Geolocator> = if display.no_locate {
        Box::new(DeniedGeolocator)
    } else {
        Box::new(FixedGeolocator(display.coords.or(config.location)))
    };
    let locator = Locator::new(geolocator, config.default_city.clone());

    let unit = display.unit.unwrap_or(config.unit);
    let presenter = Presenter::new(TerminalChart::default(), unit);

    Ok(App::new(Pipeline::new(provider, locator), presenter))
}

async fn report(app: &CliApp, outcome: &Outcome, html: Option<&Path>) -> anyhow::Result<()> {
    let presenter = app.presenter().lock().await;

    match outcome {
        Outcome::Rendered(view) => {
            print_view(view);
            if let Some(frame) = presenter.renderer().frame() {
                println!("\n{frame}");
            }
        }
        Outcome::Failed(message) => eprintln!("{message}"),
        Outcome::Stale => return Ok(()),
    }

    if let Some(path) = html {
        let view = match outcome {
            Outcome::Rendered(view) => Some(view),
            _ => None,
        };
        page::write(path, view, presenter.banner())?;
    }

    Ok(())
}

fn print_view(view: &RenderedView) {
    let current = &view.current;
    println!("{}", current.location);
    println!("{}", current.datetime);
    println!("{}  {}", current.temperature, current.description);
    println!("{}", current.wind);
    println!("{}", current.humidity);
    println!("Icon: {}", current.icon_url);

    if !view.forecast.is_empty() {
        println!("\nForecast");
        for row in &view.forecast {
            println!(
                "  {:<12} {:>7} {:>5}  {}",
                row.date, row.temperature, row.humidity, row.description
            );
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    let default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .with_help_message("Used when the location is unknown")
        .prompt()?;
    if !default_city.trim().is_empty() {
        config.default_city = default_city.trim().to_string();
    }

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units)
        .with_starting_cursor(start)
        .prompt()?;

    config.save()?;

    let path = Config::config_file_path().context("Failed to locate config file")?;
    println!("Saved configuration to {}", path.display());
    if config.api_key().is_err() {
        println!("No API key set yet; weather lookups will fail until one is configured.");
    }

    Ok(())
}
