use thiserror::Error;

/// Message shown in the error banner for every fetch failure.
pub const FAILURE_MESSAGE: &str = "Failed to fetch weather data. Please try again.";

/// Geolocation failures. These never reach the user: the locator falls back
/// to the configured default city.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location service unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered with a non-success status.
    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Provider {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be turned into the expected structure.
    #[error("Failed to decode OpenWeather {endpoint} response: {reason}")]
    Decode {
        endpoint: &'static str,
        reason: String,
    },

    #[error("Failed to reach OpenWeather: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `skyline configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("Please enter a city name")]
    EmptyCity,
}

impl WeatherError {
    /// Whether this error belongs on the failure banner. Input validation
    /// errors are reported to the user directly instead.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            WeatherError::Provider { .. } | WeatherError::Decode { .. } | WeatherError::Transport(_)
        )
    }
}
