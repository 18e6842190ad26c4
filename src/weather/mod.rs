pub mod openweather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openweather::OpenWeatherClient;

/// Geographic position returned by geocoding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("City not found")]
    CityNotFound(String),

    #[error("Weather API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Weather API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected weather API response: {0}")]
    Decode(String),
}

/// Source of live weather data
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Resolve a city name to coordinates (first match)
    async fn geocode(&self, city: &str) -> Result<Coordinates, WeatherError>;

    /// Current air temperature at `coords`, in the provider's configured units
    async fn current_temperature(&self, coords: Coordinates) -> Result<f64, WeatherError>;
}
