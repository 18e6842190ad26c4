use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::config::WeatherConfig;
use super::{Coordinates, WeatherError, WeatherProvider};

/// OpenWeatherMap geocoding + current weather client
pub struct OpenWeatherClient {
    api_key: String,
    geo_url: String,
    weather_url: String,
    units: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            geo_url: config.geo_url.clone(),
            weather_url: config.weather_url.clone(),
            units: config.units.clone(),
            client,
        })
    }

    async fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String, WeatherError> {
        let response = self.client.get(url).query(query).send().await?;
        check_status(response.status())?;
        Ok(response.text().await?)
    }
}

/// 401 means a bad key; any other non-success status is a generic failure.
pub fn check_status(status: StatusCode) -> Result<(), WeatherError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(WeatherError::InvalidApiKey);
    }
    if !status.is_success() {
        return Err(WeatherError::Status(status));
    }
    Ok(())
}

/// Decode a geocoding body; an empty result list means the city is unknown.
pub fn parse_geocode(body: &str, city: &str) -> Result<Coordinates, WeatherError> {
    let entries: Vec<GeoEntry> =
        serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    entries
        .into_iter()
        .next()
        .map(|e| Coordinates { lat: e.lat, lon: e.lon })
        .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))
}

/// Decode a current-weather body into `main.temp`.
pub fn parse_current(body: &str) -> Result<f64, WeatherError> {
    let weather: CurrentWeather =
        serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    Ok(weather.main.temp)
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn name(&self) -> &str { "openweathermap" }

    async fn geocode(&self, city: &str) -> Result<Coordinates, WeatherError> {
        let body = self
            .get_body(
                &self.geo_url,
                &[
                    ("q", city.to_string()),
                    ("limit", "1".to_string()),
                    ("appid", self.api_key.clone()),
                ],
            )
            .await?;
        let coords = parse_geocode(&body, city)?;
        tracing::debug!(city, lat = coords.lat, lon = coords.lon, "Geocoded city");
        Ok(coords)
    }

    async fn current_temperature(&self, coords: Coordinates) -> Result<f64, WeatherError> {
        let body = self
            .get_body(
                &self.weather_url,
                &[
                    ("lat", coords.lat.to_string()),
                    ("lon", coords.lon.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", self.units.clone()),
                ],
            )
            .await?;
        parse_current(&body)
    }
}
