use async_trait::async_trait;
use deskhub_core::config::WeatherConfig;
use deskhub_core::failure::ensure_success;
use deskhub_core::{Source, SourceFailure, WeatherReading};
use serde::Deserialize;
use tracing::debug;

use crate::codes::describe;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code";

#[derive(Debug, Deserialize)]
struct Forecast {
    #[serde(default)]
    current: Option<Current>,
}

#[derive(Debug, Deserialize)]
struct Current {
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    // Open-Meteo sends integers, but `3.0` is accepted too
    #[serde(default)]
    weather_code: Option<f64>,
}

impl Current {
    /// The WMO code, if it is a whole number.
    fn code(&self) -> Option<i64> {
        self.weather_code
            .filter(|code| code.is_finite() && code.fract() == 0.0)
            .map(|code| code as i64)
    }
}

/// Current conditions for a fixed location.
pub struct OpenMeteoSource {
    http: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl OpenMeteoSource {
    pub fn new(http: reqwest::Client, config: &WeatherConfig) -> Self {
        OpenMeteoSource {
            http,
            base_url: config.base_url.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
        }
    }
}

#[async_trait]
impl Source for OpenMeteoSource {
    type Record = WeatherReading;

    fn name(&self) -> &'static str {
        "weather"
    }

    async fn fetch(&self) -> Result<WeatherReading, SourceFailure> {
        let latitude = self.latitude.to_string();
        let longitude = self.longitude.to_string();

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
            ])
            .send()
            .await?;

        let forecast: Forecast = ensure_success(response)?.json().await?;

        let Some(current) = forecast.current else {
            return Ok(WeatherReading {
                temp: None,
                description: describe(None),
            });
        };

        debug!(
            temperature = ?current.temperature_2m,
            humidity = ?current.relative_humidity_2m,
            code = ?current.weather_code,
            "Open-Meteo current conditions"
        );

        Ok(WeatherReading {
            temp: current.temperature_2m,
            description: describe(current.code()),
        })
    }
}
