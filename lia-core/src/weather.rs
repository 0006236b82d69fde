//! Current weather for the analyzed site.
//!
//! The weather call never fails from the caller's point of view: a transport
//! error, an unparseable body or a payload missing the `main`/`weather`
//! sections all collapse into [`WeatherSnapshot::unavailable`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[cfg(feature = "api")]
use log::{debug, warn};
#[cfg(feature = "api")]
use reqwest::Client;

/// OpenWeatherMap current-weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Description used when no weather data could be obtained.
pub const UNAVAILABLE: &str = "Unavailable";

/// Normalized weather observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub description: String,
    /// Precipitation over the last hour in millimeters
    #[serde(rename = "precipitation")]
    pub rain_1h: f64,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        WeatherSnapshot::unavailable()
    }
}

impl WeatherSnapshot {
    /// The zeroed snapshot substituted whenever the provider gives us nothing usable.
    pub fn unavailable() -> Self {
        WeatherSnapshot {
            temperature: 0.0,
            humidity: 0.0,
            description: UNAVAILABLE.to_string(),
            rain_1h: 0.0,
        }
    }

    /// Normalize an OpenWeatherMap payload.
    ///
    /// Requires `main.temp`, `main.humidity` and `weather[0].description`;
    /// returns `None` if any of them is missing or mistyped. `rain.1h` is
    /// optional and defaults to zero.
    pub fn from_response(data: &Value) -> Option<Self> {
        let main = data.get("main")?;
        let weather = data.get("weather")?;

        let temperature = main.get("temp")?.as_f64()?;
        let humidity = main.get("humidity")?.as_f64()?;
        let description = weather.get(0)?.get("description")?.as_str()?.to_string();
        let rain_1h = data
            .get("rain")
            .and_then(|rain| rain.get("1h"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Some(WeatherSnapshot {
            temperature,
            humidity,
            description,
            rain_1h,
        })
    }
}

impl fmt::Display for WeatherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {}°C; {}% humidity; {} mm rain (1h)",
            self.description, self.temperature, self.humidity, self.rain_1h
        )
    }
}

/// Client for the current-weather endpoint.
///
/// Makes exactly one request per [`fetch`](WeatherClient::fetch); no retry,
/// no caching, transport default timeouts.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

#[cfg(feature = "api")]
impl Default for WeatherClient {
    fn default() -> Self {
        WeatherClient::new(DEFAULT_WEATHER_URL)
    }
}

#[cfg(feature = "api")]
impl WeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        WeatherClient {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current weather at a coordinate.
    ///
    /// Any failure is logged and replaced by [`WeatherSnapshot::unavailable`].
    /// An empty `api_key` skips the request entirely.
    pub async fn fetch(&self, latitude: f64, longitude: f64, api_key: &str) -> WeatherSnapshot {
        if api_key.is_empty() {
            warn!("No weather API key configured, skipping weather lookup");
            return WeatherSnapshot::unavailable();
        }

        match self.request(latitude, longitude, api_key).await {
            Ok(data) => match WeatherSnapshot::from_response(&data) {
                Some(snapshot) => {
                    debug!("Weather at ({}, {}): {}", latitude, longitude, snapshot);
                    snapshot
                }
                None => {
                    warn!("Weather API error: {}", data);
                    WeatherSnapshot::unavailable()
                }
            },
            Err(e) => {
                // Strip the URL so the api key does not end up in the log
                warn!("Error fetching weather: {}", e.without_url());
                WeatherSnapshot::unavailable()
            }
        }
    }

    async fn request(
        &self,
        latitude: f64,
        longitude: f64,
        api_key: &str,
    ) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.base_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?
            .json::<Value>()
            .await
    }
}
