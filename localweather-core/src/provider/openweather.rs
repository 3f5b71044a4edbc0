use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::{
    config::OpenWeatherConfig,
    error::{FetchError, ParseError},
    model::{Coordinates, WeatherRequest, WeatherSnapshot},
};

use super::WeatherSource;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: Url,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)?;

        Ok(Self {
            api_key,
            base_url,
            http,
        })
    }

    pub fn from_config(api_key: String, config: &OpenWeatherConfig) -> Result<Self, FetchError> {
        Self::new(
            api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Current-weather URL for the given coordinates, metric units.
    pub fn request_url(
        &self,
        coordinates: Coordinates,
        lang: Option<&str>,
    ) -> Result<Url, FetchError> {
        let mut url = self.base_url.join(CURRENT_WEATHER_PATH)?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("lat", &coordinates.latitude.to_string())
                .append_pair("lon", &coordinates.longitude.to_string())
                .append_pair("units", "metric")
                .append_pair("appid", &self.api_key);

            if let Some(lang) = lang {
                query.append_pair("lang", lang);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self, request: &WeatherRequest) -> Result<String, FetchError> {
        let url = self.request_url(request.coordinates, request.lang.as_deref())?;

        tracing::debug!(
            coords = %request.coordinates,
            lang = ?request.lang,
            "fetching current weather"
        );

        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        tracing::debug!(bytes = body.len(), "weather response received");
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

/// Parse an OpenWeather current-weather document into a snapshot.
///
/// Every displayed field is required; a document missing any of them is rejected whole.
pub fn parse_snapshot(body: &str) -> Result<WeatherSnapshot, ParseError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let weather = parsed
        .weather
        .into_iter()
        .next()
        .ok_or(ParseError::MissingField("weather[0]"))?;

    Ok(WeatherSnapshot {
        city: parsed.name,
        temperature_c: parsed.main.temp,
        description: weather.description,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed_mps: parsed.wind.speed,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
        icon: weather.icon,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
