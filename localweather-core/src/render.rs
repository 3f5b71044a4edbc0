//! Turning a [`WeatherSnapshot`] into display text.

use chrono::{DateTime, Local, TimeZone};

use crate::model::WeatherSnapshot;

pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Image URL for an OpenWeather icon id such as `01d`.
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}@2x.png")
}

/// Format Unix seconds as `HH:MM` wall-clock time in `tz`.
pub fn format_clock<Tz: TimeZone>(unix_secs: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(unix_secs, 0)?;
    Some(utc.with_timezone(tz).format("%H:%M").to_string())
}

/// Format Unix seconds as `HH:MM` in the machine's local time zone.
pub fn format_local_clock(unix_secs: i64) -> Option<String> {
    format_clock(unix_secs, &Local)
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius:.1} °C")
}

/// What is currently on screen. Only replaced wholesale by [`Screen::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screen {
    pub city: Option<String>,
    pub temperature: Option<String>,
    pub condition: Option<String>,
    pub feels_like: Option<String>,
    pub humidity: Option<String>,
    pub wind: Option<String>,
    pub pressure: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub icon_url: Option<String>,
}

impl Screen {
    pub fn render(&mut self, snapshot: &WeatherSnapshot) {
        self.render_in(snapshot, &Local);
    }

    pub fn render_in<Tz: TimeZone>(&mut self, snapshot: &WeatherSnapshot, tz: &Tz)
    where
        Tz::Offset: std::fmt::Display,
    {
        let feels_like = format_temperature(snapshot.feels_like_c);

        *self = Screen {
            city: Some(snapshot.city.clone()),
            temperature: Some(format_temperature(snapshot.temperature_c)),
            condition: Some(snapshot.description.clone()),
            feels_like: Some(format!("Feels like {feels_like}")),
            humidity: Some(format!("Humidity: {}%", snapshot.humidity_pct)),
            wind: Some(format!("Wind: {:.1} m/s", snapshot.wind_speed_mps)),
            pressure: Some(format!("Pressure: {} hPa", snapshot.pressure_hpa)),
            sunrise: format_clock(snapshot.sunrise, tz).map(|t| format!("Sunrise: {t}")),
            sunset: format_clock(snapshot.sunset, tz).map(|t| format!("Sunset: {t}")),
            icon_url: Some(icon_url(&snapshot.icon)),
        };
    }

    pub fn is_blank(&self) -> bool {
        self.city.is_none()
    }

    /// Display lines in screen order, skipping fields that aren't shown.
    pub fn lines(&self) -> Vec<String> {
        [
            &self.city,
            &self.temperature,
            &self.condition,
            &self.feels_like,
            &self.humidity,
            &self.wind,
            &self.pressure,
            &self.sunrise,
            &self.sunset,
            &self.icon_url,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}
