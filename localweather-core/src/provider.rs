use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, model::WeatherRequest};

pub mod openweather;

pub use openweather::{OpenWeatherClient, parse_snapshot};

/// A remote weather service returning the raw current-conditions document.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, request: &WeatherRequest) -> Result<String, FetchError>;
}
