//! In-memory location and weather sources for unit tests.

use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{FetchError, LocationError},
    location::{LocationSource, Permission},
    model::{Coordinates, WeatherRequest},
    provider::WeatherSource,
};

#[derive(Debug)]
pub struct FakeLocation {
    pub permission: Permission,
    pub enabled: bool,
    pub cached: Option<Coordinates>,
    pub fresh: Option<Coordinates>,
    pub last_known_fails: bool,
    pub last_known_calls: AtomicUsize,
    pub current_calls: AtomicUsize,
}

impl FakeLocation {
    fn with(cached: Option<Coordinates>, fresh: Option<Coordinates>) -> Self {
        Self {
            permission: Permission::Granted,
            enabled: true,
            cached,
            fresh,
            last_known_fails: false,
            last_known_calls: AtomicUsize::new(0),
            current_calls: AtomicUsize::new(0),
        }
    }

    pub fn cached(coords: Coordinates) -> Self {
        Self::with(Some(coords), None)
    }

    pub fn fresh(coords: Coordinates) -> Self {
        Self::with(None, Some(coords))
    }

    pub fn nothing() -> Self {
        Self::with(None, None)
    }
}

#[async_trait]
impl LocationSource for FakeLocation {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn last_known(&self) -> Result<Option<Coordinates>, LocationError> {
        self.last_known_calls.fetch_add(1, Ordering::SeqCst);
        if self.last_known_fails {
            return Err(LocationError::Lookup("cache unavailable".into()));
        }
        Ok(self.cached)
    }

    async fn current(
        &self,
        _cancel: CancellationToken,
    ) -> Result<Option<Coordinates>, LocationError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fresh)
    }
}

/// Serves queued bodies in order, or a fixed HTTP status.
#[derive(Debug)]
pub struct FakeWeather {
    bodies: Mutex<VecDeque<String>>,
    status: Option<u16>,
    pub requests: Mutex<Vec<WeatherRequest>>,
}

impl FakeWeather {
    pub fn responding<I: IntoIterator<Item = String>>(bodies: I) -> Self {
        Self {
            bodies: Mutex::new(bodies.into_iter().collect()),
            status: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            bodies: Mutex::new(VecDeque::new()),
            status: Some(status),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn fetch(&self, request: &WeatherRequest) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(status) = self.status {
            return Err(FetchError::Status {
                status,
                body: "error".into(),
            });
        }

        let body = self.bodies.lock().unwrap().pop_front();
        Ok(body.unwrap_or_default())
    }
}

/// Weather source whose fetch panics, killing the activation task.
#[derive(Debug)]
pub struct PanickingWeather;

#[async_trait]
impl WeatherSource for PanickingWeather {
    async fn fetch(&self, _request: &WeatherRequest) -> Result<String, FetchError> {
        panic!("weather backend crashed");
    }
}

/// A complete current-weather document.
pub fn weather_doc(city: &str, temp: f64, description: &str) -> String {
    serde_json::json!({
        "name": city,
        "main": {"temp": temp, "feels_like": temp, "humidity": 50, "pressure": 1013},
        "wind": {"speed": 2.0},
        "sys": {"sunrise": 1_700_000_000, "sunset": 1_700_033_000},
        "weather": [{"description": description, "icon": "01d"}]
    })
    .to_string()
}
