//! One screen's worth of activations.
//!
//! [`Session`] owns the [`Screen`] and is driven from a single task. Each
//! activation runs the pipeline on a spawned task; its result comes back
//! through the task's join handle, and only [`Session::next_delivery`]
//! writes to the screen.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{LocationError, PipelineError},
    location::{LocationSource, locate},
    model::{WeatherRequest, WeatherSnapshot},
    provider::{WeatherSource, parse_snapshot},
    render::Screen,
};

/// Location → fetch → parse, run once per activation.
#[derive(Debug, Clone)]
pub struct Pipeline {
    location: Arc<dyn LocationSource>,
    weather: Arc<dyn WeatherSource>,
    lang: Option<String>,
}

impl Pipeline {
    pub fn new(
        location: Arc<dyn LocationSource>,
        weather: Arc<dyn WeatherSource>,
        lang: Option<String>,
    ) -> Self {
        Self {
            location,
            weather,
            lang,
        }
    }

    pub async fn run(
        &self,
        cancel: &CancellationToken,
    ) -> Result<WeatherSnapshot, PipelineError> {
        let coordinates = locate(self.location.as_ref(), cancel)
            .await
            .inspect_err(|e| match e {
                LocationError::PermissionDenied => {
                    tracing::info!("location permission not granted")
                }
                other => tracing::warn!("location unavailable: {other}"),
            })?;

        let request = WeatherRequest {
            coordinates,
            lang: self.lang.clone(),
        };

        let body = self
            .weather
            .fetch(&request)
            .await
            .inspect_err(|e| tracing::error!("weather fetch failed: {e}"))?;

        let snapshot = parse_snapshot(&body)
            .inspect_err(|e| tracing::error!("weather parse failed: {e}"))?;

        tracing::info!(
            city = %snapshot.city,
            temp = snapshot.temperature_c,
            "weather updated"
        );
        Ok(snapshot)
    }
}

pub type ActivationId = u64;

/// Result of one activation, delivered back to the session.
#[derive(Debug)]
pub struct Delivery {
    pub activation: ActivationId,
    pub result: Result<WeatherSnapshot, PipelineError>,
}

type ActivationTask = JoinHandle<Result<WeatherSnapshot, PipelineError>>;

#[derive(Debug)]
pub struct Session {
    pipeline: Arc<Pipeline>,
    screen: Screen,
    cancel: CancellationToken,
    next_id: ActivationId,
    in_flight: Option<(ActivationId, ActivationTask)>,
}

impl Session {
    pub fn init(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            screen: Screen::default(),
            cancel: CancellationToken::new(),
            next_id: 1,
            in_flight: None,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start an activation on a background task. Returns `None` if one is
    /// already running.
    pub fn activate(&mut self) -> Option<ActivationId> {
        if let Some((id, _)) = &self.in_flight {
            tracing::debug!(activation = id, "activation already in flight, ignoring");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        let pipeline = Arc::clone(&self.pipeline);
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move { pipeline.run(&cancel).await });

        tracing::debug!(activation = id, "activation started");
        self.in_flight = Some((id, task));
        Some(id)
    }

    /// Wait for the running activation to finish and apply it to the screen.
    ///
    /// Returns `None` when nothing is in flight. Failures, including a
    /// crashed activation task, leave the screen as it was.
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        let (activation, task) = self.in_flight.take()?;

        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(activation, "activation task failed: {e}");
                Err(PipelineError::Aborted(e.to_string()))
            }
        };

        if let Ok(snapshot) = &result {
            self.screen.render(snapshot);
        }

        Some(Delivery { activation, result })
    }

    /// Stop the session. A pending location request is cancelled; a fetch
    /// already under way runs to completion and its result is dropped.
    pub async fn teardown(mut self) {
        self.cancel.cancel();

        if let Some((id, task)) = self.in_flight.take() {
            if let Err(e) = task.await {
                tracing::warn!(activation = id, "activation task failed: {e}");
            }
        }

        tracing::debug!("session torn down");
    }
}
