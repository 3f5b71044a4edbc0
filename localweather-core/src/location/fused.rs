use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{config::LocationConfig, error::LocationError, model::Coordinates};

use super::{LocationSource, Permission};

/// Location service for a desktop machine: configured coordinates stand in
/// for the cached fix, and IP geolocation provides a fresh one.
#[derive(Debug, Clone)]
pub struct FusedLocation {
    permission: Permission,
    enabled: bool,
    last_known: Option<Coordinates>,
    network: Option<IpLocator>,
}

impl FusedLocation {
    pub fn new(
        permission: Permission,
        enabled: bool,
        last_known: Option<Coordinates>,
        network: Option<IpLocator>,
    ) -> Self {
        Self {
            permission,
            enabled,
            last_known,
            network,
        }
    }

    pub fn from_config(
        config: &LocationConfig,
        permission: Permission,
        timeout: Duration,
    ) -> Result<Self, LocationError> {
        let network = if config.network_lookup {
            Some(IpLocator::new(&config.lookup_url, timeout)?)
        } else {
            None
        };

        Ok(Self::new(
            permission,
            config.enabled,
            config.fixed_coordinates(),
            network,
        ))
    }
}

#[async_trait]
impl LocationSource for FusedLocation {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn is_enabled(&self) -> bool {
        self.enabled && (self.last_known.is_some() || self.network.is_some())
    }

    async fn last_known(&self) -> Result<Option<Coordinates>, LocationError> {
        Ok(self.last_known)
    }

    async fn current(
        &self,
        cancel: CancellationToken,
    ) -> Result<Option<Coordinates>, LocationError> {
        let Some(network) = &self.network else {
            return Ok(None);
        };

        tracing::debug!("requesting network location");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LocationError::Cancelled),
            res = network.lookup() => res.map(Some),
        }
    }
}

/// Coarse geolocation from the machine's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    endpoint: Url,
    http: Client,
}

impl IpLocator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LocationError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            LocationError::Lookup(format!("invalid lookup URL '{endpoint}': {e}"))
        })?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        Ok(Self {
            endpoint,
            http,
        })
    }

    pub async fn lookup(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::Lookup(format!(
                "lookup service returned status {status}"
            )));
        }

        let body: IpLookupResponse =
            res.json().await.map_err(|e| LocationError::Lookup(e.to_string()))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(LocationError::Lookup(reason));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => Err(LocationError::Lookup(
                "lookup response has no coordinates".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}
