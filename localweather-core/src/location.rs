use async_trait::async_trait;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

use crate::{error::LocationError, model::Coordinates};

pub mod fused;

pub use fused::{FusedLocation, IpLocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// A device location service.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    fn permission(&self) -> Permission;

    /// Whether any location provider is switched on.
    fn is_enabled(&self) -> bool;

    /// Cached fix, if one is available. Never triggers a new lookup.
    async fn last_known(&self) -> Result<Option<Coordinates>, LocationError>;

    /// Actively request a fresh fix at the best accuracy the source offers.
    /// Must return `Cancelled` once `cancel` fires.
    async fn current(
        &self,
        cancel: CancellationToken,
    ) -> Result<Option<Coordinates>, LocationError>;
}

/// Obtain the best available coordinates: last-known first, then a fresh
/// fix. No retries.
pub async fn locate(
    source: &dyn LocationSource,
    cancel: &CancellationToken,
) -> Result<Coordinates, LocationError> {
    if source.permission() != Permission::Granted {
        return Err(LocationError::PermissionDenied);
    }

    if !source.is_enabled() {
        return Err(LocationError::ServiceDisabled);
    }

    match source.last_known().await {
        Ok(Some(coords)) => {
            tracing::debug!(%coords, "using last known location");
            return Ok(coords);
        }
        Ok(None) => tracing::debug!("no last known location, requesting a fresh fix"),
        Err(e) => tracing::warn!("last known location lookup failed: {e}"),
    }

    let fresh = source.current(cancel.child_token()).await?;
    let coords = fresh.ok_or(LocationError::Unavailable)?;

    tracing::debug!(%coords, "obtained fresh location");
    Ok(coords)
}
