//! Core library for the `localweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The location → fetch → render pipeline and its typed errors
//! - Shared domain models (coordinates, weather snapshots)
//!
//! It is used by `localweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod render;
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::{Config, LocationConfig, OpenWeatherConfig, PermissionSetting};
pub use error::{FetchError, LocationError, ParseError, PipelineError};
pub use location::{FusedLocation, LocationSource, Permission};
pub use model::{Coordinates, WeatherRequest, WeatherSnapshot};
pub use provider::{OpenWeatherClient, WeatherSource};
pub use render::Screen;
pub use session::{Delivery, Pipeline, Session};
