//! Error kinds for each pipeline stage.
//!
//! Every error carries a `user_message()` suitable for a one-line notice in
//! the terminal; the `Display` output keeps the technical detail for logs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location services are disabled")]
    ServiceDisabled,

    #[error("unable to get location")]
    Unavailable,

    #[error("location request was cancelled")]
    Cancelled,

    #[error("location lookup failed: {0}")]
    Lookup(String),

    #[error("invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Location permission is required for Weather!",
            LocationError::ServiceDisabled => "Location is turned off.",
            LocationError::Unavailable | LocationError::Cancelled => {
                "Unable to get your location. Please try again."
            }
            LocationError::Lookup(_) => "Location error. Please try again.",
            LocationError::InvalidCoordinates { .. } => "The configured coordinates are invalid.",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build weather request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request to weather service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather service returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Url(_) => "The weather service address is misconfigured.",
            FetchError::Transport(_) => {
                "Unable to reach the weather service. Check your connection."
            }
            FetchError::Status { status: 401, .. } => "The weather service rejected the API key.",
            FetchError::Status { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Please try again later."
            }
            FetchError::Status { .. } => "The weather request failed.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed weather document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("weather document has no `{0}` entry")]
    MissingField(&'static str),
}

impl ParseError {
    pub fn user_message(&self) -> &'static str {
        "Received unexpected weather data."
    }
}

/// Failure of one activation, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The activation task died before producing a result.
    #[error("activation task failed: {0}")]
    Aborted(String),
}

impl PipelineError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Location(e) => e.user_message(),
            PipelineError::Fetch(e) => e.user_message(),
            PipelineError::Parse(e) => e.user_message(),
            PipelineError::Aborted(_) => "Something went wrong. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> FetchError {
        FetchError::Status {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn permission_denied_message_matches_notice() {
        let err = PipelineError::from(LocationError::PermissionDenied);
        assert_eq!(
            err.user_message(),
            "Location permission is required for Weather!"
        );
    }

    #[test]
    fn status_messages_distinguish_auth_and_server_errors() {
        assert!(status(401).user_message().contains("API key"));
        assert!(status(503).user_message().contains("later"));
        assert_eq!(status(404).user_message(), "The weather request failed.");
    }

    #[test]
    fn pipeline_error_display_is_transparent() {
        let err = PipelineError::from(ParseError::MissingField("weather[0]"));
        assert_eq!(err.to_string(), "weather document has no `weather[0]` entry");
    }

    #[test]
    fn aborted_activation_has_generic_message() {
        let err = PipelineError::Aborted("task panicked".into());
        assert_eq!(err.to_string(), "activation task failed: task panicked");
        assert!(err.user_message().contains("try again"));
    }
}
