//! Error types shared by the aggregator, channel and bootstrap layers

use std::fmt;

/// Result type alias for fallible AQI operations
pub type AqiResult<T> = Result<T, AqiError>;

/// Errors that can occur while producing or delivering a report
///
/// None of these are fatal to the process. Each one is contained to the
/// aggregator/channel pair that produced it and surfaces as a log line.
#[derive(Debug)]
pub enum AqiError {
    /// The aggregator could not render a report
    ReportGenerationFailed(String),

    /// The chat platform rejected or never received a message
    DeliveryFailed(String),

    /// A channel carries no usable monitoring configuration
    MalformedConfiguration(String),

    /// The message is not deliverable text
    InvalidMessagePayload(String),

    /// The Slack Web API answered with `ok: false`
    SlackApi { method: String, error: String },

    /// Transport error from the HTTP client
    Http(reqwest::Error),
}

impl fmt::Display for AqiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiError::ReportGenerationFailed(msg) => {
                write!(f, "failed to generate report: {}", msg)
            }
            AqiError::DeliveryFailed(msg) => write!(f, "failed to deliver message: {}", msg),
            AqiError::MalformedConfiguration(msg) => {
                write!(f, "malformed channel configuration: {}", msg)
            }
            AqiError::InvalidMessagePayload(msg) => write!(f, "invalid message payload: {}", msg),
            AqiError::SlackApi { method, error } => {
                write!(f, "Slack API call {} failed: {}", method, error)
            }
            AqiError::Http(err) => write!(f, "HTTP error: {}", err),
        }
    }
}

impl std::error::Error for AqiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AqiError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AqiError {
    fn from(err: reqwest::Error) -> Self {
        AqiError::Http(err)
    }
}
