//! Reporting channel capability

use async_trait::async_trait;
use tracing::{error, warn};

use crate::error::{AqiError, AqiResult};

/// A destination for finished reports (a Slack channel in production)
#[async_trait]
pub trait ReportingChannel: Send + Sync {
    /// Deliver `text` to the channel.
    ///
    /// Implementations refuse payloads that fail [`validate_payload`].
    async fn post_message(&self, text: &str) -> AqiResult<()>;

    fn channel_name(&self) -> &str;

    /// Platform id used to route incoming mentions
    fn channel_id(&self) -> &str {
        self.channel_name()
    }

    /// Monitoring configuration embedded in the channel metadata
    async fn config(&self) -> AqiResult<String>;
}

/// Check that `text` is deliverable: non-blank and free of control
/// characters other than newlines and tabs.
pub fn validate_payload(text: &str) -> AqiResult<&str> {
    if text.trim().is_empty() {
        return Err(AqiError::InvalidMessagePayload(
            "message is empty".to_string(),
        ));
    }

    if let Some(c) = text
        .chars()
        .find(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(AqiError::InvalidMessagePayload(format!(
            "message contains control character {:?}",
            c
        )));
    }

    Ok(text)
}

/// Post `text` and log instead of propagating a failure.
pub async fn deliver(channel: &dyn ReportingChannel, text: &str) {
    match channel.post_message(text).await {
        Ok(()) => {}
        Err(e @ AqiError::InvalidMessagePayload(_)) => {
            warn!("not posting to {}: {}", channel.channel_name(), e);
        }
        Err(e) => {
            error!("error posting in {}: {}", channel.channel_name(), e);
        }
    }
}
