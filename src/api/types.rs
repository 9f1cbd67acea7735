//! Wire types for the Slack Events API and the status endpoints

use serde::{Deserialize, Serialize};

use crate::controller::MonitorState;

// ============================================================================
// Incoming - Slack Events API envelopes
// ============================================================================

/// Outer envelope of every request Slack sends to the events endpoint
///
/// Only the envelope kinds the bot acts on are modelled; anything else
/// deserializes to [`SlackEnvelope::Unsupported`] and is acknowledged.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    /// Handshake sent when the request URL is configured
    UrlVerification {
        #[serde(default)]
        token: Option<String>,
        challenge: String,
    },

    /// Wrapper around a subscribed event
    EventCallback {
        #[serde(default)]
        token: Option<String>,
        event: SlackEvent,
    },

    #[serde(other)]
    Unsupported,
}

impl SlackEnvelope {
    /// Verification token carried by the envelope, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            SlackEnvelope::UrlVerification { token, .. }
            | SlackEnvelope::EventCallback { token, .. } => token.as_deref(),
            SlackEnvelope::Unsupported => None,
        }
    }
}

/// Inner event of an `event_callback` envelope
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    /// The bot was @-mentioned in a channel
    AppMention {
        text: String,
        channel: String,
        #[serde(default)]
        user: Option<String>,
    },

    #[serde(other)]
    Unsupported,
}

// ============================================================================
// Outgoing - responses
// ============================================================================

/// Reply to a `url_verification` handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeResponse {
    pub challenge: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// Number of channels with a live controller
    pub channels: usize,
}

/// One subscribed channel and where its controller stands
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatus {
    pub id: String,
    pub name: String,
    pub state: MonitorState,
}

/// List of subscribed channels
#[derive(Debug, Clone, Serialize)]
pub struct ChannelsResponse {
    pub channels: Vec<ChannelStatus>,
}
