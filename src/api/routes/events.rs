//! Slack Events API endpoint

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::EventsState;
use crate::api::types::{ChallengeResponse, SlackEnvelope, SlackEvent};

/// Header Slack sets when it redelivers an event it considers unacknowledged
pub const RETRY_HEADER: &str = "x-slack-retry-num";

/// POST /slack/events
///
/// Answers the `url_verification` handshake and routes `app_mention`
/// events to the controller of the channel they were posted in. The
/// mention is only queued here, without waiting for room in the queue, so
/// Slack gets its acknowledgement before the command runs.
pub async fn slack_events(
    State(state): State<EventsState>,
    headers: HeaderMap,
    Json(envelope): Json<SlackEnvelope>,
) -> ApiResult<Response> {
    if !state.is_authorized(envelope.token()) {
        warn!("rejecting event with invalid verification token");
        return Err(ApiError::Unauthorized(
            "invalid verification token".to_string(),
        ));
    }

    match envelope {
        SlackEnvelope::UrlVerification { challenge, .. } => {
            debug!("answering url verification");
            Ok(Json(ChallengeResponse { challenge }).into_response())
        }
        SlackEnvelope::EventCallback {
            event: SlackEvent::AppMention { text, channel, user },
            ..
        } => {
            if let Some(retry) = headers.get(RETRY_HEADER) {
                debug!("ignoring redelivered mention (retry {:?})", retry);
                return Ok(StatusCode::OK.into_response());
            }

            match state.controller(&channel) {
                Some(handle) => {
                    debug!(
                        "mention in {} from {}",
                        handle.channel_name(),
                        user.as_deref().unwrap_or("unknown user")
                    );
                    if let Err(e) = handle.mention(text) {
                        warn!("dropping mention: {e}");
                    }
                }
                None => warn!("mention in unsubscribed channel {}", channel),
            }

            Ok(StatusCode::OK.into_response())
        }
        SlackEnvelope::EventCallback { .. } | SlackEnvelope::Unsupported => {
            debug!("ignoring unsupported event");
            Ok(StatusCode::OK.into_response())
        }
    }
}
