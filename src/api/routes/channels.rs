//! Subscribed channel listing

use axum::Json;
use axum::extract::State;
use futures::future::join_all;

use crate::api::error::ApiResult;
use crate::api::state::EventsState;
use crate::api::types::{ChannelStatus, ChannelsResponse};

/// GET /channels
///
/// Lists every subscribed channel with the state of its controller,
/// sorted by channel name.
pub async fn list_channels(State(state): State<EventsState>) -> ApiResult<Json<ChannelsResponse>> {
    let statuses = join_all(state.controllers().map(|handle| async move {
        let monitor_state = handle.state().await?;
        Ok::<_, anyhow::Error>(ChannelStatus {
            id: handle.channel_id().to_string(),
            name: handle.channel_name().to_string(),
            state: monitor_state,
        })
    }))
    .await;

    let mut channels = statuses.into_iter().collect::<Result<Vec<_>, _>>()?;
    channels.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(ChannelsResponse { channels }))
}
