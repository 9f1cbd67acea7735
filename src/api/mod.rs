//! HTTP endpoint that receives Slack events
//!
//! ## Endpoints
//!
//! - `POST /slack/events` - Events API requests (url verification, app mentions)
//! - `GET /channels` - Subscribed channels and their monitoring state
//! - `GET /health` - Health check

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::EventsState;
pub use types::{ChallengeResponse, HealthResponse, SlackEnvelope, SlackEvent};

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the router without binding it
pub fn router(state: EventsState) -> Router {
    Router::new()
        .route("/slack/events", post(routes::events::slack_events))
        .route("/channels", get(routes::channels::list_channels))
        .route("/health", get(routes::health::health_check))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Spawn the events server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_events_server(
    bind_addr: SocketAddr,
    state: EventsState,
) -> anyhow::Result<SocketAddr> {
    info!("starting events server on {}", bind_addr);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("events server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("events server error: {}", e);
        }
    });

    Ok(addr)
}
