//! Fleet bootstrap: one controller per configured channel

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregator::AggregatorFactory;
use crate::controller::Controller;
use crate::error::AqiResult;
use crate::reporter::ReportingChannel;

/// Source of the channels the bot could report to
#[async_trait]
pub trait ChannelDiscovery: Send + Sync {
    async fn discover(&self) -> AqiResult<Vec<Arc<dyn ReportingChannel>>>;
}

/// Configure a controller for `channel` and post its first report.
pub async fn subscribe(
    channel: Arc<dyn ReportingChannel>,
    factory: &dyn AggregatorFactory,
    interval: Duration,
) -> AqiResult<Controller> {
    let mut controller = Controller::new(channel).with_interval(interval);
    controller.configure(factory).await?;
    controller.report().await;
    Ok(controller)
}

/// Subscribe to every discovered channel that carries a configuration.
///
/// Channels are set up independently; one that fails is logged and left
/// out, the others still get their controller and first report. A failed
/// discovery is logged and yields no controllers.
#[instrument(skip_all)]
pub async fn subscribe_all(
    discovery: &dyn ChannelDiscovery,
    factory: &dyn AggregatorFactory,
    interval: Duration,
) -> Vec<Controller> {
    let channels = match discovery.discover().await {
        Ok(channels) => channels,
        Err(e) => {
            error!("channel discovery failed: {e}");
            return Vec::new();
        }
    };
    debug!("discovered {} channels", channels.len());

    let results = join_all(channels.into_iter().map(|channel| async move {
        let name = channel.channel_name().to_string();
        (name, subscribe(channel, factory, interval).await)
    }))
    .await;

    results
        .into_iter()
        .filter_map(|(name, result)| match result {
            Ok(controller) => {
                info!("subscribed to {name}");
                Some(controller)
            }
            Err(e) => {
                warn!("skipping channel {name}: {e}");
                None
            }
        })
        .collect()
}
