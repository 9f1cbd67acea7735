use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use aqi_duck::{
    actors::controller::ControllerHandle,
    aggregator::PurpleAirFactory,
    api::{EventsState, spawn_events_server},
    bootstrap::subscribe_all,
    config::{Config, parse_config, read_config_file},
    slack::{SlackClient, SlackDiscovery},
};
use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file; environment variables alone are enough without one
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("aqi_duck", LevelFilter::TRACE),
        ("tower_http", LevelFilter::DEBUG),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.file {
        Some(path) => read_config_file(path)
            .with_context(|| format!("failed to load config from {path}")),
        None => parse_config("{}").map(Config::with_env_overrides),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = load_config(&args)?;

    let token = config
        .slack
        .token
        .clone()
        .context("no Slack token configured (set SLACK_TOKEN)")?;

    if config.slack.silent {
        warn!("silent mode: messages are logged, not posted");
    }

    let client = Arc::new(SlackClient::new(
        token,
        &config.slack.api_url,
        config.slack.silent,
    )?);
    let discovery = SlackDiscovery::new(client);
    let factory = PurpleAirFactory::new(&config.sensor_url)?;

    let controllers = subscribe_all(&discovery, &factory, config.interval()).await;
    info!("subscribed to {} channels", controllers.len());
    if controllers.is_empty() {
        warn!("no configured channels; mentions will be ignored");
    }

    let mut handles = HashMap::new();
    for mut controller in controllers {
        if config.autostart && !controller.monitor_and_notify() {
            warn!(
                "could not start monitoring in {}",
                controller.channel().channel_name()
            );
        }
        let handle = ControllerHandle::spawn(controller);
        handles.insert(handle.channel_id().to_string(), handle);
    }

    let state = EventsState::new(
        handles.values().cloned(),
        config.slack.verification_token.clone(),
    );
    let addr = spawn_events_server(config.server.bind_addr(), state).await?;
    info!("listening for Slack events on {addr}");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    for (channel_id, handle) in handles {
        if let Err(e) = handle.shutdown().await {
            error!("failed to stop controller for {channel_id}: {e}");
        }
    }

    Ok(())
}
