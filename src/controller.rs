//! Monitoring controller - one per channel
//!
//! ## Lifecycle
//!
//! ```text
//!                setup_aggregator                 monitor_and_notify
//! Uninitialized ─────────────────▶ Idle ◀──────────────────────────▶ Running
//!                                        stop monitoring / resume
//! ```
//!
//! The state is derived from what the controller holds: no aggregator means
//! `Uninitialized`, an aggregator without a timer means `Idle`, and a timer
//! means `Running`. A timer is only ever created while idle, so there is at
//! most one per controller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::actors::monitor::MonitorHandle;
use crate::aggregator::{Aggregator, AggregatorFactory};
use crate::command::{Command, ReservedCommand};
use crate::error::AqiResult;
use crate::reporter::{ReportingChannel, deliver};

pub const NOT_SET_UP: &str = "I'm not set up to give you a report!";
pub const GREETING: &str = "Hello there! Mention me with \"report\" for the current air quality, or with \"stop monitoring\" / \"resume monitoring\" to control periodic reports.";
pub const ALREADY_RUNNING: &str = "Monitoring is already running";
pub const NOTHING_TO_MONITOR: &str = "Nothing to monitor";
pub const RESUMED: &str = "Monitoring resumed";
pub const STOPPED: &str = "Monitoring stopped.";
pub const NOTHING_TO_STOP: &str = "Nothing to stop.";
pub const UNKNOWN: &str = "I'm not sure how to help with that. Try \"report\", \"stop monitoring\" or \"resume monitoring\".";
pub const DYNAMIC_NOT_SUPPORTED: &str = "Dynamic AQI monitoring isn't supported yet.";
pub const STATIC_NOT_SUPPORTED: &str = "Monitoring AQI against fixed bounds isn't supported yet.";

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// No aggregator yet
    Uninitialized,
    /// Aggregator present, no timer
    Idle,
    /// Aggregator present, timer active
    Running,
}

pub struct Controller {
    channel: Arc<dyn ReportingChannel>,
    aggregator: Option<Arc<dyn Aggregator>>,
    monitor: Option<MonitorHandle>,
    interval: Duration,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("channel_id", &self.channel.channel_id())
            .field("has_aggregator", &self.aggregator.is_some())
            .field("monitor", &self.monitor)
            .field("interval", &self.interval)
            .finish()
    }
}

impl Controller {
    pub fn new(channel: Arc<dyn ReportingChannel>) -> Self {
        Self {
            channel,
            aggregator: None,
            monitor: None,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Period of the monitoring timer; applies to the next start.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn channel(&self) -> &Arc<dyn ReportingChannel> {
        &self.channel
    }

    pub fn state(&self) -> MonitorState {
        match (&self.aggregator, &self.monitor) {
            (None, _) => MonitorState::Uninitialized,
            (Some(_), None) => MonitorState::Idle,
            (Some(_), Some(_)) => MonitorState::Running,
        }
    }

    /// Install the aggregator this controller reports from.
    ///
    /// Replacing an existing aggregator cancels a running timer first, so
    /// no tick keeps polling the old one; the controller ends up idle.
    pub async fn setup_aggregator(&mut self, aggregator: Arc<dyn Aggregator>) {
        if self.aggregator.is_some() {
            warn!(
                "replacing aggregator for {}",
                self.channel.channel_name()
            );
            if let Some(monitor) = self.monitor.take() {
                monitor.cancel().await;
            }
        }
        self.aggregator = Some(aggregator);
    }

    /// Build an aggregator from the channel's own configuration.
    #[instrument(skip_all, fields(channel = %self.channel.channel_name()))]
    pub async fn configure(&mut self, factory: &dyn AggregatorFactory) -> AqiResult<()> {
        let config = self.channel.config().await?;
        debug!("configuring aggregator from '{config}'");
        let aggregator = factory.from_config(&config)?;
        self.setup_aggregator(aggregator).await;
        Ok(())
    }

    /// Post the current report, or explain why there is none.
    pub async fn report(&self) {
        let Some(aggregator) = &self.aggregator else {
            self.say(NOT_SET_UP).await;
            return;
        };

        match aggregator.report().await {
            Ok(report) => self.say(&report).await,
            Err(e) => error!(
                "error getting aggregator report for {}: {}",
                self.channel.channel_name(),
                e
            ),
        }
    }

    /// Start the recurring timer. Returns whether a timer was started.
    pub fn monitor_and_notify(&mut self) -> bool {
        let aggregator = match (&self.aggregator, &self.monitor) {
            (None, _) => {
                warn!("{}: nothing to monitor", self.channel.channel_name());
                return false;
            }
            (Some(_), Some(_)) => {
                debug!("{}: monitoring already running", self.channel.channel_name());
                return false;
            }
            (Some(aggregator), None) => aggregator.clone(),
        };

        let channel = self.channel.clone();
        let monitor = MonitorHandle::spawn(aggregator, self.interval, move |report| {
            let channel = channel.clone();
            async move { deliver(channel.as_ref(), &report).await }
        });

        info!(
            "{}: monitoring every {:?}",
            self.channel.channel_name(),
            monitor.period()
        );
        self.monitor = Some(monitor);
        true
    }

    /// Cancel the recurring timer. Returns whether one was running.
    pub async fn stop_monitoring(&mut self) -> bool {
        match self.monitor.take() {
            Some(monitor) => {
                monitor.cancel().await;
                info!("{}: monitoring stopped", self.channel.channel_name());
                true
            }
            None => false,
        }
    }

    /// Handle the text of a mention addressed to this controller.
    pub async fn handle_app_mention(&mut self, text: &str) {
        let command = Command::parse(text);
        debug!(
            "{}: '{}' -> {:?}",
            self.channel.channel_name(),
            text,
            command
        );
        self.handle_command(command).await;
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Greeting => self.say(GREETING).await,
            Command::Report => self.report().await,
            Command::StopMonitoring => {
                if self.stop_monitoring().await {
                    self.say(STOPPED).await;
                } else {
                    self.say(NOTHING_TO_STOP).await;
                }
            }
            Command::ResumeMonitoring => match self.state() {
                MonitorState::Uninitialized => self.say(NOTHING_TO_MONITOR).await,
                MonitorState::Running => self.say(ALREADY_RUNNING).await,
                MonitorState::Idle => {
                    self.say(RESUMED).await;
                    self.report().await;
                    self.monitor_and_notify();
                }
            },
            Command::NotImplemented(ReservedCommand::DynamicAqiMonitoring) => {
                self.say(DYNAMIC_NOT_SUPPORTED).await
            }
            Command::NotImplemented(ReservedCommand::StaticAqiMonitoring) => {
                self.say(STATIC_NOT_SUPPORTED).await
            }
            Command::Unknown => self.say(UNKNOWN).await,
        }
    }

    async fn say(&self, text: &str) {
        deliver(self.channel.as_ref(), text).await;
    }
}
