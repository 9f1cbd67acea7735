//! Helper types for integration tests

#![allow(dead_code)]

use aqi_duck::{
    aggregator::{Aggregator, AggregatorFactory},
    bootstrap::ChannelDiscovery,
    controller::Controller,
    error::{AqiError, AqiResult},
    reporter::ReportingChannel,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Channel that records everything posted to it
pub struct RecordingChannel {
    id: String,
    name: String,
    config: Option<String>,
    messages: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn new(id: &str, name: &str, config: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            name: name.to_string(),
            config: config.map(str::to_string),
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

#[async_trait]
impl ReportingChannel for RecordingChannel {
    async fn post_message(&self, text: &str) -> AqiResult<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }

    fn channel_id(&self) -> &str {
        &self.id
    }

    async fn config(&self) -> AqiResult<String> {
        self.config
            .clone()
            .ok_or_else(|| AqiError::MalformedConfiguration(format!("no config in {}", self.name)))
    }
}

/// Aggregator whose report names the configuration it was built from
pub struct MockAggregator {
    config: String,
    reports: AtomicUsize,
}

impl MockAggregator {
    pub fn new(config: &str) -> Arc<Self> {
        Arc::new(Self {
            config: config.to_string(),
            reports: AtomicUsize::new(0),
        })
    }

    pub fn reports(&self) -> usize {
        self.reports.load(Ordering::SeqCst)
    }
}

pub fn report_for(config: &str) -> String {
    format!("I am a report for {config}")
}

#[async_trait]
impl Aggregator for MockAggregator {
    async fn report(&self) -> AqiResult<String> {
        self.reports.fetch_add(1, Ordering::SeqCst);
        Ok(report_for(&self.config))
    }
}

/// Factory building [`MockAggregator`]s; rejects the config "malformed"
#[derive(Default)]
pub struct MockFactory;

impl AggregatorFactory for MockFactory {
    fn from_config(&self, config: &str) -> AqiResult<Arc<dyn Aggregator>> {
        if config == "malformed" {
            return Err(AqiError::MalformedConfiguration(config.to_string()));
        }
        Ok(MockAggregator::new(config))
    }
}

/// Discovery returning a fixed set of channels
pub struct MockDiscovery {
    pub channels: Vec<Arc<RecordingChannel>>,
}

#[async_trait]
impl ChannelDiscovery for MockDiscovery {
    async fn discover(&self) -> AqiResult<Vec<Arc<dyn ReportingChannel>>> {
        Ok(self
            .channels
            .iter()
            .map(|channel| channel.clone() as Arc<dyn ReportingChannel>)
            .collect())
    }
}

pub const TEST_INTERVAL: Duration = Duration::from_secs(10);

/// Controller over a fresh recording channel, already set up with a
/// [`MockAggregator`] for `config`
pub async fn configured_controller(
    config: &str,
) -> (Controller, Arc<RecordingChannel>, Arc<MockAggregator>) {
    let channel = RecordingChannel::new("C_TEST", "test", Some(config));
    let aggregator = MockAggregator::new(config);

    let mut controller = Controller::new(channel.clone()).with_interval(TEST_INTERVAL);
    controller.setup_aggregator(aggregator.clone()).await;

    (controller, channel, aggregator)
}
