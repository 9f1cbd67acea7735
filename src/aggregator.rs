//! Aggregation of several sensors into one text report
//!
//! An aggregator is built from the configuration string an operator puts in
//! the channel topic:
//!
//! ```text
//! Backyard=1234, 5678, Office=91011
//! ```
//!
//! Each entry is a PurpleAir sensor id, optionally prefixed with a label.
//! Sensors are polled concurrently and rendered in configuration order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, instrument};

use crate::error::{AqiError, AqiResult};
use crate::sensors::{Sensor, SensorReading, purple_air::PurpleAirSensor};

/// Something that can produce a report on demand and once per tick
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Current composite report
    async fn report(&self) -> AqiResult<String>;

    /// Output of a single monitoring tick, `None` if there is nothing to send
    async fn tick(&self) -> AqiResult<Option<String>> {
        self.report().await.map(Some)
    }
}

impl std::fmt::Debug for dyn Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Aggregator")
    }
}

/// Builds aggregators from channel configuration strings
pub trait AggregatorFactory: Send + Sync {
    fn from_config(&self, config: &str) -> AqiResult<Arc<dyn Aggregator>>;
}

/// One entry of a channel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSpec {
    pub id: u64,
    pub label: Option<String>,
}

/// Parsed channel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    raw: String,
    pub sensors: Vec<SensorSpec>,
}

impl AggregatorConfig {
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl FromStr for AggregatorConfig {
    type Err = AqiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(AqiError::MalformedConfiguration(
                "configuration is empty".to_string(),
            ));
        }

        let sensors = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_sensor_spec)
            .collect::<AqiResult<Vec<_>>>()?;

        if sensors.is_empty() {
            return Err(AqiError::MalformedConfiguration(format!(
                "no sensors in '{raw}'"
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            sensors,
        })
    }
}

fn parse_sensor_spec(entry: &str) -> AqiResult<SensorSpec> {
    let (label, id) = match entry.split_once('=') {
        Some((label, id)) => (Some(label.trim()), id.trim()),
        None => (None, entry),
    };

    let id = id
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AqiError::MalformedConfiguration(format!("invalid sensor id '{id}'")))?;

    Ok(SensorSpec {
        id,
        label: label.filter(|l| !l.is_empty()).map(str::to_string),
    })
}

impl fmt::Display for AggregatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Aggregator over an ordered set of sensors
pub struct SensorAggregator {
    config: AggregatorConfig,
    sensors: Vec<Box<dyn Sensor>>,
}

impl SensorAggregator {
    pub fn new(config: AggregatorConfig, sensors: Vec<Box<dyn Sensor>>) -> Self {
        Self { config, sensors }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub async fn readings(&self) -> Vec<SensorReading> {
        join_all(self.sensors.iter().map(|sensor| sensor.get_data())).await
    }
}

#[async_trait]
impl Aggregator for SensorAggregator {
    #[instrument(skip(self), fields(config = %self.config))]
    async fn report(&self) -> AqiResult<String> {
        let readings = self.readings().await;
        debug!(
            "{} of {} sensors available",
            readings.iter().filter(|r| r.is_available()).count(),
            readings.len()
        );
        render_report(&readings)
    }
}

/// Render readings into the text posted to a channel.
pub fn render_report(readings: &[SensorReading]) -> AqiResult<String> {
    if readings.is_empty() {
        return Err(AqiError::ReportGenerationFailed(
            "no sensors configured".to_string(),
        ));
    }

    let mut lines = vec![String::from("Air quality report:")];
    lines.extend(readings.iter().map(render_reading));
    Ok(lines.join("\n"))
}

fn render_reading(reading: &SensorReading) -> String {
    let name = reading.display_name();

    if let Some(error) = &reading.error {
        return format!("⚪ {name}: unavailable ({error})");
    }

    match (reading.aqi, reading.category) {
        (Some(aqi), Some(category)) => {
            let mut line = format!(
                "{} {name}: AQI {aqi} ({})",
                category.emoji(),
                category.label()
            );
            if let Some(temperature) = reading.temperature_f {
                line.push_str(&format!(", {temperature:.1}°F"));
            }
            line
        }
        _ => format!("⚪ {name}: no AQI data"),
    }
}

/// Factory for PurpleAir backed aggregators
#[derive(Debug, Clone)]
pub struct PurpleAirFactory {
    base_url: String,
    client: reqwest::Client,
}

impl PurpleAirFactory {
    pub fn new(base_url: impl ToString) -> AqiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }
}

impl AggregatorFactory for PurpleAirFactory {
    fn from_config(&self, config: &str) -> AqiResult<Arc<dyn Aggregator>> {
        let config: AggregatorConfig = config.parse()?;

        let sensors = config
            .sensors
            .iter()
            .map(|spec| {
                Box::new(PurpleAirSensor::new(
                    spec.id,
                    spec.label.clone(),
                    &self.base_url,
                    self.client.clone(),
                )) as Box<dyn Sensor>
            })
            .collect();

        Ok(Arc::new(SensorAggregator::new(config, sensors)))
    }
}
