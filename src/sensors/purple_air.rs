//! PurpleAir sensor polling over the public JSON endpoint
//!
//! ```text
//! GET {base_url}?show={id}
//! → { "results": [ { "Stats": "{\"v\":..,\"v1\":..}", "temp_f": "79", .. } ] }
//! ```
//!
//! `Stats` is itself a JSON document encoded as a string. The ten-minute
//! PM2.5 average (`v1`) is converted to AQI. The reported temperature runs
//! hot because of the sensor's own electronics and is corrected by 8°F.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, instrument, trace, warn};

use super::{Sensor, SensorReading, aqi::calculate_aqi};

const TEMPERATURE_CORRECTION_F: f32 = 8.0;

#[derive(Debug, Deserialize)]
struct PurpleAirResponse {
    #[serde(default)]
    results: Vec<PurpleAirResult>,
}

#[derive(Debug, Deserialize)]
struct PurpleAirResult {
    #[serde(rename = "Stats")]
    stats: Option<String>,
    temp_f: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PurpleAirStats {
    /// Ten-minute PM2.5 average
    v1: f32,
}

#[derive(Debug, Clone)]
pub struct PurpleAirSensor {
    id: u64,
    label: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl PurpleAirSensor {
    pub fn new(
        id: u64,
        label: Option<String>,
        base_url: impl ToString,
        client: reqwest::Client,
    ) -> Self {
        Self {
            id,
            label,
            base_url: base_url.to_string(),
            client,
        }
    }

    fn url(&self) -> String {
        format!("{}?show={}", self.base_url, self.id)
    }

    async fn fetch(&self) -> Result<SensorReading> {
        let url = self.url();
        trace!("requesting sensor data from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to send HTTP request")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        let response: PurpleAirResponse =
            serde_json::from_str(&body).context("failed to parse sensor JSON")?;

        let Some(result) = response.results.into_iter().next() else {
            warn!("empty results for PurpleAir sensor {}", self.id);
            return Ok(SensorReading::unavailable(
                self.id,
                self.label.clone(),
                "No results",
            ));
        };

        let stats = result.stats.context("missing Stats field")?;
        let stats: PurpleAirStats =
            serde_json::from_str(&stats).context("failed to parse Stats field")?;

        let aqi = calculate_aqi(stats.v1)
            .with_context(|| format!("invalid PM2.5 value: {}", stats.v1))?;

        let mut reading = SensorReading::new(self.id, self.label.clone()).with_aqi(aqi);
        if let Some(temperature) = result.temp_f.as_ref().and_then(parse_number) {
            reading = reading.with_temperature(temperature - TEMPERATURE_CORRECTION_F);
        }

        Ok(reading)
    }
}

/// PurpleAir sends some numbers as strings.
fn parse_number(value: &Value) -> Option<f32> {
    match value {
        Value::Number(number) => number.as_f64().map(|n| n as f32),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Sensor for PurpleAirSensor {
    #[instrument(skip(self), fields(sensor = self.id))]
    async fn get_data(&self) -> SensorReading {
        match self.fetch().await {
            Ok(reading) => reading,
            Err(e) => {
                error!("error getting data for PurpleAir sensor {}: {:#}", self.id, e);
                SensorReading::unavailable(self.id, self.label.clone(), format!("{e:#}"))
            }
        }
    }
}
