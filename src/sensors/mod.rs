//! Sensor capability and the readings it produces

pub mod aqi;
pub mod purple_air;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use self::aqi::AqiCategory;

/// A single reading of one sensor
///
/// Failures never cross the sensor boundary as errors: a reading with
/// `error` set is rendered as unavailable while the other sensors of the
/// same report stay intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: u64,
    pub label: Option<String>,
    pub aqi: Option<u32>,
    pub category: Option<AqiCategory>,
    pub temperature_f: Option<f32>,
    pub error: Option<String>,
}

impl SensorReading {
    pub fn new(sensor_id: u64, label: Option<String>) -> Self {
        Self {
            sensor_id,
            label,
            aqi: None,
            category: None,
            temperature_f: None,
            error: None,
        }
    }

    pub fn with_aqi(mut self, aqi: u32) -> Self {
        self.aqi = Some(aqi);
        self.category = Some(AqiCategory::from_aqi(aqi));
        self
    }

    pub fn with_temperature(mut self, temperature_f: f32) -> Self {
        self.temperature_f = Some(temperature_f);
        self
    }

    pub fn unavailable(sensor_id: u64, label: Option<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(sensor_id, label)
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }

    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{label} (#{})", self.sensor_id),
            None => format!("#{}", self.sensor_id),
        }
    }
}

#[async_trait]
pub trait Sensor: Send + Sync {
    async fn get_data(&self) -> SensorReading;
}
