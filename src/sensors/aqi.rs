//! PM2.5 concentration to US EPA Air Quality Index

use serde::{Deserialize, Serialize};

/// (concentration low, concentration high, index low, index high)
const PM25_BREAKPOINTS: [(f32, f32, u32, u32); 7] = [
    (0.0, 12.0, 0, 50),
    (12.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 150.4, 151, 200),
    (150.5, 250.4, 201, 300),
    (250.5, 350.4, 301, 400),
    (350.5, 500.4, 401, 500),
];

const MAX_AQI: u32 = 500;

/// Convert a PM2.5 concentration (µg/m³) to an AQI value.
///
/// Returns `None` for negative or non-finite input. Concentrations above the
/// last breakpoint are capped at 500.
pub fn calculate_aqi(pm25: f32) -> Option<u32> {
    if !pm25.is_finite() || pm25 < 0.0 {
        return None;
    }

    // EPA truncates to one decimal before looking up the breakpoint
    let concentration = (pm25 * 10.0).floor() / 10.0;

    for (c_lo, c_hi, i_lo, i_hi) in PM25_BREAKPOINTS {
        if concentration <= c_hi {
            let c = concentration.max(c_lo);
            let aqi = (i_hi - i_lo) as f32 / (c_hi - c_lo) * (c - c_lo) + i_lo as f32;
            return Some(aqi.round() as u32);
        }
    }

    Some(MAX_AQI)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u32) -> AqiCategory {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AqiCategory::Good => "🟢",
            AqiCategory::Moderate => "🟡",
            AqiCategory::UnhealthyForSensitiveGroups => "🟠",
            AqiCategory::Unhealthy => "🔴",
            AqiCategory::VeryUnhealthy => "🟣",
            AqiCategory::Hazardous => "🟤",
        }
    }
}
