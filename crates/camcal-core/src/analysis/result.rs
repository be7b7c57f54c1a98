//! Calibration results returned by the analysis oracle

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Channel gains must lie in `[0, MAX_GAIN]`
pub const MAX_GAIN: f64 = 2.0;

/// Smallest gamma whose u8.8 encoding is not zero
pub const MIN_GAMMA: f64 = 1.0 / 512.0;

/// Largest gamma a u8.8 curve entry can hold
pub const MAX_GAMMA: f64 = 65535.0 / 256.0;

/// Whether `gamma` survives encoding as a non-degenerate `curv` exponent
pub fn is_encodable_gamma(gamma: f64) -> bool {
    (MIN_GAMMA..=MAX_GAMMA).contains(&gamma)
}

/// Corrections for one display, in the oracle's camelCase JSON shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    pub profile_name: String,
    pub gamma: f64,
    #[serde(default)]
    pub color_temperature: String,
    #[serde(rename = "deltaE")]
    pub delta_e: f64,
    pub red_gain: f64,
    pub green_gain: f64,
    pub blue_gain: f64,
    #[serde(default = "unknown")]
    pub contrast_ratio: String,
    #[serde(default)]
    pub feedback: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl CalibrationResult {
    /// Identity corrections at the given gamma
    pub fn neutral(profile_name: impl Into<String>, gamma: f64) -> Self {
        Self {
            profile_name: profile_name.into(),
            gamma,
            color_temperature: String::new(),
            delta_e: 0.0,
            red_gain: 1.0,
            green_gain: 1.0,
            blue_gain: 1.0,
            contrast_ratio: unknown(),
            feedback: String::new(),
        }
    }

    pub fn gains(&self) -> [f64; 3] {
        [self.red_gain, self.green_gain, self.blue_gain]
    }

    /// Check every numeric field against the range the encoder can represent
    pub fn validate(&self) -> Result<()> {
        if !is_encodable_gamma(self.gamma) {
            return Err(Error::InvalidResult(format!(
                "gamma {} outside [{MIN_GAMMA}, {MAX_GAMMA}]",
                self.gamma
            )));
        }
        if !self.delta_e.is_finite() || self.delta_e < 0.0 {
            return Err(Error::InvalidResult(format!(
                "deltaE {} is negative or not finite",
                self.delta_e
            )));
        }
        for (name, gain) in ["red", "green", "blue"].into_iter().zip(self.gains()) {
            if !gain.is_finite() || !(0.0..=MAX_GAIN).contains(&gain) {
                return Err(Error::InvalidResult(format!(
                    "{name} gain {gain} outside [0, {MAX_GAIN}]"
                )));
            }
        }
        Ok(())
    }
}

/// A result plus whether it came from the offline fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationOutcome {
    pub result: CalibrationResult,
    pub is_fallback: bool,
}
