//! Oracle payload parsing
//!
//! Oracles are language models more often than not, and tend to wrap the JSON
//! object in markdown fences or a sentence of prose. Only the outermost
//! `{ ... }` span is parsed.

use serde::{Deserialize, Serialize};

use super::result::CalibrationResult;
use super::settings::AnalysisSettings;
use crate::error::{Error, Result};
use crate::session::MeasurementPoint;

/// Parse a calibration result out of an oracle reply
pub fn parse_oracle_payload(payload: &str) -> Result<CalibrationResult> {
    let json = extract_json_object(payload)
        .ok_or_else(|| Error::Oracle("reply contains no JSON object".to_string()))?;
    serde_json::from_str(json).map_err(|e| Error::Oracle(format!("unparseable reply: {e}")))
}

fn extract_json_object(payload: &str) -> Option<&str> {
    let start = payload.find('{')?;
    let end = payload.rfind('}')?;
    (end > start).then(|| &payload[start..=end])
}

/// What an oracle is asked: the measurements and the desired targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub measurements: Vec<MeasurementPoint>,
    #[serde(flatten)]
    pub settings: AnalysisSettings,
}

impl AnalysisRequest {
    pub fn new(points: &[MeasurementPoint], settings: &AnalysisSettings) -> Self {
        Self {
            measurements: points.to_vec(),
            settings: *settings,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
