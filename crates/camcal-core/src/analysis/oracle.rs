//! Analysis oracle interface
//!
//! The oracle turns measurements into corrections. Its reasoning is external;
//! this module only defines the seam and the fallback policy around it.

use async_trait::async_trait;
use log::{info, warn};

use super::fallback::fallback_result;
use super::payload::parse_oracle_payload;
use super::result::{CalibrationOutcome, CalibrationResult};
use super::settings::AnalysisSettings;
use crate::error::{Error, Result};
use crate::session::MeasurementPoint;

#[async_trait]
pub trait AnalysisOracle: Send + Sync {
    async fn analyze(
        &self,
        points: &[MeasurementPoint],
        settings: &AnalysisSettings,
    ) -> Result<CalibrationResult>;
}

/// Ask the oracle, substituting the offline fallback on any failure or on a
/// result that does not validate
pub async fn analyze_or_fallback(
    oracle: &dyn AnalysisOracle,
    points: &[MeasurementPoint],
    settings: &AnalysisSettings,
) -> CalibrationOutcome {
    let analyzed = oracle
        .analyze(points, settings)
        .await
        .and_then(|result| result.validate().map(|()| result));

    match analyzed {
        Ok(result) => {
            info!(
                "Analysis complete: {} (gamma {}, ΔE {:.2})",
                result.profile_name, result.gamma, result.delta_e
            );
            CalibrationOutcome {
                result,
                is_fallback: false,
            }
        }
        Err(err) => {
            warn!("Analysis failed, using offline fallback: {}", err);
            CalibrationOutcome {
                result: fallback_result(points, settings),
                is_fallback: true,
            }
        }
    }
}

/// Oracle that answers every request with the same recorded reply
#[derive(Debug, Clone)]
pub struct ReplayOracle {
    payload: String,
}

impl ReplayOracle {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

#[async_trait]
impl AnalysisOracle for ReplayOracle {
    async fn analyze(
        &self,
        _points: &[MeasurementPoint],
        _settings: &AnalysisSettings,
    ) -> Result<CalibrationResult> {
        parse_oracle_payload(&self.payload)
    }
}

/// Oracle for hosts without network access; always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

#[async_trait]
impl AnalysisOracle for OfflineOracle {
    async fn analyze(
        &self,
        _points: &[MeasurementPoint],
        _settings: &AnalysisSettings,
    ) -> Result<CalibrationResult> {
        Err(Error::Oracle("offline".to_string()))
    }
}
