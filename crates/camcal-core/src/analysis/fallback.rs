//! Offline fallback result
//!
//! Used whenever the oracle cannot produce a usable answer. Gains stay
//! neutral; only the requested targets and a CIE76 summary of the
//! measurements are carried over.

use log::warn;

use super::result::{CalibrationResult, is_encodable_gamma};
use super::settings::{AnalysisSettings, DEFAULT_TARGET_GAMMA};
use crate::session::MeasurementPoint;

pub const FALLBACK_PROFILE_NAME: &str = "Fallback Profile (Offline)";

const FALLBACK_FEEDBACK: &str = "The analysis service could not be reached, so an offline \
profile was generated. It applies your gamma and white point targets but no color \
corrections. Run the calibration again when online for a measured profile.";

/// Mean CIE76 ΔE over measured points, 0 when nothing was measured
pub fn mean_delta_e(points: &[MeasurementPoint]) -> f64 {
    let (sum, n) = points
        .iter()
        .filter_map(MeasurementPoint::delta_e)
        .fold((0.0, 0usize), |(sum, n), de| (sum + de, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Neutral result carrying the requested targets. Always passes
/// [`CalibrationResult::validate`]: a target gamma that cannot be encoded is
/// replaced by the default and the substitution is noted in the feedback.
pub fn fallback_result(
    points: &[MeasurementPoint],
    settings: &AnalysisSettings,
) -> CalibrationResult {
    let mut feedback = FALLBACK_FEEDBACK.to_string();
    let gamma = if is_encodable_gamma(settings.target_gamma) {
        settings.target_gamma
    } else {
        warn!(
            "Target gamma {} cannot be encoded, falling back to {}",
            settings.target_gamma, DEFAULT_TARGET_GAMMA
        );
        feedback.push_str(&format!(
            " The requested gamma {} is out of range, so {} was used instead.",
            settings.target_gamma, DEFAULT_TARGET_GAMMA
        ));
        DEFAULT_TARGET_GAMMA
    };

    CalibrationResult {
        color_temperature: settings.target_white_point.color_temperature_label(),
        delta_e: mean_delta_e(points),
        feedback,
        ..CalibrationResult::neutral(FALLBACK_PROFILE_NAME, gamma)
    }
}
