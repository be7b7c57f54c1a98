//! User-chosen calibration targets

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::is_encodable_gamma;
use crate::color::{D50, D65, D75, WhitePoint};
use crate::error::{Error, Result};

pub const DEFAULT_TARGET_GAMMA: f64 = 2.2;

/// Requested display white point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WhitePointTarget {
    #[default]
    D65,
    D50,
    D75,
    /// Keep whatever white the panel has
    Native,
}

impl WhitePointTarget {
    pub fn white_point(&self) -> Option<WhitePoint> {
        match self {
            WhitePointTarget::D65 => Some(D65),
            WhitePointTarget::D50 => Some(D50),
            WhitePointTarget::D75 => Some(D75),
            WhitePointTarget::Native => None,
        }
    }

    /// Nominal color temperature, e.g. `"6500K"`
    pub fn color_temperature_label(&self) -> String {
        match self.white_point() {
            Some(wp) => format!("{}K", wp.nominal_temperature()),
            None => "Native".to_string(),
        }
    }
}

impl fmt::Display for WhitePointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.white_point() {
            Some(wp) => f.write_str(wp.name),
            None => f.write_str("Native"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisSettings {
    pub target_gamma: f64,
    pub target_white_point: WhitePointTarget,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            target_gamma: DEFAULT_TARGET_GAMMA,
            target_white_point: WhitePointTarget::D65,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<()> {
        if !is_encodable_gamma(self.target_gamma) {
            return Err(Error::invalid_parameter("target_gamma", self.target_gamma));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::MAX_GAMMA;

    #[test]
    fn test_labels() {
        assert_eq!(WhitePointTarget::D65.color_temperature_label(), "6500K");
        assert_eq!(WhitePointTarget::Native.color_temperature_label(), "Native");
        assert_eq!(WhitePointTarget::D50.to_string(), "D50");
        assert!(WhitePointTarget::Native.white_point().is_none());
    }

    #[test]
    fn test_gamma_bounds() {
        let with = |target_gamma| AnalysisSettings {
            target_gamma,
            ..Default::default()
        };
        assert!(with(2.2).validate().is_ok());
        assert!(with(MAX_GAMMA).validate().is_ok());
        for bad in [0.0, 0.001, 300.0, f64::NAN] {
            assert!(
                matches!(with(bad).validate(), Err(Error::InvalidParameter { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_settings_json() {
        let settings: AnalysisSettings =
            serde_json::from_str(r#"{"targetGamma": 2.4, "targetWhitePoint": "D50"}"#).unwrap();
        assert_eq!(settings.target_gamma, 2.4);
        assert_eq!(settings.target_white_point, WhitePointTarget::D50);

        let defaults: AnalysisSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, AnalysisSettings::default());
    }

    #[test]
    fn test_validate() {
        assert!(AnalysisSettings::default().validate().is_ok());
        let bad = AnalysisSettings {
            target_gamma: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
