//! Target patches and measurement points

use serde::{Deserialize, Serialize};

use crate::color::{Rgb8, delta_e_76};

/// One on-screen test patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPatch {
    pub label: String,
    pub target: Rgb8,
}

impl TargetPatch {
    pub fn new(label: impl Into<String>, target: Rgb8) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }
}

/// A patch together with what the camera saw for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPoint {
    pub label: String,
    pub target_color: Rgb8,
    pub measured_color: Option<Rgb8>,
}

impl MeasurementPoint {
    pub fn from_target(patch: &TargetPatch) -> Self {
        Self {
            label: patch.label.clone(),
            target_color: patch.target,
            measured_color: None,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.measured_color.is_some()
    }

    /// CIE76 distance between target and measurement, if measured
    pub fn delta_e(&self) -> Option<f64> {
        self.measured_color
            .map(|m| delta_e_76(self.target_color.to_lab(), m.to_lab()))
    }
}

/// Six-patch sequence: white, red, green, blue, 50% gray, black
pub fn default_targets() -> Vec<TargetPatch> {
    vec![
        TargetPatch::new("White", Rgb8::WHITE),
        TargetPatch::new("Red", Rgb8::new(255, 0, 0)),
        TargetPatch::new("Green", Rgb8::new(0, 255, 0)),
        TargetPatch::new("Blue", Rgb8::new(0, 0, 255)),
        TargetPatch::new("Gray 50%", Rgb8::new(128, 128, 128)),
        TargetPatch::new("Black", Rgb8::BLACK),
    ]
}
