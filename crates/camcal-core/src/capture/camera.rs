//! Camera abstraction
//!
//! The live video source is modeled as an owned resource with async
//! operations. A [`CameraProvider`] hands out a boxed [`Camera`]; dropping the
//! box (or calling [`Camera::stop`]) releases it.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::frame::Frame;
use crate::error::Result;

/// Adjustable camera parameters that matter for colorimetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    Exposure,
    WhiteBalance,
    Focus,
}

impl Capability {
    /// Every parameter the negotiator tries to freeze, in lock order
    pub const ALL: [Capability; 3] = [
        Capability::Exposure,
        Capability::WhiteBalance,
        Capability::Focus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Exposure => "exposure",
            Capability::WhiteBalance => "white-balance",
            Capability::Focus => "focus",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a parameter is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ControlMode {
    /// Camera keeps adjusting on its own
    Continuous,
    /// Held at an explicit value
    Manual,
}

/// The `(capability, mode)` pairs a camera supports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    modes: BTreeSet<(Capability, ControlMode)>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every capability in both continuous and manual mode
    pub fn full() -> Self {
        Capability::ALL
            .into_iter()
            .flat_map(|c| [(c, ControlMode::Continuous), (c, ControlMode::Manual)])
            .collect()
    }

    /// Every capability, continuous only
    pub fn auto_only() -> Self {
        Capability::ALL
            .into_iter()
            .map(|c| (c, ControlMode::Continuous))
            .collect()
    }

    pub fn with(mut self, capability: Capability, mode: ControlMode) -> Self {
        self.insert(capability, mode);
        self
    }

    pub fn insert(&mut self, capability: Capability, mode: ControlMode) {
        self.modes.insert((capability, mode));
    }

    pub fn supports(&self, capability: Capability, mode: ControlMode) -> bool {
        self.modes.contains(&(capability, mode))
    }

    pub fn modes_for(&self, capability: Capability) -> impl Iterator<Item = ControlMode> + '_ {
        self.modes
            .iter()
            .filter(move |(c, _)| *c == capability)
            .map(|(_, m)| *m)
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl FromIterator<(Capability, ControlMode)> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = (Capability, ControlMode)>>(iter: I) -> Self {
        Self {
            modes: iter.into_iter().collect(),
        }
    }
}

/// Current values of the adjustable parameters, as reported by the camera
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Exposure time (camera units, typically 100 µs steps)
    pub exposure_time: Option<f64>,
    /// White-balance color temperature in kelvin
    pub color_temperature: Option<f64>,
    /// Focus distance (camera units)
    pub focus_distance: Option<f64>,
}

impl CameraSettings {
    pub fn value(&self, capability: Capability) -> Option<f64> {
        match capability {
            Capability::Exposure => self.exposure_time,
            Capability::WhiteBalance => self.color_temperature,
            Capability::Focus => self.focus_distance,
        }
    }

    pub fn set(&mut self, capability: Capability, value: Option<f64>) {
        match capability {
            Capability::Exposure => self.exposure_time = value,
            Capability::WhiteBalance => self.color_temperature = value,
            Capability::Focus => self.focus_distance = value,
        }
    }
}

/// A request to drive one parameter in a given mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub capability: Capability,
    pub mode: ControlMode,
    /// Fixed value for manual mode
    pub value: Option<f64>,
}

impl Constraint {
    pub fn manual(capability: Capability, value: Option<f64>) -> Self {
        Self {
            capability,
            mode: ControlMode::Manual,
            value,
        }
    }

    pub fn continuous(capability: Capability) -> Self {
        Self {
            capability,
            mode: ControlMode::Continuous,
            value: None,
        }
    }
}

/// Errors reported by a camera after it has been acquired
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CameraError {
    #[error("{0} control is not supported")]
    NotSupported(Capability),

    #[error("{capability} constraint rejected: {reason}")]
    ConstraintRejected {
        capability: Capability,
        reason: String,
    },

    #[error("Failed to read camera settings: {0}")]
    SettingsUnavailable(String),

    #[error("Camera disconnected")]
    Disconnected,

    #[error("Camera already stopped")]
    Stopped,
}

/// A live camera held by a session
#[async_trait]
pub trait Camera: Send {
    /// Human-readable device label
    fn label(&self) -> &str;

    /// Supported `(capability, mode)` pairs
    async fn query_capabilities(&self) -> std::result::Result<CapabilitySet, CameraError>;

    /// Values the auto algorithms have converged to
    async fn read_current_settings(&self) -> std::result::Result<CameraSettings, CameraError>;

    /// Apply all constraints or fail; partial application is the camera's business
    async fn apply_constraints(
        &mut self,
        constraints: &[Constraint],
    ) -> std::result::Result<(), CameraError>;

    /// Latest frame, or `None` while the stream is not producing yet
    async fn current_frame(&mut self) -> Option<Frame>;

    /// Stop all tracks. Idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Source of cameras, e.g. a permission prompt followed by stream start
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// Acquire a camera; failures surface as [`crate::Error::CameraUnavailable`]
    async fn acquire(&self) -> Result<Box<dyn Camera>>;
}
