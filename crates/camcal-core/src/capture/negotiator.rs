//! Capability Negotiator
//!
//! Freezes exposure, white balance and focus at the values the camera's auto
//! algorithms converged to, so that later patches are measured under the same
//! conditions as the reference white. Every failure degrades to leaving the
//! parameter in continuous mode; nothing here is fatal to a session.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::camera::{Camera, CameraError, Capability, ControlMode, Constraint};
use crate::color::Rgb8;

/// Upper bound on a whole lock negotiation
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Timeout for the whole negotiation, in milliseconds
    pub timeout_ms: u64,
    /// Refuse to lock until the stability detector reports stable
    pub require_stable: bool,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
            require_stable: false,
        }
    }
}

impl NegotiationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Where the camera's adjustable parameters stand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LockState {
    /// Auto exposure/white balance/focus running
    #[default]
    Continuous,
    /// Negotiation in flight
    LockRequested,
    /// All three parameters frozen
    Locked,
    /// Some or all parameters could not be frozen
    LockDegraded,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockState::Continuous => "continuous",
            LockState::LockRequested => "lock requested",
            LockState::Locked => "locked",
            LockState::LockDegraded => "lock degraded",
        };
        f.write_str(s)
    }
}

/// Result of negotiating one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterStatus {
    /// Held in manual mode at the given value
    Locked { value: f64 },
    /// Left under automatic control
    Continuous { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterReport {
    pub capability: Capability,
    pub status: ParameterStatus,
}

impl ParameterReport {
    pub fn is_locked(&self) -> bool {
        matches!(self.status, ParameterStatus::Locked { .. })
    }

    fn continuous(capability: Capability, reason: impl Into<String>) -> Self {
        Self {
            capability,
            status: ParameterStatus::Continuous {
                reason: reason.into(),
            },
        }
    }
}

/// Outcome of one lock attempt
#[derive(Debug, Clone, PartialEq)]
pub struct LockOutcome {
    pub state: LockState,
    pub parameters: Vec<ParameterReport>,
}

impl LockOutcome {
    fn degraded(reason: &str) -> Self {
        Self {
            state: LockState::LockDegraded,
            parameters: Capability::ALL
                .into_iter()
                .map(|c| ParameterReport::continuous(c, reason))
                .collect(),
        }
    }

    fn from_reports(parameters: Vec<ParameterReport>) -> Self {
        let state = if parameters.iter().all(ParameterReport::is_locked) {
            LockState::Locked
        } else {
            LockState::LockDegraded
        };
        Self { state, parameters }
    }

    pub fn locked(&self) -> impl Iterator<Item = Capability> + '_ {
        self.parameters
            .iter()
            .filter(|p| p.is_locked())
            .map(|p| p.capability)
    }

    pub fn continuous(&self) -> impl Iterator<Item = Capability> + '_ {
        self.parameters
            .iter()
            .filter(|p| !p.is_locked())
            .map(|p| p.capability)
    }

    /// At least one parameter is frozen in hardware
    pub fn any_locked(&self) -> bool {
        self.parameters.iter().any(ParameterReport::is_locked)
    }
}

/// What the session remembers about the last lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CameraLockState {
    pub hardware_locked: bool,
    pub reference_white: Option<Rgb8>,
}

impl CameraLockState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityNegotiator {
    config: NegotiationConfig,
    state: LockState,
}

impl CapabilityNegotiator {
    pub fn new(config: NegotiationConfig) -> Self {
        Self {
            config,
            state: LockState::Continuous,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Try to freeze every parameter at its current value.
    ///
    /// Never fails: errors and the timeout both yield [`LockState::LockDegraded`].
    pub async fn lock(&mut self, camera: &mut dyn Camera) -> LockOutcome {
        self.state = LockState::LockRequested;
        let timeout = self.config.timeout();
        debug!("{}: negotiating lock (timeout {:?})", camera.label(), timeout);

        let outcome = match tokio::time::timeout(timeout, negotiate(camera)).await {
            Ok(Ok(reports)) => LockOutcome::from_reports(reports),
            Ok(Err(err)) => {
                warn!("Camera lock failed, continuing with auto controls: {}", err);
                LockOutcome::degraded(&err.to_string())
            }
            Err(_) => {
                warn!("Camera lock timed out after {:?}", timeout);
                LockOutcome::degraded("negotiation timed out")
            }
        };

        match outcome.state {
            LockState::Locked => info!("Camera locked: exposure, white-balance and focus fixed"),
            _ => {
                let continuous: Vec<_> = outcome.continuous().map(|c| c.name()).collect();
                info!(
                    "Camera lock degraded, still automatic: {}",
                    continuous.join(", ")
                );
            }
        }

        self.state = outcome.state;
        outcome
    }

    /// Hand every parameter back to automatic control. Best effort: each
    /// parameter is released on its own so one refusal does not pin the others.
    pub async fn unlock(&mut self, camera: &mut dyn Camera) {
        let timeout = self.config.timeout();
        for capability in Capability::ALL {
            let constraints = [Constraint::continuous(capability)];
            let release = camera.apply_constraints(&constraints);
            match tokio::time::timeout(timeout, release).await {
                Ok(Ok(())) => debug!("{}: {} back to continuous", camera.label(), capability),
                Ok(Err(err)) => warn!("Failed to restore continuous {}: {}", capability, err),
                Err(_) => warn!("Restoring continuous {} timed out", capability),
            }
        }
        self.state = LockState::Continuous;
    }

    /// Forget the lock without talking to the camera (camera already released)
    pub fn reset(&mut self) {
        self.state = LockState::Continuous;
    }
}

async fn negotiate(camera: &mut dyn Camera) -> Result<Vec<ParameterReport>, CameraError> {
    let capabilities = camera.query_capabilities().await?;
    let settings = camera.read_current_settings().await?;

    let mut reports = Vec::with_capacity(Capability::ALL.len());
    for capability in Capability::ALL {
        if !capabilities.supports(capability, ControlMode::Manual) {
            reports.push(ParameterReport::continuous(
                capability,
                "manual mode not offered",
            ));
            continue;
        }

        let Some(value) = settings.value(capability) else {
            reports.push(ParameterReport::continuous(
                capability,
                "current value unavailable",
            ));
            continue;
        };
        match camera
            .apply_constraints(&[Constraint::manual(capability, Some(value))])
            .await
        {
            Ok(()) => reports.push(ParameterReport {
                capability,
                status: ParameterStatus::Locked { value },
            }),
            Err(err) => {
                debug!("{} lock rejected: {}", capability, err);
                reports.push(ParameterReport::continuous(capability, err.to_string()));
            }
        }
    }
    Ok(reports)
}
