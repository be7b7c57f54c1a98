//! Measurement Session
//!
//! `Setup → Measuring{index, Live|Frozen} → Complete`, with `Cancelled` as an
//! absorbing state and `Failed` left only by reacquiring the camera. The
//! session owns the camera, the sampler, the stability detector and the
//! negotiator, and produces an ordered list of measurement points.
//!
//! Every action checks the current state first; an action that is not allowed
//! returns [`Error::InvalidTransition`] and leaves the session untouched.

use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::observer::{NoopObserver, SessionObserver};
use super::point::{MeasurementPoint, TargetPatch};
use super::state::{CapturePhase, Progress, SessionState};
use crate::capture::{
    Camera, CameraLockState, CameraProvider, CapabilityNegotiator, FrameSampler, LockOutcome,
    LockState, NegotiationConfig, SamplerConfig, StabilityConfig, StabilityDetector,
};
use crate::color::Rgb8;
use crate::error::{Error, Result};

/// Display refresh cadence the runner ticks at
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub sampler: SamplerConfig,
    pub stability: StabilityConfig,
    pub negotiation: NegotiationConfig,
    /// Runner tick interval, in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            stability: StabilityConfig::default(),
            negotiation: NegotiationConfig::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sampler.patch_size == 0 {
            return Err(Error::invalid_parameter(
                "sampler.patch_size",
                self.sampler.patch_size,
            ));
        }
        self.stability.validate()?;
        if self.tick_interval_ms == 0 {
            return Err(Error::invalid_parameter(
                "tick_interval_ms",
                self.tick_interval_ms,
            ));
        }
        Ok(())
    }
}

pub struct MeasurementSession {
    config: SessionConfig,
    points: Vec<MeasurementPoint>,
    state: SessionState,
    camera: Option<Box<dyn Camera>>,
    sampler: FrameSampler,
    detector: StabilityDetector,
    negotiator: CapabilityNegotiator,
    lock_state: CameraLockState,
    last_lock: Option<LockOutcome>,
    current_sample: Option<Rgb8>,
    pending: Option<Rgb8>,
    observer: Box<dyn SessionObserver>,
}

impl MeasurementSession {
    pub fn new(targets: Vec<TargetPatch>, config: SessionConfig) -> Result<Self> {
        if targets.is_empty() {
            return Err(Error::invalid_parameter("targets", "empty list"));
        }
        config.validate()?;

        Ok(Self {
            points: targets.iter().map(MeasurementPoint::from_target).collect(),
            state: SessionState::Setup,
            camera: None,
            sampler: FrameSampler::from_config(&config.sampler)?,
            detector: StabilityDetector::new(config.stability)?,
            negotiator: CapabilityNegotiator::new(config.negotiation),
            lock_state: CameraLockState::default(),
            last_lock: None,
            current_sample: None,
            pending: None,
            observer: Box::new(NoopObserver),
            config,
        })
    }

    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observer = observer;
    }

    // --- accessors ---

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    pub fn lock_state(&self) -> CameraLockState {
        self.lock_state
    }

    pub fn lock_outcome(&self) -> Option<&LockOutcome> {
        self.last_lock.as_ref()
    }

    pub fn negotiator_state(&self) -> LockState {
        self.negotiator.state()
    }

    pub fn current_sample(&self) -> Option<Rgb8> {
        self.current_sample
    }

    /// Reading captured by the last freeze, not yet committed
    pub fn pending_measurement(&self) -> Option<Rgb8> {
        self.pending
    }

    pub fn is_stable(&self) -> bool {
        self.detector.is_stable()
    }

    pub fn instability(&self) -> Option<u8> {
        self.detector.instability()
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn active_patch(&self) -> Option<&MeasurementPoint> {
        self.state.active_index().and_then(|i| self.points.get(i))
    }

    pub fn progress(&self) -> Progress {
        let total = self.points.len();
        let completed = match &self.state {
            SessionState::Measuring { index, .. } => *index,
            SessionState::Complete => total,
            _ => 0,
        };
        Progress { completed, total }
    }

    /// Points in order, if every one of them has been measured
    pub fn completed_points(&self) -> Option<&[MeasurementPoint]> {
        (self.state == SessionState::Complete).then_some(self.points.as_slice())
    }

    // --- actions ---

    /// Acquire the camera. Failure puts the session in `Failed`, where it
    /// stays until a later `start` acquires a camera and returns it to
    /// `Setup` with its measurements intact. Each failed attempt is reported
    /// once; nothing retries on its own.
    pub async fn start(&mut self, provider: &dyn CameraProvider) -> Result<()> {
        let reacquiring = matches!(self.state, SessionState::Failed(_));
        if !(self.state == SessionState::Setup || reacquiring) || self.camera.is_some() {
            return Err(self.invalid("start"));
        }

        match provider.acquire().await {
            Ok(camera) => {
                info!("Camera acquired: {}", camera.label());
                self.camera = Some(camera);
                if reacquiring {
                    self.set_state(SessionState::Setup);
                }
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Sample one frame unless frozen or without a camera
    pub async fn tick(&mut self) -> Option<Rgb8> {
        let sampling = match &self.state {
            SessionState::Setup => true,
            SessionState::Measuring { phase, .. } => *phase == CapturePhase::Live,
            _ => false,
        };
        if !sampling {
            return None;
        }

        let camera = self.camera.as_deref_mut()?;
        let sample = self.sampler.poll(camera).await?;
        let stable = self.detector.push(sample);
        self.current_sample = Some(sample);
        self.observer.on_sample(sample, stable);
        Some(sample)
    }

    /// Freeze exposure, white balance and focus and start on the first patch.
    ///
    /// Proceeds to measuring whatever the negotiation outcome.
    pub async fn lock(&mut self) -> Result<LockOutcome> {
        if self.state != SessionState::Setup {
            return Err(self.invalid("lock"));
        }
        if self.config.negotiation.require_stable && !self.detector.is_stable() {
            return Err(Error::Unstable);
        }
        let Some(camera) = self.camera.as_deref_mut() else {
            return Err(Error::CameraUnavailable("camera not started".to_string()));
        };

        let outcome = self.negotiator.lock(camera).await;
        self.lock_state = CameraLockState {
            hardware_locked: outcome.any_locked(),
            reference_white: self.current_sample,
        };
        if self.current_sample.is_none() {
            warn!("Locked without a reference white sample");
        }
        self.last_lock = Some(outcome.clone());

        self.set_state(SessionState::Measuring {
            index: 0,
            phase: CapturePhase::Live,
        });
        Ok(outcome)
    }

    /// Capture the current sample for the active patch and pause sampling
    pub fn freeze(&mut self) -> Result<Rgb8> {
        let SessionState::Measuring {
            index,
            phase: CapturePhase::Live,
        } = self.state
        else {
            return Err(self.invalid("freeze"));
        };
        let sample = self.current_sample.ok_or(Error::NoSample)?;

        self.pending = Some(sample);
        debug!("Captured {} for patch {}", sample, index + 1);
        self.set_state(SessionState::Measuring {
            index,
            phase: CapturePhase::Frozen,
        });
        Ok(sample)
    }

    /// Discard the captured reading and resume sampling the same patch
    pub fn unfreeze(&mut self) -> Result<()> {
        let SessionState::Measuring {
            index,
            phase: CapturePhase::Frozen,
        } = self.state
        else {
            return Err(self.invalid("unfreeze"));
        };

        self.pending = None;
        self.set_state(SessionState::Measuring {
            index,
            phase: CapturePhase::Live,
        });
        Ok(())
    }

    /// Commit the captured reading and move to the next patch (or complete)
    pub fn advance(&mut self) -> Result<&SessionState> {
        let SessionState::Measuring {
            index,
            phase: CapturePhase::Frozen,
        } = self.state
        else {
            return Err(self.invalid("advance"));
        };
        let Some(measured) = self.pending.take() else {
            return Err(Error::NoSample);
        };

        self.points[index].measured_color = Some(measured);

        if index + 1 < self.points.len() {
            self.set_state(SessionState::Measuring {
                index: index + 1,
                phase: CapturePhase::Live,
            });
        } else {
            info!("All {} patches measured", self.points.len());
            self.set_state(SessionState::Complete);
            self.observer.on_complete(&self.points);
        }
        Ok(&self.state)
    }

    /// Back to setup: unlock the camera and forget the lock, keep measurements
    pub async fn reset(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(self.invalid("reset"));
        }

        if self.negotiator.state() != LockState::Continuous {
            if let Some(camera) = self.camera.as_deref_mut() {
                self.negotiator.unlock(camera).await;
            }
        }
        self.negotiator.reset();
        self.lock_state.clear();
        self.last_lock = None;
        self.pending = None;
        self.set_state(SessionState::Setup);
        Ok(())
    }

    /// Release the camera and stop the session
    pub fn cancel(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(self.invalid("cancel"));
        }

        self.teardown();
        self.set_state(SessionState::Cancelled);
        self.observer.on_cancel();
        Ok(())
    }

    /// Stop all camera tracks. Safe to call any number of times.
    pub fn teardown(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            info!("Releasing camera: {}", camera.label());
            camera.stop();
        }
        self.negotiator.reset();
        self.detector.clear();
        self.current_sample = None;
    }

    fn fail(&mut self, err: &Error) {
        warn!("Session failed: {}", err);
        self.teardown();
        self.set_state(SessionState::Failed(err.to_string()));
        self.observer.on_error(err);
    }

    fn set_state(&mut self, state: SessionState) {
        debug!("Session {} -> {}", self.state, state);
        self.state = state;
        self.observer.on_state_change(&self.state);
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            action,
            state: self.state.to_string(),
        }
    }
}

impl Drop for MeasurementSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
