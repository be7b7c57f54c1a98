//! Scriptable in-memory camera
//!
//! `MockCamera` shows a solid color (or a scripted frame sequence) and records
//! every constraint applied to it. A cloneable [`MockCameraHandle`] shares the
//! same state, so a test can change what the camera sees or inject faults
//! while a session owns the boxed camera.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::camera::{
    Camera, CameraError, CameraProvider, CameraSettings, Capability, CapabilitySet, ControlMode,
    Constraint,
};
use super::frame::Frame;
use crate::color::Rgb8;
use crate::error::{Error, Result};

const DEFAULT_WIDTH: usize = 320;
const DEFAULT_HEIGHT: usize = 240;

#[derive(Debug)]
struct MockState {
    capabilities: CapabilitySet,
    settings: CameraSettings,
    width: usize,
    height: usize,
    color: Rgb8,
    scripted: VecDeque<Frame>,
    blank_frames: usize,
    applied: Vec<Constraint>,
    rejected: BTreeSet<Capability>,
    fail_query: bool,
    fail_settings: bool,
    apply_delay: Option<Duration>,
    frames_served: u64,
    active: bool,
    stop_count: usize,
}

/// Shared view of a mock camera's state
#[derive(Debug, Clone)]
pub struct MockCameraHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockCameraHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the solid color the camera sees
    pub fn show(&self, color: Rgb8) {
        self.lock().color = color;
    }

    /// Queue frames served before falling back to the solid color
    pub fn push_frames(&self, frames: impl IntoIterator<Item = Frame>) {
        self.lock().scripted.extend(frames);
    }

    /// Make the next `n` frame reads return nothing
    pub fn withhold_frames(&self, n: usize) {
        self.lock().blank_frames = n;
    }

    pub fn reject_constraint(&self, capability: Capability) {
        self.lock().rejected.insert(capability);
    }

    pub fn fail_capability_query(&self) {
        self.lock().fail_query = true;
    }

    pub fn fail_settings_read(&self) {
        self.lock().fail_settings = true;
    }

    pub fn set_apply_delay(&self, delay: Option<Duration>) {
        self.lock().apply_delay = delay;
    }

    pub fn applied_constraints(&self) -> Vec<Constraint> {
        self.lock().applied.clone()
    }

    pub fn settings(&self) -> CameraSettings {
        self.lock().settings
    }

    /// Replace what the camera reports as its current parameter values
    pub fn set_settings(&self, settings: CameraSettings) {
        self.lock().settings = settings;
    }

    /// Current mode of a parameter, derived from the last applied constraint
    pub fn mode(&self, capability: Capability) -> ControlMode {
        self.lock()
            .applied
            .iter()
            .rev()
            .find(|c| c.capability == capability)
            .map_or(ControlMode::Continuous, |c| c.mode)
    }

    pub fn frames_served(&self) -> u64 {
        self.lock().frames_served
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn stop_count(&self) -> usize {
        self.lock().stop_count
    }
}

pub struct MockCamera {
    label: String,
    handle: MockCameraHandle,
}

impl MockCamera {
    pub fn new(capabilities: CapabilitySet) -> Self {
        let state = MockState {
            capabilities,
            settings: CameraSettings {
                exposure_time: Some(166.0),
                color_temperature: Some(6500.0),
                focus_distance: Some(0.3),
            },
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color: Rgb8::BLACK,
            scripted: VecDeque::new(),
            blank_frames: 0,
            applied: Vec::new(),
            rejected: BTreeSet::new(),
            fail_query: false,
            fail_settings: false,
            apply_delay: None,
            frames_served: 0,
            active: true,
            stop_count: 0,
        };
        Self {
            label: "mock camera".to_string(),
            handle: MockCameraHandle {
                state: Arc::new(Mutex::new(state)),
            },
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_color(self, color: Rgb8) -> Self {
        self.handle.show(color);
        self
    }

    pub fn with_resolution(self, width: usize, height: usize) -> Self {
        {
            let mut state = self.handle.lock();
            state.width = width;
            state.height = height;
        }
        self
    }

    pub fn handle(&self) -> MockCameraHandle {
        self.handle.clone()
    }
}

#[async_trait]
impl Camera for MockCamera {
    fn label(&self) -> &str {
        &self.label
    }

    async fn query_capabilities(&self) -> std::result::Result<CapabilitySet, CameraError> {
        let state = self.handle.lock();
        if state.fail_query {
            return Err(CameraError::Disconnected);
        }
        Ok(state.capabilities.clone())
    }

    async fn read_current_settings(&self) -> std::result::Result<CameraSettings, CameraError> {
        let state = self.handle.lock();
        if state.fail_settings {
            return Err(CameraError::SettingsUnavailable("track muted".to_string()));
        }
        Ok(state.settings)
    }

    async fn apply_constraints(
        &mut self,
        constraints: &[Constraint],
    ) -> std::result::Result<(), CameraError> {
        let delay = self.handle.lock().apply_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.handle.lock();
        if !state.active {
            return Err(CameraError::Stopped);
        }
        for c in constraints {
            if !state.capabilities.supports(c.capability, c.mode) {
                return Err(CameraError::NotSupported(c.capability));
            }
            if c.mode == ControlMode::Manual && state.rejected.contains(&c.capability) {
                return Err(CameraError::ConstraintRejected {
                    capability: c.capability,
                    reason: "overconstrained".to_string(),
                });
            }
        }
        for c in constraints {
            if c.value.is_some() {
                state.settings.set(c.capability, c.value);
            }
            state.applied.push(*c);
        }
        Ok(())
    }

    async fn current_frame(&mut self) -> Option<Frame> {
        let mut state = self.handle.lock();
        if !state.active {
            return None;
        }
        if state.blank_frames > 0 {
            state.blank_frames -= 1;
            return None;
        }
        state.frames_served += 1;
        let frame = match state.scripted.pop_front() {
            Some(frame) => frame,
            None => Frame::solid(state.width, state.height, state.color),
        };
        Some(frame)
    }

    fn stop(&mut self) {
        let mut state = self.handle.lock();
        if state.active {
            debug!("{}: stopping all tracks", self.label);
            state.active = false;
            state.stop_count += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.handle.lock().active
    }
}

impl Drop for MockCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Hands out mock cameras that share one [`MockCameraHandle`]
pub struct MockCameraProvider {
    capabilities: CapabilitySet,
    color: Rgb8,
    denied: Option<String>,
    handle: Mutex<Option<MockCameraHandle>>,
}

impl MockCameraProvider {
    pub fn new(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            color: Rgb8::BLACK,
            denied: None,
            handle: Mutex::new(None),
        }
    }

    /// Provider whose `acquire` always fails, like a denied permission prompt
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            denied: Some(reason.into()),
            ..Self::new(CapabilitySet::new())
        }
    }

    pub fn with_color(mut self, color: Rgb8) -> Self {
        self.color = color;
        self
    }

    /// Handle of the most recently acquired camera
    pub fn handle(&self) -> Option<MockCameraHandle> {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CameraProvider for MockCameraProvider {
    async fn acquire(&self) -> Result<Box<dyn Camera>> {
        if let Some(reason) = &self.denied {
            return Err(Error::CameraUnavailable(reason.clone()));
        }
        let camera = MockCamera::new(self.capabilities.clone()).with_color(self.color);
        *self.handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(camera.handle());
        Ok(Box::new(camera))
    }
}
