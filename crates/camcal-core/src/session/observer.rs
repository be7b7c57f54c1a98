//! Upward notifications from a measurement session

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;

use super::point::MeasurementPoint;
use super::state::SessionState;
use crate::color::Rgb8;
use crate::error::Error;

/// Receives session events. All methods default to doing nothing.
pub trait SessionObserver: Send {
    fn on_sample(&mut self, _sample: Rgb8, _stable: bool) {}

    fn on_state_change(&mut self, _state: &SessionState) {}

    fn on_complete(&mut self, _points: &[MeasurementPoint]) {}

    fn on_cancel(&mut self) {}

    fn on_error(&mut self, _error: &Error) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Owned copy of an observer notification
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Sample { sample: Rgb8, stable: bool },
    StateChanged(SessionState),
    Complete(Vec<MeasurementPoint>),
    Cancelled,
    Error(String),
}

impl SessionEvent {
    pub fn is_sample(&self) -> bool {
        matches!(self, SessionEvent::Sample { .. })
    }
}

/// Forwards every notification as a [`SessionEvent`] to a channel
impl SessionObserver for UnboundedSender<SessionEvent> {
    fn on_sample(&mut self, sample: Rgb8, stable: bool) {
        let _ = self.send(SessionEvent::Sample { sample, stable });
    }

    fn on_state_change(&mut self, state: &SessionState) {
        let _ = self.send(SessionEvent::StateChanged(state.clone()));
    }

    fn on_complete(&mut self, points: &[MeasurementPoint]) {
        let _ = self.send(SessionEvent::Complete(points.to_vec()));
    }

    fn on_cancel(&mut self) {
        let _ = self.send(SessionEvent::Cancelled);
    }

    fn on_error(&mut self, error: &Error) {
        let _ = self.send(SessionEvent::Error(error.to_string()));
    }
}

/// Records every notification; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Events other than per-tick samples
    pub fn transitions(&self) -> Vec<SessionEvent> {
        self.events().into_iter().filter(|e| !e.is_sample()).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for EventLog {
    fn on_sample(&mut self, sample: Rgb8, stable: bool) {
        self.push(SessionEvent::Sample { sample, stable });
    }

    fn on_state_change(&mut self, state: &SessionState) {
        self.push(SessionEvent::StateChanged(state.clone()));
    }

    fn on_complete(&mut self, points: &[MeasurementPoint]) {
        self.push(SessionEvent::Complete(points.to_vec()));
    }

    fn on_cancel(&mut self) {
        self.push(SessionEvent::Cancelled);
    }

    fn on_error(&mut self, error: &Error) {
        self.push(SessionEvent::Error(error.to_string()));
    }
}
