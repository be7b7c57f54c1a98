//! Session states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the active patch is still sampling or holds a captured reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapturePhase {
    Live,
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Camera aimed at the reference white, not yet locked
    #[default]
    Setup,
    /// Walking the patch list
    Measuring { index: usize, phase: CapturePhase },
    /// Every patch committed
    Complete,
    /// Camera released on request
    Cancelled,
    /// Camera acquisition failed; only a successful `start` leaves it
    Failed(String),
}

impl SessionState {
    /// No command applies any more; a runner stops here
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Cancelled | SessionState::Failed(_))
    }

    pub fn is_frozen(&self) -> bool {
        matches!(
            self,
            SessionState::Measuring {
                phase: CapturePhase::Frozen,
                ..
            }
        )
    }

    pub fn active_index(&self) -> Option<usize> {
        match self {
            SessionState::Measuring { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Setup => f.write_str("Setup"),
            SessionState::Measuring { index, phase } => {
                write!(f, "Measuring(patch {}, {:?})", index + 1, phase)
            }
            SessionState::Complete => f.write_str("Complete"),
            SessionState::Cancelled => f.write_str("Cancelled"),
            SessionState::Failed(reason) => write!(f, "Failed({reason})"),
        }
    }
}

/// How far through the patch list a session is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Patches already passed in the current run
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}
