//! Measurement session: state machine, observer interface and runner

pub mod machine;
pub mod observer;
pub mod point;
pub mod runner;
pub mod state;

pub use machine::{DEFAULT_TICK_INTERVAL, MeasurementSession, SessionConfig};
pub use observer::{EventLog, NoopObserver, SessionEvent, SessionObserver};
pub use point::{MeasurementPoint, TargetPatch, default_targets};
pub use runner::{SessionCommand, SessionHandle, SessionRequest, run_session};
pub use state::{CapturePhase, Progress, SessionState};
