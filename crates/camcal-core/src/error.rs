//! Error types for camcal

use thiserror::Error;

use crate::capture::camera::CameraError;
use crate::icc::IccError;

/// Result type for camcal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in camcal operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The camera could not be acquired (denied, missing, busy)
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// A camera operation failed after acquisition
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    /// A session action was requested in a state that does not allow it
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition { action: &'static str, state: String },

    /// No sample has been taken from the camera yet
    #[error("No camera sample available yet")]
    NoSample,

    /// Lock requested before the reading converged (with `require_stable`)
    #[error("Camera reading has not stabilized yet")]
    Unstable,

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Calibration result outside the encodable range
    #[error("Invalid calibration result: {0}")]
    InvalidResult(String),

    /// Analysis oracle failed or returned garbage
    #[error("Analysis oracle error: {0}")]
    Oracle(String),

    /// Failed to read back an ICC profile
    #[error("Profile error: {0}")]
    Profile(#[from] IccError),

    /// A color management engine rejected an encoded profile
    #[error("Profile parse error: {0}")]
    ProfileParse(String),

    /// Encoder produced a buffer that breaks its own invariants
    #[error("Encoder invariant violated: {0}")]
    Encoder(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Whether the session can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidTransition { .. }
                | Error::NoSample
                | Error::Unstable
                | Error::Camera(_)
                | Error::Oracle(_)
                | Error::InvalidResult(_)
        )
    }
}
