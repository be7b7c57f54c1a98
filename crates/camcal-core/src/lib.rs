//! # camcal - camera-as-colorimeter display calibration
//!
//! Uses a phone or laptop camera as an improvised colorimeter: it samples the
//! light reflected from on-screen test patches, hands the measurements to an
//! analysis oracle, and encodes the answer as an installable ICC v2.1
//! monitor profile.
//!
//! ## Pipeline
//!
//! 1. [`capture::FrameSampler`] averages a central patch of every frame.
//! 2. [`capture::StabilityDetector`] decides when the reading has converged.
//! 3. [`capture::CapabilityNegotiator`] freezes exposure, white balance and focus.
//! 4. [`session::MeasurementSession`] walks the patch list and collects
//!    [`session::MeasurementPoint`]s; [`session::SessionHandle`] runs it on a
//!    tokio task at display cadence.
//! 5. [`analysis::analyze_or_fallback`] asks the oracle for corrections.
//! 6. [`profile::encode`] writes the profile.
//!
//! ## Quick Start
//!
//! ```no_run
//! use camcal_core::analysis::{AnalysisSettings, OfflineOracle};
//! use camcal_core::capture::{CapabilitySet, MockCameraProvider};
//! use camcal_core::session::{MeasurementSession, SessionConfig, default_targets};
//!
//! # async fn run() -> camcal_core::Result<()> {
//! let provider = MockCameraProvider::new(CapabilitySet::full());
//! let mut session = MeasurementSession::new(default_targets(), SessionConfig::default())?;
//! session.start(&provider).await?;
//! session.tick().await;
//! session.lock().await?;
//! // ... freeze/advance through every patch ...
//!
//! let (_outcome, profile) = camcal_core::profile::analyze_and_encode(
//!     &OfflineOracle,
//!     session.points(),
//!     &AnalysisSettings::default(),
//! )
//! .await?;
//! profile.save_to_dir(".")?;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod capture;
pub mod color;
pub mod config;
pub mod error;
pub mod icc;
pub mod profile;
pub mod session;
pub mod simd;

pub use analysis::{
    AnalysisOracle, AnalysisSettings, CalibrationOutcome, CalibrationResult, WhitePointTarget,
    analyze_or_fallback, parse_oracle_payload,
};
pub use capture::{Camera, CameraProvider, Frame};
pub use color::Rgb8;
pub use config::CamcalConfig;
pub use error::{Error, Result};
pub use profile::{EncodedProfile, encode, encode_at};
pub use session::{
    MeasurementPoint, MeasurementSession, SessionConfig, SessionHandle, SessionObserver,
    SessionState, TargetPatch, default_targets,
};

/// Version of camcal
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
