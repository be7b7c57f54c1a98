//! Measurement acquisition: frames, sampling, stability and camera control

pub mod camera;
pub mod frame;
pub mod mock;
pub mod negotiator;
pub mod sampler;
pub mod stability;

pub use camera::{
    Camera, CameraError, CameraProvider, CameraSettings, Capability, CapabilitySet, ControlMode,
    Constraint,
};
pub use frame::Frame;
pub use mock::{MockCamera, MockCameraHandle, MockCameraProvider};
pub use negotiator::{
    CameraLockState, CapabilityNegotiator, LockOutcome, LockState, NegotiationConfig,
    ParameterReport, ParameterStatus,
};
pub use sampler::{FrameSampler, PatchRegion, SamplerConfig};
pub use stability::{SampleHistory, StabilityConfig, StabilityDetector};
