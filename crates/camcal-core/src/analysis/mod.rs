//! Analysis: oracle seam, reply parsing and the offline fallback

pub mod fallback;
pub mod oracle;
pub mod payload;
pub mod result;
pub mod settings;

pub use fallback::{FALLBACK_PROFILE_NAME, fallback_result, mean_delta_e};
pub use oracle::{AnalysisOracle, OfflineOracle, ReplayOracle, analyze_or_fallback};
pub use payload::{AnalysisRequest, parse_oracle_payload};
pub use result::{
    CalibrationOutcome, CalibrationResult, MAX_GAIN, MAX_GAMMA, MIN_GAMMA, is_encodable_gamma,
};
pub use settings::{AnalysisSettings, DEFAULT_TARGET_GAMMA, WhitePointTarget};
