//! # cms-tests
//!
//! Cross-CMS acceptance testing for camcal.
//!
//! This crate provides:
//! - Wrappers that load a generated profile into each reference CMM and
//!   convert pixels from it to sRGB
//! - Seeded generators for calibration results and test ramps
//! - Helpers for driving a measurement session against the mock camera
//!
//! ## Reference Implementations
//!
//! - **lcms2**: Industry standard, full ICC support
//! - **moxcms**: Pure Rust, strict about v2 tag layout
//! - **qcms**: Firefox's CMS (pure Rust)
//!
//! A profile that any of the three rejects is a profile the OS will
//! likely reject too.

pub mod patterns;
pub mod reference;
pub mod session;

pub use patterns::{grayscale_ramp, random_result, seeded_rng};
pub use reference::{Cmm, max_channel_diff, transform_to_srgb};

/// Route `log` output to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
