//! Color space types and conversions
//!
//! This module provides:
//! - 8-bit and normalized RGB
//! - CIE XYZ color space
//! - CIELAB (L*a*b*) and color difference metrics
//! - White point definitions

pub mod lab;
pub mod rgb;
pub mod white_point;
pub mod xyz;

pub use lab::{Lab, delta_e_76};
pub use rgb::{Rgb, Rgb8};
pub use white_point::{D50, D65, D75, WhitePoint};
pub use xyz::Xyz;
