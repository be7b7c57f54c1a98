//! RGB Color Primitives
//!
//! Camera samples and patch targets are 8-bit sRGB triples. A normalized
//! floating-point form is used when converting to XYZ/Lab.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{D65, Lab, Xyz};

/// 8-bit sRGB color, each channel in [0, 255]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub const fn from_array(arr: [u8; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Round and clamp floating channel values into an 8-bit color
    #[inline]
    pub fn from_f64_channels(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(r), q(g), q(b))
    }

    /// Hexadecimal representation, e.g. `#FF8000`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Largest per-channel absolute difference to another color
    #[inline]
    pub fn max_channel_diff(&self, other: &Self) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }

    #[inline]
    pub fn to_normalized(&self) -> Rgb {
        Rgb::from_u8(self.r, self.g, self.b)
    }

    /// Convert to CIELAB assuming sRGB encoding and a D65 reference white
    pub fn to_lab(&self) -> Lab {
        Lab::from_xyz(self.to_normalized().linearize().to_xyz_d65(), &D65)
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(arr: [u8; 3]) -> Self {
        Self::from_array(arr)
    }
}

/// RGB color in floating-point (0.0-1.0 range)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    /// Red component (0.0 to 1.0)
    pub r: f64,
    /// Green component (0.0 to 1.0)
    pub g: f64,
    /// Blue component (0.0 to 1.0)
    pub b: f64,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create from 8-bit values (0-255)
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Convert to 8-bit values (0-255)
    #[inline]
    pub fn to_u8(&self) -> Rgb8 {
        Rgb8::from_f64_channels(self.r * 255.0, self.g * 255.0, self.b * 255.0)
    }

    /// Remove the sRGB transfer function
    pub fn linearize(&self) -> Self {
        Self::new(
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        )
    }

    /// Linear sRGB to XYZ (D65)
    pub fn to_xyz_d65(&self) -> Xyz {
        let m = &SRGB_TO_XYZ_D65;
        Xyz::new(
            m[0][0] * self.r + m[0][1] * self.g + m[0][2] * self.b,
            m[1][0] * self.r + m[1][1] * self.g + m[1][2] * self.b,
            m[2][0] * self.r + m[2][1] * self.g + m[2][2] * self.b,
        )
    }
}

/// sRGB to XYZ matrix (D65)
const SRGB_TO_XYZ_D65: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

#[inline]
fn srgb_to_linear(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
