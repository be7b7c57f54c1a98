//! CIE XYZ tristimulus values
//!
//! XYZ is the connection space of the monitor profiles we write: colorant
//! tags, the media white and the header illuminant are all XYZ triples.

use std::ops::{Add, Mul};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xyz {
    pub x: f64,
    /// Luminance
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Largest component-wise difference to `other`
    pub fn max_diff(&self, other: &Self) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

/// Summing the three colorants of a matrix-shaper gives its white
impl Add for Xyz {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Scaling a colorant by a channel gain
impl Mul<f64> for Xyz {
    type Output = Self;

    fn mul(self, gain: f64) -> Self::Output {
        Self::new(self.x * gain, self.y * gain, self.z * gain)
    }
}
