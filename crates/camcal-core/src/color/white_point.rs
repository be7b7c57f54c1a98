//! Reference white points

use crate::color::Xyz;

/// A named illuminant with Y normalized to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhitePoint {
    pub name: &'static str,
    /// Correlated color temperature in kelvin
    pub cct: u32,
    pub xyz: Xyz,
}

impl WhitePoint {
    pub const fn new(name: &'static str, cct: u32, x: f64, z: f64) -> Self {
        Self {
            name,
            cct,
            xyz: Xyz::new(x, 1.0, z),
        }
    }

    /// Marketing-style temperature, CCT rounded to the nearest 100 K
    pub fn nominal_temperature(&self) -> u32 {
        (self.cct + 50) / 100 * 100
    }
}

/// Profile connection space illuminant. Z is the ICC header value 0.8249.
pub const D50: WhitePoint = WhitePoint::new("D50", 5003, 0.9642, 0.8249);

/// sRGB reference white
pub const D65: WhitePoint = WhitePoint::new("D65", 6504, 0.95047, 1.08883);

pub const D75: WhitePoint = WhitePoint::new("D75", 7504, 0.94972, 1.22638);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcs_illuminant() {
        assert_eq!(D50.xyz, Xyz::new(0.9642, 1.0, 0.8249));
    }

    #[test]
    fn test_nominal_temperature() {
        assert_eq!(D50.nominal_temperature(), 5000);
        assert_eq!(D65.nominal_temperature(), 6500);
        assert_eq!(D75.nominal_temperature(), 7500);
    }
}
