//! CIELAB and the CIE76 color difference
//!
//! Measured patches are scored by their Euclidean distance from the target
//! in L*a*b*.

use crate::color::{WhitePoint, Xyz};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    /// Lightness, 0 (black) to 100 (reference white)
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Convert relative to the given reference white
    pub fn from_xyz(xyz: Xyz, white: &WhitePoint) -> Self {
        let fx = f(xyz.x / white.xyz.x);
        let fy = f(xyz.y / white.xyz.y);
        let fz = f(xyz.z / white.xyz.z);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

/// Cube root above (6/29)^3, linear segment below
fn f(t: f64) -> f64 {
    const EPS: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;

    if t > EPS {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// CIE76 ΔE: straight-line distance in L*a*b*
pub fn delta_e_76(lhs: Lab, rhs: Lab) -> f64 {
    let (dl, da, db) = (lhs.l - rhs.l, lhs.a - rhs.a, lhs.b - rhs.b);
    (dl * dl + da * da + db * db).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{D50, D65};

    #[test]
    fn test_reference_white() {
        for white in [D50, D65] {
            let lab = Lab::from_xyz(white.xyz, &white);
            assert!((lab.l - 100.0).abs() < 1e-9, "{}", white.name);
            assert!(lab.a.abs() < 1e-9 && lab.b.abs() < 1e-9, "{}", white.name);
        }
    }

    #[test]
    fn test_black_and_dark_segment() {
        assert!(Lab::from_xyz(Xyz::default(), &D65).l.abs() < 1e-9);

        // Y = 0.008 sits on the linear segment: L = 903.3 * Y
        let dark = Lab::from_xyz(Xyz::new(0.0, 0.008, 0.0), &D65);
        assert!((dark.l - 24389.0 / 27.0 * 0.008).abs() < 1e-9);
    }

    #[test]
    fn test_delta_e_76() {
        let a = Lab::new(50.0, 0.0, 0.0);
        assert!((delta_e_76(a, Lab::new(53.0, 4.0, 0.0)) - 5.0).abs() < 1e-12);
        assert_eq!(delta_e_76(a, a), 0.0);
    }
}
