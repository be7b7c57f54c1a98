//! Reference CMM wrappers
//!
//! Each function loads profile bytes into one CMM and converts RGB8 pixels
//! from that profile to the CMM's built-in sRGB.

use std::fmt;

/// The reference CMMs a generated profile is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmm {
    Lcms2,
    Moxcms,
    Qcms,
}

impl Cmm {
    pub const ALL: [Cmm; 3] = [Cmm::Lcms2, Cmm::Moxcms, Cmm::Qcms];
}

impl fmt::Display for Cmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cmm::Lcms2 => "lcms2",
            Cmm::Moxcms => "moxcms",
            Cmm::Qcms => "qcms",
        })
    }
}

/// Convert `pixels` (packed RGB8) from `profile` to sRGB with the given CMM
pub fn transform_to_srgb(cmm: Cmm, profile: &[u8], pixels: &[u8]) -> Result<Vec<u8>, String> {
    match cmm {
        Cmm::Lcms2 => transform_lcms2(profile, pixels),
        Cmm::Moxcms => transform_moxcms(profile, pixels),
        Cmm::Qcms => transform_qcms(profile, pixels),
    }
}

/// Transform using lcms2
pub fn transform_lcms2(profile: &[u8], pixels: &[u8]) -> Result<Vec<u8>, String> {
    use lcms2::{Intent, PixelFormat, Profile, Transform};

    let src = Profile::new_icc(profile).map_err(|e| format!("lcms2 profile: {}", e))?;
    let srgb = Profile::new_srgb();

    let transform = Transform::new(
        &src,
        PixelFormat::RGB_8,
        &srgb,
        PixelFormat::RGB_8,
        Intent::Perceptual,
    )
    .map_err(|e| format!("lcms2 transform: {}", e))?;

    let mut out = vec![0u8; pixels.len()];
    transform.transform_pixels(pixels, &mut out);
    Ok(out)
}

/// Transform using moxcms
pub fn transform_moxcms(profile: &[u8], pixels: &[u8]) -> Result<Vec<u8>, String> {
    use moxcms::{ColorProfile, Layout, TransformOptions};

    let src = ColorProfile::new_from_slice(profile)
        .map_err(|e| format!("moxcms profile: {:?}", e))?;
    let srgb = ColorProfile::new_srgb();

    let transform = src
        .create_transform_8bit(Layout::Rgb, &srgb, Layout::Rgb, TransformOptions::default())
        .map_err(|e| format!("moxcms transform: {:?}", e))?;

    let mut out = vec![0u8; pixels.len()];
    transform
        .transform(pixels, &mut out)
        .map_err(|e| format!("moxcms execute: {:?}", e))?;
    Ok(out)
}

/// Transform using qcms (in place on a copy)
pub fn transform_qcms(profile: &[u8], pixels: &[u8]) -> Result<Vec<u8>, String> {
    let src = qcms::Profile::new_from_slice(profile, false)
        .ok_or_else(|| "qcms profile: rejected".to_string())?;
    let srgb = qcms::Profile::new_sRGB();

    let transform =
        qcms::Transform::new(&src, &srgb, qcms::DataType::RGB8, qcms::Intent::Perceptual)
            .ok_or_else(|| "qcms transform: rejected".to_string())?;

    let mut out = pixels.to_vec();
    transform.apply(&mut out);
    Ok(out)
}

/// Largest per-channel difference between two equally sized buffers
pub fn max_channel_diff(a: &[u8], b: &[u8]) -> u8 {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_channel_diff() {
        assert_eq!(max_channel_diff(&[0, 10, 255], &[3, 10, 250]), 5);
        assert_eq!(max_channel_diff(&[], &[]), 0);
    }

    #[test]
    fn test_garbage_rejected_everywhere() {
        let junk = vec![0xAB; 64];
        for cmm in Cmm::ALL {
            assert!(transform_to_srgb(cmm, &junk, &[0, 0, 0]).is_err(), "{cmm}");
        }
    }
}
