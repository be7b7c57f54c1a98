//! Profile Encoder
//!
//! Turns a [`CalibrationResult`] into an installable ICC v2.1 monitor profile
//! with matrix/TRC tags. Encoding is a pure function of the result and the
//! creation timestamp.
//!
//! Tag layout, in order:
//!
//! | Tag | Type | Content |
//! |-----|------|---------|
//! | `desc` | `desc` | profile name |
//! | `cprt` | `text` | copyright notice |
//! | `wtpt` | `XYZ ` | D50 |
//! | `rXYZ` `gXYZ` `bXYZ` | `XYZ ` | sRGB primaries (D50-adapted) × channel gain |
//! | `rTRC` `gTRC` `bTRC` | `curv` | one shared gamma curve |

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::analysis::{
    AnalysisOracle, AnalysisSettings, CalibrationOutcome, CalibrationResult, analyze_or_fallback,
};
use crate::color::{D50, Xyz};
use crate::error::{Error, Result};
use crate::icc::writer::TAG_ENTRY_SIZE;
use crate::icc::{
    CurveData, DateTimeNumber, IccHeader, IccProfile, ProfileWriter, TagSignature, TextData,
    XyzTagData,
};
use crate::session::MeasurementPoint;

/// sRGB red primary adapted to D50 (Bradford)
pub const SRGB_D50_RED: Xyz = Xyz::new(0.4360747, 0.2225045, 0.0139322);
/// sRGB green primary adapted to D50 (Bradford)
pub const SRGB_D50_GREEN: Xyz = Xyz::new(0.3850649, 0.7168786, 0.0971045);
/// sRGB blue primary adapted to D50 (Bradford)
pub const SRGB_D50_BLUE: Xyz = Xyz::new(0.1430804, 0.0606169, 0.7141733);

pub const COPYRIGHT_NOTICE: &str = "No copyright, use freely";

const FALLBACK_FILE_STEM: &str = "calibrated";

/// A finished binary profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedProfile {
    name: String,
    bytes: Vec<u8>,
}

impl EncodedProfile {
    pub const MIME_TYPE: &'static str = "application/vnd.iccprofile";

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Download file name: the profile name reduced to `[A-Za-z0-9_-]`, plus `.icc`
    pub fn file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if stem.is_empty() {
            format!("{FALLBACK_FILE_STEM}.icc")
        } else {
            format!("{stem}.icc")
        }
    }

    /// Write the profile into `dir` under [`Self::file_name`]
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        fs::write(&path, &self.bytes)?;
        info!("Saved profile '{}' to {}", self.name, path.display());
        Ok(path)
    }

    /// Parse the bytes back with the crate's own reader
    pub fn inspect(&self) -> Result<IccProfile> {
        Ok(IccProfile::parse(&self.bytes)?)
    }

    /// Load the bytes into moxcms, requiring an RGB matrix-shaper profile
    pub fn to_moxcms(&self) -> Result<moxcms::ColorProfile> {
        let profile = moxcms::ColorProfile::new_from_slice(&self.bytes)
            .map_err(|e| Error::ProfileParse(format!("{:?}", e)))?;
        if !profile.is_matrix_shaper() {
            return Err(Error::ProfileParse(
                "not a matrix-shaper profile".to_string(),
            ));
        }
        Ok(profile)
    }
}

impl AsRef<[u8]> for EncodedProfile {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Analyze measurements (falling back offline on failure) and encode the result
pub async fn analyze_and_encode(
    oracle: &dyn AnalysisOracle,
    points: &[MeasurementPoint],
    settings: &AnalysisSettings,
) -> Result<(CalibrationOutcome, EncodedProfile)> {
    let outcome = analyze_or_fallback(oracle, points, settings).await;
    let profile = encode(&outcome.result)?;
    Ok((outcome, profile))
}

/// Encode with the current time as creation date
pub fn encode(result: &CalibrationResult) -> Result<EncodedProfile> {
    encode_at(result, Utc::now())
}

/// Encode with a fixed creation date
pub fn encode_at(result: &CalibrationResult, created: DateTime<Utc>) -> Result<EncodedProfile> {
    result.validate()?;

    let header = IccHeader::display_rgb(DateTimeNumber::from_datetime(created));
    let colorant = |primary: Xyz, gain: f64| XyzTagData::single(primary * gain).encode();

    let mut writer = ProfileWriter::new(header);
    writer
        .add_tag(
            TagSignature::PROFILE_DESC,
            TextData::new(result.profile_name.as_str()).encode_desc(),
        )
        .add_tag(
            TagSignature::COPYRIGHT,
            TextData::new(COPYRIGHT_NOTICE).encode_text(),
        )
        .add_tag(
            TagSignature::MEDIA_WHITE,
            XyzTagData::single(D50.xyz).encode(),
        )
        .add_tag(
            TagSignature::RED_COLORANT,
            colorant(SRGB_D50_RED, result.red_gain),
        )
        .add_tag(
            TagSignature::GREEN_COLORANT,
            colorant(SRGB_D50_GREEN, result.green_gain),
        )
        .add_tag(
            TagSignature::BLUE_COLORANT,
            colorant(SRGB_D50_BLUE, result.blue_gain),
        )
        .add_shared_tag(
            &[
                TagSignature::RED_TRC,
                TagSignature::GREEN_TRC,
                TagSignature::BLUE_TRC,
            ],
            CurveData::gamma(result.gamma).encode(),
        );

    let bytes = writer.finalize();
    check_layout(&bytes)?;
    debug!(
        "Encoded '{}': {} bytes, {} tags",
        result.profile_name,
        bytes.len(),
        writer.entry_count()
    );

    Ok(EncodedProfile {
        name: result.profile_name.clone(),
        bytes,
    })
}

/// Size field matches the buffer and every tag starts on a 4-byte boundary
fn check_layout(bytes: &[u8]) -> Result<()> {
    let be32 = |i: usize| -> Option<u32> {
        Some(u32::from_be_bytes(bytes.get(i..i + 4)?.try_into().ok()?))
    };

    let size = be32(0).unwrap_or(0) as usize;
    let size_ok = size == bytes.len();
    debug_assert!(size_ok, "size field {size} != buffer length {}", bytes.len());
    if !size_ok {
        return Err(Error::Encoder(format!(
            "size field {size} != buffer length {}",
            bytes.len()
        )));
    }

    let count = be32(128).unwrap_or(0) as usize;
    for i in 0..count {
        let offset = be32(132 + i * TAG_ENTRY_SIZE + 4);
        let aligned = offset.is_some_and(|o| o % 4 == 0);
        debug_assert!(aligned, "tag {i} offset {offset:?} not 4-byte aligned");
        if !aligned {
            return Err(Error::Encoder(format!(
                "tag {i} offset {offset:?} not 4-byte aligned"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::analysis::{DEFAULT_TARGET_GAMMA, MIN_GAMMA};
    use crate::icc::{ColorSpace, ProfileClass, S15Fixed16, XyzNumber};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    }

    fn neutral() -> CalibrationResult {
        CalibrationResult::neutral("Living Room TV", 2.2)
    }

    fn tag_bytes<'a>(bytes: &'a [u8], sig: &[u8; 4]) -> &'a [u8] {
        let count = u32::from_be_bytes(bytes[128..132].try_into().unwrap()) as usize;
        for i in 0..count {
            let at = 132 + i * 12;
            if &bytes[at..at + 4] == sig {
                let offset = u32::from_be_bytes(bytes[at + 4..at + 8].try_into().unwrap()) as usize;
                let len = u32::from_be_bytes(bytes[at + 8..at + 12].try_into().unwrap()) as usize;
                return &bytes[offset..offset + len];
            }
        }
        panic!("tag {:?} missing", std::str::from_utf8(sig));
    }

    #[test]
    fn test_neutral_layout() {
        let profile = encode_at(&neutral(), fixed_time()).unwrap();
        let bytes = profile.as_bytes();

        assert_eq!(
            u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize,
            bytes.len()
        );
        assert_eq!(&bytes[12..16], b"mntr");
        assert_eq!(&bytes[24..26], &2025u16.to_be_bytes());
        assert_eq!(u32::from_be_bytes(bytes[128..132].try_into().unwrap()), 9);

        let order: Vec<_> = (0..9).map(|i| &bytes[132 + i * 12..136 + i * 12]).collect();
        let expected: [&[u8]; 9] = [
            b"desc", b"cprt", b"wtpt", b"rXYZ", b"gXYZ", b"bXYZ", b"rTRC", b"gTRC", b"bTRC",
        ];
        assert_eq!(order, expected);

        let red = tag_bytes(bytes, b"rXYZ");
        assert_eq!(
            XyzNumber::from_bytes(&red[8..]).unwrap(),
            XyzNumber::from_xyz(SRGB_D50_RED)
        );

        let trc = tag_bytes(bytes, b"rTRC");
        assert_eq!(trc.len(), 14);
        assert_eq!(u16::from_be_bytes([trc[12], trc[13]]), 563);
    }

    #[test]
    fn test_trc_entries_share_offset() {
        let profile = encode_at(&neutral(), fixed_time()).unwrap();
        let parsed = profile.inspect().unwrap();
        let offsets: Vec<_> = [
            TagSignature::RED_TRC,
            TagSignature::GREEN_TRC,
            TagSignature::BLUE_TRC,
        ]
        .into_iter()
        .map(|s| parsed.entry(s).unwrap().offset)
        .collect();
        assert_eq!(offsets, [offsets[0]; 3]);
        // shared curve is the last tag: 14 bytes padded to 16
        assert_eq!(offsets[0] as usize + 16, profile.len());
    }

    #[test]
    fn test_gains_scale_colorants() {
        let result = CalibrationResult {
            red_gain: 0.5,
            blue_gain: 2.0,
            ..neutral()
        };
        let parsed = encode_at(&result, fixed_time()).unwrap().inspect().unwrap();
        let [r, g, b] = parsed.colorants().unwrap();

        let q = |v: f64| S15Fixed16::from_f64(v).to_f64();
        assert_eq!(r.y, q(SRGB_D50_RED.y * 0.5));
        assert_eq!(g.y, q(SRGB_D50_GREEN.y));
        assert_eq!(b.z, q(SRGB_D50_BLUE.z * 2.0));
    }

    #[test]
    fn test_read_back() {
        let parsed = encode_at(&neutral(), fixed_time()).unwrap().inspect().unwrap();
        assert_eq!(parsed.header.device_class, ProfileClass::Display);
        assert_eq!(parsed.header.color_space, ColorSpace::Rgb);
        assert_eq!(parsed.header.pcs, ColorSpace::Xyz);
        assert_eq!(parsed.description(), Some("Living Room TV"));
        assert_eq!(parsed.copyright(), Some(COPYRIGHT_NOTICE));
        assert!(parsed.is_matrix_shaper());
        assert!(parsed.entries.iter().all(|e| e.offset % 4 == 0));
    }

    #[test]
    fn test_deterministic_for_fixed_time() {
        let a = encode_at(&neutral(), fixed_time()).unwrap();
        let b = encode_at(&neutral(), fixed_time()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_result_rejected() {
        let bad = CalibrationResult {
            gamma: -1.0,
            ..neutral()
        };
        assert!(matches!(encode(&bad), Err(Error::InvalidResult(_))));

        // Rounds to a zero u8.8 exponent
        let flat = CalibrationResult {
            gamma: 0.001,
            ..neutral()
        };
        assert!(matches!(encode(&flat), Err(Error::InvalidResult(_))));
    }

    #[test]
    fn test_smallest_gamma_is_not_flat() {
        let edge = CalibrationResult::neutral("Edge", MIN_GAMMA);
        let profile = encode_at(&edge, fixed_time()).unwrap();
        let gammas = profile.inspect().unwrap().trc_gammas().unwrap();
        assert!(gammas.iter().all(|&g| g > 0.0), "{gammas:?}");
    }

    #[test]
    fn test_file_name() {
        let profile = encode_at(&neutral(), fixed_time()).unwrap();
        assert_eq!(profile.file_name(), "Living_Room_TV.icc");

        let unnamed = encode_at(&CalibrationResult::neutral("", 2.2), fixed_time()).unwrap();
        assert_eq!(unnamed.file_name(), "calibrated.icc");
        assert_eq!(EncodedProfile::MIME_TYPE, "application/vnd.iccprofile");
    }

    #[test]
    fn test_moxcms_accepts() {
        let profile = encode_at(&neutral(), fixed_time()).unwrap();
        let mox = profile.to_moxcms().unwrap();
        assert!(mox.is_matrix_shaper());
        assert!((mox.red_colorant.y - SRGB_D50_RED.y).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_analyze_and_encode_offline() {
        let (outcome, profile) = analyze_and_encode(
            &crate::analysis::OfflineOracle,
            &[],
            &AnalysisSettings::default(),
        )
        .await
        .unwrap();
        assert!(outcome.is_fallback);
        assert_eq!(profile.file_name(), "Fallback_Profile__Offline_.icc");
        assert!(profile.inspect().unwrap().is_matrix_shaper());
    }

    #[tokio::test]
    async fn test_offline_fallback_with_out_of_range_gamma_encodes() {
        for target_gamma in [300.0, 0.001] {
            let settings = AnalysisSettings {
                target_gamma,
                ..Default::default()
            };
            let (outcome, profile) =
                analyze_and_encode(&crate::analysis::OfflineOracle, &[], &settings)
                    .await
                    .unwrap();
            assert!(outcome.is_fallback);
            assert_eq!(outcome.result.gamma, DEFAULT_TARGET_GAMMA);
            let gammas = profile.inspect().unwrap().trc_gammas().unwrap();
            assert_eq!(gammas, [563.0 / 256.0; 3], "{target_gamma}");
        }
    }

    #[test]
    fn test_save_to_dir() {
        let dir = std::env::temp_dir().join(format!("camcal-save-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let profile = encode_at(&neutral(), fixed_time()).unwrap();
        let path = profile.save_to_dir(&dir).unwrap();
        assert_eq!(fs::read(&path).unwrap(), profile.as_bytes());
        fs::remove_dir_all(&dir).unwrap();
    }
}
