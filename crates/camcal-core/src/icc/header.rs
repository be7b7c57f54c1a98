//! Profile Header
//!
//! 128 bytes of big-endian fields at the start of every profile. The writer
//! emits it with a zero size that is patched once the tag data is laid out.

use super::error::IccError;
use super::types::{DateTimeNumber, XyzNumber};
use crate::color::D50;

/// Magic at offset 36
pub const PROFILE_SIGNATURE: u32 = u32::from_be_bytes(*b"acsp");

/// Header length, also the minimum valid profile size
pub const HEADER_SIZE: usize = 128;

/// Preferred CMM written into generated profiles
pub const CMM_SIGNATURE: u32 = u32::from_be_bytes(*b"lcms");

/// Primary platform written into generated profiles
pub const PLATFORM_SIGNATURE: u32 = u32::from_be_bytes(*b"APPL");

/// Device manufacturer written into generated profiles
pub const MANUFACTURER_SIGNATURE: u32 = u32::from_be_bytes(*b"none");

/// Profile creator written into generated profiles
pub const CREATOR_SIGNATURE: u32 = u32::from_be_bytes(*b"ccal");

/// The fixed 128-byte profile header, field for field
#[derive(Debug, Clone, PartialEq)]
pub struct IccHeader {
    /// Whole profile length; zero until the writer patches it
    pub size: u32,
    pub cmm_type: u32,
    pub version: ProfileVersion,
    pub device_class: ProfileClass,
    pub color_space: ColorSpace,
    /// Connection space; always XYZ for profiles we write
    pub pcs: ColorSpace,
    pub creation_date: DateTimeNumber,
    pub platform: u32,
    pub flags: u32,
    pub manufacturer: u32,
    pub model: u32,
    pub attributes: u64,
    pub rendering_intent: RenderingIntent,
    /// PCS illuminant, D50
    pub illuminant: XyzNumber,
    pub creator: u32,
}

impl IccHeader {
    /// Header for a v2.1 RGB display profile with an XYZ PCS.
    ///
    /// `size` starts at zero; the writer patches it once the buffer is complete.
    pub fn display_rgb(creation_date: DateTimeNumber) -> Self {
        Self {
            size: 0,
            cmm_type: CMM_SIGNATURE,
            version: ProfileVersion::V2_1,
            device_class: ProfileClass::Display,
            color_space: ColorSpace::Rgb,
            pcs: ColorSpace::Xyz,
            creation_date,
            platform: PLATFORM_SIGNATURE,
            flags: 0,
            manufacturer: MANUFACTURER_SIGNATURE,
            model: 0,
            attributes: 0,
            rendering_intent: RenderingIntent::Perceptual,
            illuminant: XyzNumber::from_xyz(D50.xyz),
            creator: CREATOR_SIGNATURE,
        }
    }

    /// Serialize to the 128-byte wire form. Profile ID and reserved bytes are zero.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut put = |offset: usize, bytes: &[u8]| {
            out[offset..offset + bytes.len()].copy_from_slice(bytes);
        };

        put(0, &self.size.to_be_bytes());
        put(4, &self.cmm_type.to_be_bytes());
        put(8, &self.version.to_u32().to_be_bytes());
        put(12, &self.device_class.to_u32().to_be_bytes());
        put(16, &self.color_space.to_u32().to_be_bytes());
        put(20, &self.pcs.to_u32().to_be_bytes());
        put(24, &self.creation_date.to_bytes());
        put(36, &PROFILE_SIGNATURE.to_be_bytes());
        put(40, &self.platform.to_be_bytes());
        put(44, &self.flags.to_be_bytes());
        put(48, &self.manufacturer.to_be_bytes());
        put(52, &self.model.to_be_bytes());
        put(56, &self.attributes.to_be_bytes());
        put(64, &self.rendering_intent.to_u32().to_be_bytes());
        put(68, &self.illuminant.to_bytes());
        put(80, &self.creator.to_be_bytes());

        out
    }

    /// Parse header from bytes
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < HEADER_SIZE {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let be32 = |i: usize| u32::from_be_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);

        let signature = be32(36);
        if signature != PROFILE_SIGNATURE {
            return Err(IccError::InvalidSignature(signature));
        }

        Ok(Self {
            size: be32(0),
            cmm_type: be32(4),
            version: ProfileVersion::from_u32(be32(8)),
            device_class: ProfileClass::from_u32(be32(12))?,
            color_space: ColorSpace::from_u32(be32(16))?,
            pcs: ColorSpace::from_u32(be32(20))?,
            creation_date: DateTimeNumber::from_bytes(&data[24..36]).unwrap_or_default(),
            platform: be32(40),
            flags: be32(44),
            manufacturer: be32(48),
            model: be32(52),
            attributes: u64::from(be32(56)) << 32 | u64::from(be32(60)),
            rendering_intent: RenderingIntent::from_u32(be32(64))?,
            illuminant: XyzNumber::from_bytes(&data[68..80]).unwrap_or_default(),
            creator: be32(80),
        })
    }

    /// Check that the declared size matches the data exactly
    pub fn validate(&self, data_len: usize) -> Result<(), IccError> {
        if self.size as usize != data_len {
            return Err(IccError::SizeMismatch {
                header_size: self.size,
                actual_size: data_len,
            });
        }
        Ok(())
    }

    /// Check if this describes a matrix/TRC capable RGB profile
    pub fn is_matrix_shaper(&self) -> bool {
        matches!(
            self.device_class,
            ProfileClass::Display | ProfileClass::Input | ProfileClass::Output
        ) && self.color_space == ColorSpace::Rgb
    }
}

/// major.minor.bugfix, packed as major byte then minor/bugfix nibbles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileVersion {
    pub major: u8,
    pub minor: u8,
    pub bugfix: u8,
}

impl ProfileVersion {
    /// Version 2.1.0, encoded as 0x02100000
    pub const V2_1: Self = Self {
        major: 2,
        minor: 1,
        bugfix: 0,
    };

    pub fn from_u32(raw: u32) -> Self {
        let [major, minor_bugfix, _, _] = raw.to_be_bytes();
        Self {
            major,
            minor: minor_bugfix >> 4,
            bugfix: minor_bugfix & 0x0F,
        }
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes([self.major, (self.minor << 4) | (self.bugfix & 0x0F), 0, 0])
    }
}

/// Device class. Only the classes that can carry a matrix/TRC RGB model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    /// 'scnr': scanners and cameras
    Input,
    /// 'mntr': what we write
    Display,
    /// 'prtr'
    Output,
}

impl ProfileClass {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match &val.to_be_bytes() {
            b"scnr" => Ok(Self::Input),
            b"mntr" => Ok(Self::Display),
            b"prtr" => Ok(Self::Output),
            _ => Err(IccError::InvalidProfileClass(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(match self {
            Self::Input => *b"scnr",
            Self::Display => *b"mntr",
            Self::Output => *b"prtr",
        })
    }
}

/// Data color space or PCS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Xyz,
    Lab,
    Rgb,
}

impl ColorSpace {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match &val.to_be_bytes() {
            b"XYZ " => Ok(Self::Xyz),
            b"Lab " => Ok(Self::Lab),
            b"RGB " => Ok(Self::Rgb),
            _ => Err(IccError::InvalidColorSpace(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(match self {
            Self::Xyz => *b"XYZ ",
            Self::Lab => *b"Lab ",
            Self::Rgb => *b"RGB ",
        })
    }
}

/// ICC Rendering Intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match val {
            0 => Ok(Self::Perceptual),
            1 => Ok(Self::RelativeColorimetric),
            2 => Ok(Self::Saturation),
            3 => Ok(Self::AbsoluteColorimetric),
            _ => Err(IccError::InvalidRenderingIntent(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Perceptual => 0,
            Self::RelativeColorimetric => 1,
            Self::Saturation => 2,
            Self::AbsoluteColorimetric => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> IccHeader {
        IccHeader::display_rgb(DateTimeNumber {
            year: 2024,
            month: 1,
            day: 2,
            hour: 3,
            minute: 4,
            second: 5,
        })
    }

    #[test]
    fn test_version_encoding() {
        assert_eq!(ProfileVersion::V2_1.to_u32(), 0x0210_0000);
        assert_eq!(ProfileVersion::from_u32(0x0210_0000), ProfileVersion::V2_1);
    }

    #[test]
    fn test_display_header_layout() {
        let bytes = sample_header().to_bytes();

        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..8], b"lcms");
        assert_eq!(&bytes[8..12], &[0x02, 0x10, 0x00, 0x00]);
        assert_eq!(&bytes[12..16], b"mntr");
        assert_eq!(&bytes[16..20], b"RGB ");
        assert_eq!(&bytes[20..24], b"XYZ ");
        assert_eq!(&bytes[24..26], &2024u16.to_be_bytes());
        assert_eq!(&bytes[36..40], b"acsp");
        assert_eq!(&bytes[40..44], b"APPL");
        assert_eq!(&bytes[44..48], &[0; 4]);
        assert_eq!(&bytes[56..68], &[0; 12]);
        // D50 illuminant, Y = 1.0
        assert_eq!(&bytes[72..76], &[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(&bytes[80..84], b"ccal");
        assert!(bytes[84..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_header_parse_back() {
        let mut header = sample_header();
        header.size = 128;
        let parsed = IccHeader::parse(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.is_matrix_shaper());
        assert!(parsed.validate(128).is_ok());
        assert!(parsed.validate(132).is_err());
    }

    #[test]
    fn test_bad_signature() {
        let mut bytes = sample_header().to_bytes();
        bytes[36..40].copy_from_slice(b"xxxx");
        assert!(matches!(
            IccHeader::parse(&bytes),
            Err(IccError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_profile_class_roundtrip() {
        for class in [ProfileClass::Input, ProfileClass::Display, ProfileClass::Output] {
            assert_eq!(ProfileClass::from_u32(class.to_u32()).unwrap(), class);
        }
        assert!(matches!(
            ProfileClass::from_u32(u32::from_be_bytes(*b"link")),
            Err(IccError::InvalidProfileClass(_))
        ));
    }

    #[test]
    fn test_rendering_intent() {
        for i in 0..4 {
            assert_eq!(RenderingIntent::from_u32(i).unwrap().to_u32(), i);
        }
        assert!(RenderingIntent::from_u32(4).is_err());
    }
}
