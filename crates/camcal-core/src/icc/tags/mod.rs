//! ICC Profile Tag Types
//!
//! Each tag body starts with a 4-byte type signature and 4 reserved bytes,
//! followed by type-specific data. Only the types a matrix/TRC monitor
//! profile needs are understood; anything else is kept raw.

mod curves;
mod text;
mod xyz;

pub use curves::CurveData;
pub use text::{DESC_TRAILER_LEN, TextData};
pub use xyz::XyzTagData;

use super::error::IccError;
use super::types::TypeSignature;

/// Parsed tag data
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    /// XYZ type data (colorants, white point)
    Xyz(XyzTagData),
    /// Curve type (TRC)
    Curve(CurveData),
    /// Text or description
    Text(TextData),
    /// Unknown/unsupported tag type
    Unknown { type_sig: u32, data: Vec<u8> },
}

impl TagData {
    /// Parse a full tag body (starting at the type signature)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 8 {
            return Err(IccError::CorruptedData(
                "Tag data too small for header".to_string(),
            ));
        }

        let type_sig = TypeSignature(u32::from_be_bytes([data[0], data[1], data[2], data[3]]));
        let type_data = &data[8..];

        match type_sig {
            TypeSignature::XYZ => XyzTagData::parse(type_data).map(TagData::Xyz),
            TypeSignature::CURVE => CurveData::parse(type_data).map(TagData::Curve),
            TypeSignature::TEXT => TextData::parse_text(type_data).map(TagData::Text),
            TypeSignature::DESC => TextData::parse_desc(type_data).map(TagData::Text),
            _ => Ok(TagData::Unknown {
                type_sig: type_sig.0,
                data: data.to_vec(),
            }),
        }
    }

    pub fn as_xyz(&self) -> Option<&XyzTagData> {
        match self {
            TagData::Xyz(xyz) => Some(xyz),
            _ => None,
        }
    }

    pub fn as_curve(&self) -> Option<&CurveData> {
        match self {
            TagData::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match self {
            TagData::Text(text) => Some(text),
            _ => None,
        }
    }
}
