//! Text Tag Types
//!
//! Version 2 profiles carry text in two formats:
//! - text: NUL-terminated ASCII (copyright)
//! - desc: textDescriptionType (profile description)

use crate::icc::error::IccError;
use crate::icc::types::TypeSignature;

/// Bytes following the ASCII part of a `desc` tag: Unicode language code (4),
/// Unicode count (4), ScriptCode code (2), ScriptCode count (1), ScriptCode
/// buffer (67). All zero when only ASCII is provided.
pub const DESC_TRAILER_LEN: usize = 4 + 4 + 2 + 1 + 67;

/// Text tag data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    pub text: String,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Parse 'text' type (simple ASCII)
    pub fn parse_text(data: &[u8]) -> Result<Self, IccError> {
        Ok(Self::new(ascii_until_nul(data)))
    }

    /// Parse 'desc' type (v2 profile description)
    pub fn parse_desc(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 4 {
            return Err(IccError::CorruptedData(
                "Description tag too small".to_string(),
            ));
        }

        // ASCII count includes the terminating NUL
        let ascii_count = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let ascii = data.get(4..4 + ascii_count).ok_or_else(|| {
            IccError::CorruptedData("Description ASCII data truncated".to_string())
        })?;

        Ok(Self::new(ascii_until_nul(ascii)))
    }

    /// Encode as `text` type: signature, reserved, ASCII, NUL
    pub fn encode_text(&self) -> Vec<u8> {
        let ascii = to_ascii(&self.text);
        let mut out = Vec::with_capacity(8 + ascii.len() + 1);
        out.extend_from_slice(&TypeSignature::TEXT.to_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&ascii);
        out.push(0);
        out
    }

    /// Encode as `desc` type: ASCII part followed by empty Unicode and
    /// ScriptCode sections
    pub fn encode_desc(&self) -> Vec<u8> {
        let ascii = to_ascii(&self.text);
        let count = ascii.len() as u32 + 1;
        let mut out = Vec::with_capacity(12 + ascii.len() + 1 + DESC_TRAILER_LEN);
        out.extend_from_slice(&TypeSignature::DESC.to_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(&ascii);
        out.push(0);
        out.extend_from_slice(&[0u8; DESC_TRAILER_LEN]);
        out
    }
}

fn ascii_until_nul(data: &[u8]) -> String {
    data.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Replace anything outside printable 7-bit ASCII with '?'
fn to_ascii(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text() {
        let bytes = TextData::new("No copyright").encode_text();
        assert_eq!(&bytes[0..4], b"text");
        assert_eq!(bytes.len(), 8 + 12 + 1);
        assert_eq!(*bytes.last().unwrap(), 0);
        assert_eq!(TextData::parse_text(&bytes[8..]).unwrap().text, "No copyright");
    }

    #[test]
    fn test_encode_desc() {
        let bytes = TextData::new("Living Room").encode_desc();
        assert_eq!(&bytes[0..4], b"desc");
        assert_eq!(&bytes[8..12], &12u32.to_be_bytes());
        assert_eq!(bytes.len(), 12 + 12 + DESC_TRAILER_LEN);
        assert!(bytes[24..].iter().all(|&b| b == 0));
        assert_eq!(TextData::parse_desc(&bytes[8..]).unwrap().text, "Living Room");
    }

    #[test]
    fn test_non_ascii_replaced() {
        let bytes = TextData::new("Café").encode_text();
        assert_eq!(&bytes[8..13], b"Caf?\0");
    }

    #[test]
    fn test_truncated_desc() {
        let data = [0, 0, 0, 50, b'a', b'b'];
        assert!(TextData::parse_desc(&data).is_err());
    }
}
