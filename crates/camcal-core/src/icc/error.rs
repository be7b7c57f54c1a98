//! Errors from reading a profile back

use std::fmt;

use super::types::TagSignature;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IccError {
    /// Fewer bytes than the header and tag count need
    TooSmall { expected: usize, actual: usize },
    /// Bytes 36..40 are not 'acsp'
    InvalidSignature(u32),
    /// Header size field disagrees with the buffer
    SizeMismatch { header_size: u32, actual_size: usize },
    TagOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        profile_size: usize,
    },
    MisalignedTag { tag: u32, offset: u32 },
    InvalidColorSpace(u32),
    InvalidProfileClass(u32),
    InvalidRenderingIntent(u32),
    /// A tag body that does not match its type
    CorruptedData(String),
}

impl fmt::Display for IccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = |v: u32| TagSignature(v).to_string();
        match self {
            Self::TooSmall { expected, actual } => {
                write!(f, "profile truncated: need {expected} bytes, have {actual}")
            }
            Self::InvalidSignature(s) => write!(f, "not an ICC profile (signature 0x{s:08X})"),
            Self::SizeMismatch {
                header_size,
                actual_size,
            } => write!(
                f,
                "header declares {header_size} bytes but buffer holds {actual_size}"
            ),
            Self::TagOutOfBounds {
                tag,
                offset,
                size,
                profile_size,
            } => write!(
                f,
                "tag '{}' spans {offset}..{} past end of {profile_size}-byte profile",
                sig(*tag),
                u64::from(*offset) + u64::from(*size)
            ),
            Self::MisalignedTag { tag, offset } => {
                write!(f, "tag '{}' starts at unaligned offset {offset}", sig(*tag))
            }
            Self::InvalidColorSpace(cs) => write!(f, "unexpected color space '{}'", sig(*cs)),
            Self::InvalidProfileClass(class) => {
                write!(f, "unexpected device class '{}'", sig(*class))
            }
            Self::InvalidRenderingIntent(intent) => write!(f, "unknown rendering intent {intent}"),
            Self::CorruptedData(msg) => write!(f, "malformed tag data: {msg}"),
        }
    }
}

impl std::error::Error for IccError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_tag() {
        let err = IccError::MisalignedTag {
            tag: TagSignature::RED_TRC.0,
            offset: 301,
        };
        assert_eq!(err.to_string(), "tag 'rTRC' starts at unaligned offset 301");

        let err = IccError::TagOutOfBounds {
            tag: TagSignature::PROFILE_DESC.0,
            offset: 400,
            size: 100,
            profile_size: 450,
        };
        assert!(err.to_string().contains("400..500"));
    }
}
