//! ICC Profile Parser
//!
//! Reads back profiles produced by [`super::ProfileWriter`] (or any v2
//! matrix/TRC profile) so callers can inspect what was written.
//!
//! ```ignore
//! let profile = IccProfile::parse(&bytes)?;
//! println!("Profile: {:?}", profile.description());
//! ```

use std::collections::HashMap;

use super::error::IccError;
use super::header::{HEADER_SIZE, IccHeader};
use super::tags::TagData;
use super::types::TagSignature;
use super::writer::TAG_ENTRY_SIZE;
use crate::color::Xyz;

/// Tag table entry as stored in the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTableEntry {
    pub signature: TagSignature,
    /// Offset from start of profile
    pub offset: u32,
    /// Length of the tag data, excluding padding
    pub size: u32,
}

/// An ICC profile parsed from bytes
#[derive(Debug, Clone)]
pub struct IccProfile {
    pub header: IccHeader,
    /// Tag table in file order
    pub entries: Vec<TagTableEntry>,
    tags: HashMap<TagSignature, TagData>,
}

impl IccProfile {
    /// Parse an ICC profile from bytes
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        let header = IccHeader::parse(data)?;
        header.validate(data.len())?;

        let entries = Self::parse_tag_table(data)?;
        let mut tags = HashMap::with_capacity(entries.len());

        for entry in &entries {
            let start = entry.offset as usize;
            let end = start + entry.size as usize;
            if end > data.len() || start < HEADER_SIZE {
                return Err(IccError::TagOutOfBounds {
                    tag: entry.signature.0,
                    offset: entry.offset,
                    size: entry.size,
                    profile_size: data.len(),
                });
            }
            if entry.offset % 4 != 0 {
                return Err(IccError::MisalignedTag {
                    tag: entry.signature.0,
                    offset: entry.offset,
                });
            }

            tags.insert(entry.signature, TagData::parse(&data[start..end])?);
        }

        Ok(Self {
            header,
            entries,
            tags,
        })
    }

    fn parse_tag_table(data: &[u8]) -> Result<Vec<TagTableEntry>, IccError> {
        let be32 = |i: usize| u32::from_be_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);

        if data.len() < HEADER_SIZE + 4 {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE + 4,
                actual: data.len(),
            });
        }

        let count = be32(HEADER_SIZE) as usize;
        let table_start = HEADER_SIZE + 4;
        let required = count
            .checked_mul(TAG_ENTRY_SIZE)
            .and_then(|n| n.checked_add(table_start))
            .ok_or_else(|| IccError::CorruptedData(format!("tag count {count} overflows")))?;
        if data.len() < required {
            return Err(IccError::TooSmall {
                expected: required,
                actual: data.len(),
            });
        }

        Ok((0..count)
            .map(|i| {
                let at = table_start + i * TAG_ENTRY_SIZE;
                TagTableEntry {
                    signature: TagSignature(be32(at)),
                    offset: be32(at + 4),
                    size: be32(at + 8),
                }
            })
            .collect())
    }

    /// Get a tag by signature
    pub fn get_tag(&self, sig: TagSignature) -> Option<&TagData> {
        self.tags.get(&sig)
    }

    /// Table entry for a signature
    pub fn entry(&self, sig: TagSignature) -> Option<&TagTableEntry> {
        self.entries.iter().find(|e| e.signature == sig)
    }

    pub fn description(&self) -> Option<&str> {
        self.text_tag(TagSignature::PROFILE_DESC)
    }

    pub fn copyright(&self) -> Option<&str> {
        self.text_tag(TagSignature::COPYRIGHT)
    }

    fn text_tag(&self, sig: TagSignature) -> Option<&str> {
        self.get_tag(sig)
            .and_then(|t| t.as_text())
            .map(|t| t.text.as_str())
    }

    fn xyz_tag(&self, sig: TagSignature) -> Option<Xyz> {
        self.get_tag(sig)
            .and_then(|t| t.as_xyz())
            .and_then(|xyz| xyz.to_xyz())
    }

    pub fn media_white_point(&self) -> Option<Xyz> {
        self.xyz_tag(TagSignature::MEDIA_WHITE)
    }

    /// Red, green and blue colorants, if all three are present
    pub fn colorants(&self) -> Option<[Xyz; 3]> {
        Some([
            self.xyz_tag(TagSignature::RED_COLORANT)?,
            self.xyz_tag(TagSignature::GREEN_COLORANT)?,
            self.xyz_tag(TagSignature::BLUE_COLORANT)?,
        ])
    }

    /// Gamma of each channel TRC, if all three are simple gamma curves
    pub fn trc_gammas(&self) -> Option<[f64; 3]> {
        let gamma = |sig| self.get_tag(sig)?.as_curve()?.gamma_value();
        Some([
            gamma(TagSignature::RED_TRC)?,
            gamma(TagSignature::GREEN_TRC)?,
            gamma(TagSignature::BLUE_TRC)?,
        ])
    }

    pub fn is_matrix_shaper(&self) -> bool {
        self.header.is_matrix_shaper() && self.colorants().is_some() && self.trc_gammas().is_some()
    }
}
