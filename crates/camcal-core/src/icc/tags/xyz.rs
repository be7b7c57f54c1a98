//! XYZ Tag Type
//!
//! The XYZType contains an array of XYZ values. Used for colorant tags and
//! the media white point.

use crate::color::Xyz;
use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, XyzNumber};

/// XYZ tag data - contains one or more XYZ values
#[derive(Debug, Clone, PartialEq)]
pub struct XyzTagData {
    pub values: Vec<XyzNumber>,
}

impl XyzTagData {
    pub fn single(xyz: Xyz) -> Self {
        Self {
            values: vec![XyzNumber::from_xyz(xyz)],
        }
    }

    /// Parse XYZ data from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < XyzNumber::SIZE {
            return Err(IccError::CorruptedData("XYZ tag too small".to_string()));
        }

        let values = data
            .chunks_exact(XyzNumber::SIZE)
            .filter_map(XyzNumber::from_bytes)
            .collect();

        Ok(Self { values })
    }

    /// Full tag body: type signature, reserved word, XYZ numbers
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.values.len() * XyzNumber::SIZE);
        out.extend_from_slice(&TypeSignature::XYZ.to_bytes());
        out.extend_from_slice(&[0u8; 4]);
        for value in &self.values {
            out.extend_from_slice(&value.to_bytes());
        }
        out
    }

    /// Get the first XYZ value as Xyz color type
    pub fn to_xyz(&self) -> Option<Xyz> {
        self.values.first().map(|v| v.to_xyz())
    }
}
