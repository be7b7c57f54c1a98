//! Curve Tag Type
//!
//! The `curv` type holds a tone reproduction curve: identity (count 0),
//! a simple gamma stored as u8Fixed8 (count 1), or a u16 lookup table.

use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, U8Fixed8};

/// Curve tag data (curv type)
#[derive(Debug, Clone, PartialEq)]
pub enum CurveData {
    /// Identity curve (count = 0)
    Identity,
    /// Simple gamma (count = 1)
    Gamma(U8Fixed8),
    /// Lookup table (count > 1)
    Table(Vec<u16>),
}

impl CurveData {
    pub fn gamma(gamma: f64) -> Self {
        CurveData::Gamma(U8Fixed8::from_f64(gamma))
    }

    /// Parse curve data from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 4 {
            return Err(IccError::CorruptedData("Curve tag too small".to_string()));
        }

        let count = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let entries = data.get(4..4 + count * 2).ok_or_else(|| {
            IccError::CorruptedData(format!(
                "Curve table too small: need {} bytes, have {}",
                4 + count * 2,
                data.len()
            ))
        })?;

        Ok(match count {
            0 => CurveData::Identity,
            1 => CurveData::Gamma(U8Fixed8::from_be_bytes([entries[0], entries[1]])),
            _ => CurveData::Table(
                entries
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect(),
            ),
        })
    }

    /// Full tag body: type signature, reserved word, count, entries
    pub fn encode(&self) -> Vec<u8> {
        let entries: Vec<[u8; 2]> = match self {
            CurveData::Identity => Vec::new(),
            CurveData::Gamma(g) => vec![g.to_be_bytes()],
            CurveData::Table(table) => table.iter().map(|v| v.to_be_bytes()).collect(),
        };

        let mut out = Vec::with_capacity(12 + entries.len() * 2);
        out.extend_from_slice(&TypeSignature::CURVE.to_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        for entry in entries {
            out.extend_from_slice(&entry);
        }
        out
    }

    /// Gamma exponent if this is a simple gamma curve
    pub fn gamma_value(&self) -> Option<f64> {
        match self {
            CurveData::Gamma(g) => Some(g.to_f64()),
            _ => None,
        }
    }
}
