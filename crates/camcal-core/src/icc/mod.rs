//! ICC Profile Encoding and Read-Back
//!
//! Enough of ICC.1:2001-04 (v2.1) to write an RGB display profile with
//! matrix/TRC tags and to parse it back for inspection.
//!
//! # Structure
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table listing all tags
//! 3. Tag data (may be shared between table entries)

pub mod error;
pub mod header;
pub mod parser;
pub mod tags;
pub mod types;
pub mod writer;

pub use error::IccError;
pub use header::{ColorSpace, IccHeader, ProfileClass, ProfileVersion, RenderingIntent};
pub use parser::{IccProfile, TagTableEntry};
pub use tags::{CurveData, TagData, TextData, XyzTagData};
pub use types::{DateTimeNumber, S15Fixed16, TagSignature, TypeSignature, U8Fixed8, XyzNumber};
pub use writer::ProfileWriter;
