//! Packed RGBA8 video frames

use crate::color::Rgb8;
use crate::error::{Error, Result};

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// One video frame as packed row-major RGBA8, the layout of a canvas readback.
/// Alpha is carried but never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an RGBA buffer, checking that it holds exactly `width * height` pixels
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| Error::invalid_parameter("frame_size", format!("{width}x{height}")))?;
        if data.len() != expected {
            return Err(Error::invalid_parameter(
                "frame_data",
                format!("{} bytes for {width}x{height} (expected {expected})", data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame filled with a single opaque color
    pub fn solid(width: usize, height: usize, color: Rgb8) -> Self {
        let data = [color.r, color.g, color.b, 255].repeat(width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Color at `(x, y)`, or `None` outside the frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        Some(Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Overwrite one pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        self.data[i..i + 3].copy_from_slice(&color.to_array());
    }
}
