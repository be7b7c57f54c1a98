//! Frame Sampler
//!
//! Reduces each frame to one color: the unweighted mean of a square patch at
//! the geometric center. The patch is clipped when the frame is smaller.

use log::trace;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::frame::Frame;
use crate::color::Rgb8;
use crate::error::{Error, Result};
use crate::simd::sum_rgba_region;

/// Side length of the sampled patch in pixels
pub const DEFAULT_PATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub patch_size: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            patch_size: DEFAULT_PATCH_SIZE,
        }
    }
}

/// Pixel rectangle inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PatchRegion {
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, Clone)]
pub struct FrameSampler {
    patch_size: usize,
}

impl FrameSampler {
    pub fn new(patch_size: usize) -> Result<Self> {
        if patch_size == 0 {
            return Err(Error::invalid_parameter("patch_size", patch_size));
        }
        Ok(Self { patch_size })
    }

    pub fn from_config(config: &SamplerConfig) -> Result<Self> {
        Self::new(config.patch_size)
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    /// Centered patch for a frame of the given size, clipped to the frame
    pub fn patch_region(&self, width: usize, height: usize) -> PatchRegion {
        let pw = self.patch_size.min(width);
        let ph = self.patch_size.min(height);
        PatchRegion {
            x: (width - pw) / 2,
            y: (height - ph) / 2,
            width: pw,
            height: ph,
        }
    }

    /// Mean color of the center patch, rounded per channel. `None` for an empty frame.
    pub fn sample(&self, frame: &Frame) -> Option<Rgb8> {
        if frame.is_empty() {
            return None;
        }

        let region = self.patch_region(frame.width(), frame.height());
        let sums = sum_rgba_region(
            frame.data(),
            frame.width(),
            region.x,
            region.y,
            region.width,
            region.height,
        );

        let n = region.area() as f64;
        Some(Rgb8::from_f64_channels(
            sums[0] as f64 / n,
            sums[1] as f64 / n,
            sums[2] as f64 / n,
        ))
    }

    /// Read the camera's current frame and sample it. A source that has no
    /// frame yet is skipped silently; the next tick retries.
    pub async fn poll(&self, camera: &mut dyn Camera) -> Option<Rgb8> {
        let Some(frame) = camera.current_frame().await else {
            trace!("{}: no frame available yet", camera.label());
            return None;
        };
        self.sample(&frame)
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self {
            patch_size: DEFAULT_PATCH_SIZE,
        }
    }
}
