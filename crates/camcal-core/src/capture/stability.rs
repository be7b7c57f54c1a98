//! Stability Detector
//!
//! Keeps a bounded window of recent samples and reports whether the camera
//! reading has converged: the largest per-channel spread over the window must
//! stay below a threshold.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::color::Rgb8;
use crate::error::{Error, Result};

/// Number of recent samples kept
pub const DEFAULT_WINDOW: usize = 10;
/// Samples required before stability can be reported
pub const DEFAULT_MIN_SAMPLES: usize = 5;
/// Maximum channel spread (exclusive) still considered stable
pub const DEFAULT_THRESHOLD: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub window: usize,
    pub min_samples: usize,
    pub threshold: u8,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            min_samples: DEFAULT_MIN_SAMPLES,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl StabilityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::invalid_parameter("stability.window", self.window));
        }
        if self.min_samples == 0 || self.min_samples > self.window {
            return Err(Error::invalid_parameter(
                "stability.min_samples",
                format!("{} (window {})", self.min_samples, self.window),
            ));
        }
        Ok(())
    }
}

/// Fixed-capacity FIFO of recent samples
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<Rgb8>,
    capacity: usize,
}

impl SampleHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, dropping the oldest sample when full
    pub fn push(&mut self, sample: Rgb8) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Largest per-channel max−min over the history
    pub fn spread(&self) -> Option<u8> {
        let first = self.samples.front()?;
        let mut lo = first.to_array();
        let mut hi = lo;
        for s in self.samples.iter().skip(1) {
            for (i, v) in s.to_array().into_iter().enumerate() {
                lo[i] = lo[i].min(v);
                hi[i] = hi[i].max(v);
            }
        }
        (0..3).map(|i| hi[i] - lo[i]).max()
    }

    pub fn latest(&self) -> Option<Rgb8> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb8> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug, Clone)]
pub struct StabilityDetector {
    config: StabilityConfig,
    history: SampleHistory,
    stable: bool,
}

impl StabilityDetector {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            history: SampleHistory::with_capacity(config.window),
            config,
            stable: false,
        })
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Record a sample and return the updated stability flag
    pub fn push(&mut self, sample: Rgb8) -> bool {
        self.history.push(sample);
        self.stable = self
            .instability()
            .is_some_and(|spread| spread < self.config.threshold);
        self.stable
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    /// Current spread metric, `None` until `min_samples` have been seen
    pub fn instability(&self) -> Option<u8> {
        if self.history.len() < self.config.min_samples {
            return None;
        }
        self.history.spread()
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drop all history. Only done when the session tears down.
    pub fn clear(&mut self) {
        self.history.clear();
        self.stable = false;
    }
}

impl Default for StabilityDetector {
    fn default() -> Self {
        let config = StabilityConfig::default();
        Self {
            history: SampleHistory::with_capacity(config.window),
            config,
            stable: false,
        }
    }
}
