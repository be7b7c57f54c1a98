//! Configuration for a calibration run
//!
//! All tunables live in one serde-backed structure that can be loaded from or
//! saved to JSON. Missing sections fall back to their defaults.
//!
//! ```no_run
//! use camcal_core::CamcalConfig;
//! use std::path::Path;
//!
//! let config = CamcalConfig::from_json_file(Path::new("camcal.json"))?;
//! # Ok::<(), camcal_core::Error>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`SessionConfig`]: sampler patch, stability window, lock negotiation, tick cadence
//! - [`AnalysisSettings`]: target gamma and white point handed to the oracle
//! - `targets`: the ordered patch list

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisSettings;
use crate::error::{Error, Result};
use crate::session::{SessionConfig, TargetPatch, default_targets};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CamcalConfig {
    pub session: SessionConfig,

    pub analysis: AnalysisSettings,

    /// Patches measured in order
    pub targets: Vec<TargetPatch>,

    /// Where encoded profiles are written
    pub output_dir: Option<PathBuf>,
}

impl Default for CamcalConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            analysis: AnalysisSettings::default(),
            targets: default_targets(),
            output_dir: None,
        }
    }
}

impl CamcalConfig {
    /// Load configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::Config("target list is empty".to_string()));
        }
        self.session
            .validate()
            .and_then(|()| self.analysis.validate())
            .map_err(|e| Error::Config(e.to_string()))
    }
}
