use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::pairing::DEFAULT_MAX_GAP;
use crate::error::{Error, Result};
use crate::types::SortMode;

/// Pairing parameters suitable for config files (JSON presets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingParams {
    pub sorting: SortMode,
    /// Reference timestamp for `SortMode::Abs`, parsed like acquisition timestamps
    pub reference_timestamp: Option<String>,
    /// Maximum SAR/optical gap in seconds (inclusive)
    pub max_gap: f64,
    pub sar_nodata: f32,
    pub optical_nodata: f32,
    /// Number of (SAR, optical) output pairs
    pub outputs: usize,
    /// Rows per streamed strip
    pub strip_height: usize,
}

impl Default for PairingParams {
    fn default() -> Self {
        Self {
            sorting: SortMode::Asc,
            reference_timestamp: None,
            max_gap: DEFAULT_MAX_GAP,
            sar_nodata: 0.0,
            optical_nodata: -10000.0,
            outputs: 1,
            strip_height: 256,
        }
    }
}

impl PairingParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: PairingParams = serde_json::from_str(&text)?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.outputs == 0 {
            return Err(Error::InvalidArgument {
                arg: "outputs",
                value: self.outputs.to_string(),
            });
        }
        if !self.max_gap.is_finite() || self.max_gap < 0.0 {
            return Err(Error::InvalidArgument {
                arg: "max_gap",
                value: self.max_gap.to_string(),
            });
        }
        if self.strip_height == 0 {
            return Err(Error::InvalidArgument {
                arg: "strip_height",
                value: self.strip_height.to_string(),
            });
        }
        Ok(())
    }
}
