//! Shared types and enums used across SARPAIR.
//! Includes the `SortMode` selector, the `Modality` tag and the `IndexPair`
//! association between a SAR and an optical image.
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How optical acquisitions are ordered before pairs are enumerated
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SortMode {
    /// Ascending chronological order
    Asc,
    /// Descending chronological order
    Des,
    /// Ascending absolute gap to a reference timestamp
    Abs,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::Asc => write!(f, "asc"),
            SortMode::Des => write!(f, "des"),
            SortMode::Abs => write!(f, "abs"),
        }
    }
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortMode::Asc),
            "des" => Ok(SortMode::Des),
            "abs" => Ok(SortMode::Abs),
            _ => Err(Error::UnknownSortMode {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SortMode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Modality {
    Sar,
    Optical,
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modality::Sar => write!(f, "SAR"),
            Modality::Optical => write!(f, "optical"),
        }
    }
}

/// A (SAR, optical) image association.
///
/// Indices refer to positions in the input image lists during candidate
/// generation, and to positions in the compacted stacks after deduplication.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct IndexPair {
    pub sar: usize,
    pub optical: usize,
}

impl IndexPair {
    pub fn new(sar: usize, optical: usize) -> Self {
        Self { sar, optical }
    }
}

impl std::fmt::Display for IndexPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(SAR #{}, optical #{})", self.sar, self.optical)
    }
}
