//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Every fatal condition of the metadata phase (image/timestamp count mismatch,
//! unparsable timestamps, unknown sort mode, empty candidate list) has its own
//! variant so callers can match on it before any output is written.
use thiserror::Error;

use crate::types::Modality;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("There are {images} input {modality} images but {timestamps} {modality} timestamps")]
    ImageCountMismatch {
        modality: Modality,
        images: usize,
        timestamps: usize,
    },

    #[error("Cannot parse timestamp '{value}': expected a number of seconds")]
    InvalidTimestamp { value: String },

    #[error("Sorting mode 'abs' requires a reference timestamp")]
    MissingReferenceTimestamp,

    #[error("Unknown sorting mode: '{value}' (expected asc, des or abs)")]
    UnknownSortMode { value: String },

    #[error(
        "No SAR/optical pairs found within a maximum gap of {max_gap} seconds. \
         Try to increase the maximum gap and/or double check the timestamps of your time series"
    )]
    NoPairsFound { max_gap: f64 },

    #[error("The {modality} image list is empty")]
    EmptyImageList { modality: Modality },

    #[error("{modality} image #{index} has {found} bands, expected {expected}")]
    BandCountMismatch {
        modality: Modality,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("{modality} image #{index} is {found_x}x{found_y}, expected {expected_x}x{expected_y}")]
    DimensionMismatch {
        modality: Modality,
        index: usize,
        expected_x: usize,
        expected_y: usize,
        found_x: usize,
        found_y: usize,
    },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Run cancelled before completion, no output was written")]
    Cancelled,

    #[error("Processing error: {0}")]
    Processing(String),
}

impl Error {
    /// True for errors caused by the inputs or configuration of a run, as
    /// opposed to I/O failures while streaming.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ImageCountMismatch { .. }
                | Error::InvalidTimestamp { .. }
                | Error::MissingReferenceTimestamp
                | Error::UnknownSortMode { .. }
                | Error::NoPairsFound { .. }
                | Error::EmptyImageList { .. }
                | Error::BandCountMismatch { .. }
                | Error::DimensionMismatch { .. }
                | Error::InvalidArgument { .. }
        )
    }
}
