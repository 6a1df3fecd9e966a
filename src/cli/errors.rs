use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("{arg} must be given together with {other}")]
    IncompleteArguments { arg: String, other: String },

    #[error(transparent)]
    Pairing(#[from] sarpair::Error),

    #[error("Cannot render summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// 2 for bad arguments or inputs, 1 for failures while running
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MissingArgument { .. } | AppError::IncompleteArguments { .. } => 2,
            AppError::Pairing(e) if e.is_configuration() => 2,
            AppError::Pairing(_) | AppError::Json(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarpair::Modality;

    #[test]
    fn configuration_errors_exit_with_two() {
        let missing = AppError::MissingArgument {
            arg: "--out-dir".to_string(),
        };
        assert_eq!(missing.exit_code(), 2);
        let no_pairs = AppError::from(sarpair::Error::NoPairsFound { max_gap: 5.0 });
        assert_eq!(no_pairs.exit_code(), 2);
        let empty = AppError::from(sarpair::Error::EmptyImageList {
            modality: Modality::Sar,
        });
        assert_eq!(empty.exit_code(), 2);
    }

    #[test]
    fn runtime_failures_exit_with_one() {
        assert_eq!(AppError::from(sarpair::Error::Cancelled).exit_code(), 1);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(AppError::from(sarpair::Error::Io(io)).exit_code(), 1);
    }
}
