use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    /// Canonical text and recognized stream are too dissimilar to align.
    #[error("recognized text does not match the lyrics (ratio {ratio:.3} < {min_ratio:.3})")]
    RecognitionMismatch { ratio: f64, min_ratio: f64 },
    #[error("invalid alignment config: {message}")]
    InvalidConfig { message: String },
}

impl AlignError {
    pub(crate) fn mismatch(ratio: f64, min_ratio: f64) -> Self {
        Self::RecognitionMismatch { ratio, min_ratio }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = AlignError::mismatch(0.05, 0.1);
        assert_eq!(
            err.to_string(),
            "recognized text does not match the lyrics (ratio 0.050 < 0.100)"
        );
    }

    #[test]
    fn test_invalid_config_message() {
        let err = AlignError::invalid_config("empty window");
        assert_eq!(err.to_string(), "invalid alignment config: empty window");
    }
}
