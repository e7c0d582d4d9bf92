//! Error types for carrier loading and decoding.

use thiserror::Error;

/// Errors surfaced by the decode engine.
///
/// Recoverable conditions (malformed metadata JSON, missing adaptive
/// strategy info, a first strategy failure under adaptive mode) are handled
/// internally and never appear here.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The carrier file could not be read or decoded.
    #[error("failed to load carrier image: {0}")]
    Load(String),

    /// `params.mode` is not one of the five recognized modes.
    #[error("unrecognized steganography mode")]
    UnknownMode,

    /// A decode entry point was called before any carrier was loaded.
    #[error("no carrier image loaded")]
    NoCarrier,

    /// The carrier's sample buffer does not match its stated dimensions.
    #[error("sample buffer size mismatch: expected {expected}, got {actual}")]
    BufferShape {
        /// Sample count implied by width, height, and layout.
        expected: usize,
        /// Actual sample count.
        actual: usize,
    },

    /// A strategy failed and the one-shot fallback failed too.
    #[error("strategy decode failed: {0}")]
    Strategy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::Load("bad magic".to_string());
        assert_eq!(err.to_string(), "failed to load carrier image: bad magic");

        let err = DecodeError::BufferShape {
            expected: 12,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "sample buffer size mismatch: expected 12, got 7"
        );
    }
}
