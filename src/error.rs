//! This module defines the single, unified error type for the entire lanepack
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LanepackError {
    // =========================================================================
    // === Usage Errors (caller handed us something the codec cannot accept)
    // =========================================================================
    #[error("input length {len} is not a multiple of the codec block size {block_size}")]
    InputLength { block_size: usize, len: usize },

    #[error("negative value at index {index}; only non-negative integers can be encoded")]
    NegativeValue { index: usize },

    // =========================================================================
    // === Data Errors (the compressed buffer cannot be trusted)
    // =========================================================================
    /// Truncated or corrupt compressed data. Also raised when an output buffer
    /// is too small for the count a buffer declares, and when a decode does not
    /// consume exactly the bytes it was given.
    #[error("truncated or corrupt compressed data: {0}")]
    Corrupt(String),
}

impl LanepackError {
    /// Shorthand used by the decode paths.
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        LanepackError::Corrupt(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_numbers() {
        let err = LanepackError::InputLength {
            block_size: 128,
            len: 130,
        };
        assert!(err.to_string().contains("128"));
        assert!(err.to_string().contains("130"));

        let err = LanepackError::NegativeValue { index: 7 };
        assert!(err.to_string().contains('7'));
    }
}
