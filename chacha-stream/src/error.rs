//! Error types.

use core::fmt;

/// Errors returned by the slice-based constructors and the fallible
/// processing entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Key is not exactly 32 bytes long
    InvalidKeyLength {
        /// Length of the rejected key
        len: usize,
    },
    /// Nonce length does not match the cipher variant
    InvalidNonceLength {
        /// Nonce length required by the variant
        expected: usize,
        /// Length of the rejected nonce
        len: usize,
    },
    /// Input and output buffers differ in length
    BufferLengthMismatch {
        /// Input length
        input: usize,
        /// Output length
        output: usize,
    },
    /// The block counter would run past the end of its range
    CounterExhausted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength { len } => {
                write!(f, "invalid key length: expected 32 bytes, got {len}")
            }
            Self::InvalidNonceLength { expected, len } => {
                write!(f, "invalid nonce length: expected {expected} bytes, got {len}")
            }
            Self::BufferLengthMismatch { input, output } => write!(
                f,
                "input and output lengths differ: {input} != {output}"
            ),
            Self::CounterExhausted => f.write_str("block counter exhausted"),
        }
    }
}

impl core::error::Error for Error {}
