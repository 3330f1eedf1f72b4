//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Random number generation failed
    #[error("random number generation failed")]
    RandomFailed,

    /// Diffie-Hellman produced the all-zero output (low-order peer point)
    #[error("degenerate shared secret")]
    LowOrderPoint,

    /// Invalid signature
    #[error("invalid signature")]
    InvalidSignature,

    /// Invalid public key
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Algorithm recognised but not supported by this build
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(&'static str),
}
