//! Error types for the key exchange.
//!
//! Every variant is fatal to the exchange attempt that produced it. The
//! caller is expected to tear down the whole transport handshake.

use curvekex_crypto::CryptoError;
use thiserror::Error;

/// Key exchange errors
#[derive(Debug, Error)]
pub enum KexError {
    /// Caller-side configuration bug, e.g. no host key verifier installed
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Buffer growth failed
    #[error("memory allocation failed")]
    AllocationFailure,

    /// Parse, length or trailing-byte violation in a received message
    #[error("malformed message: {0}")]
    MalformedMessage(&'static str),

    /// Server host key type or curve differs from the negotiated one
    #[error("host key type mismatch")]
    KeyTypeMismatch,

    /// Host key rejected, server point malformed, or signature bad.
    ///
    /// Carries no detail; the specific reason is only logged.
    #[error("signature invalid")]
    SignatureInvalid,

    /// Curve, digest or codec primitive failed
    #[error("cryptographic primitive failed: {0}")]
    PrimitiveFailure(#[source] CryptoError),

    /// Operation not valid in the current exchange phase
    #[error("invalid state for operation")]
    InvalidState,

    /// Packet transport or key installation failed
    #[error("transport error: {0}")]
    Transport(String),
}

impl KexError {
    /// Numeric code following the SSH library error numbering.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidState => -1,
            Self::AllocationFailure => -2,
            Self::MalformedMessage(_) => -4,
            Self::InvalidArgument(_) => -10,
            Self::KeyTypeMismatch => -13,
            Self::PrimitiveFailure(_) => -20,
            Self::SignatureInvalid => -21,
            Self::Transport(_) => -24,
        }
    }

    /// Whether the error must abort the transport handshake.
    ///
    /// No step of the exchange is retried, so this is always `true`.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl From<CryptoError> for KexError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidSignature => Self::SignatureInvalid,
            other => Self::PrimitiveFailure(other),
        }
    }
}
