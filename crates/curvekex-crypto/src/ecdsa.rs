//! ECDSA over NIST P-256 for `ecdsa-sha2-nistp256` host keys (RFC 5656).
//!
//! The message is hashed with SHA-256 by the verifier. SSH transmits the
//! signature as two mpints, so `r` and `s` arrive as big-endian magnitudes
//! that may carry a leading zero byte or be shorter than 32 bytes.

use crate::{CryptoError, P256_SCALAR_SIZE};
use p256::ecdsa::signature::{Signer, Verifier};
use rand_core::CryptoRngCore;

/// P-256 verifying key (SEC1-encoded on the wire)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaP256VerifyingKey(p256::ecdsa::VerifyingKey);

impl EcdsaP256VerifyingKey {
    /// Parse a SEC1 encoded point.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPublicKey`] if the bytes are not a point
    /// on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Uncompressed SEC1 encoding, as carried in SSH host key blobs.
    #[must_use]
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Verify `(r, s)` over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] for out-of-range scalars or
    /// a signature that does not verify.
    pub fn verify(&self, message: &[u8], r: &[u8], s: &[u8]) -> Result<(), CryptoError> {
        let signature = p256::ecdsa::Signature::from_scalars(field_bytes(r)?, field_bytes(s)?)
            .map_err(|_| CryptoError::InvalidSignature)?;
        self.0
            .verify(message, &signature)
            .map_err(|_| CryptoError::InvalidSignature)
    }
}

/// P-256 signing key
pub struct EcdsaP256SigningKey(p256::ecdsa::SigningKey);

impl EcdsaP256SigningKey {
    /// Generate a new random signing key
    #[must_use]
    pub fn generate<R: CryptoRngCore>(rng: &mut R) -> Self {
        Self(p256::ecdsa::SigningKey::random(rng))
    }

    /// Get the corresponding verifying key
    #[must_use]
    pub fn verifying_key(&self) -> EcdsaP256VerifyingKey {
        EcdsaP256VerifyingKey(p256::ecdsa::VerifyingKey::from(&self.0))
    }

    /// Sign `message`, returning the big-endian `(r, s)` scalars.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let signature: p256::ecdsa::Signature = self.0.sign(message);
        let (r, s) = signature.split_bytes();
        (r.to_vec(), s.to_vec())
    }
}

/// Left-pad an unsigned big-endian magnitude to the scalar width.
fn field_bytes(magnitude: &[u8]) -> Result<p256::FieldBytes, CryptoError> {
    let start = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];
    if trimmed.len() > P256_SCALAR_SIZE {
        return Err(CryptoError::InvalidSignature);
    }

    let mut out = p256::FieldBytes::default();
    out[P256_SCALAR_SIZE - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}
