//! Ed25519 host key signatures.
//!
//! SSH servers sign the exchange hash directly with Ed25519 (RFC 8709):
//! - 64-byte signatures
//! - 32-byte public keys
//! - Signing keys zeroized on drop
//!
//! Only verification is needed by a client; [`SigningKey`] exists so
//! test fixtures and simulated servers can produce genuine signatures.

use crate::{CryptoError, ED25519_PUBLIC_KEY_SIZE, ED25519_SIGNATURE_SIZE};
use ed25519_dalek::{Signer, Verifier};
use rand_core::{CryptoRng, RngCore};
use zeroize::ZeroizeOnDrop;

/// Ed25519 signature (64 bytes)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Create a signature from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create a signature from a slice
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if the slice is not exactly 64 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; ED25519_SIGNATURE_SIZE] =
            slice.try_into().map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    /// Get the raw signature bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Ed25519 signing key (private key)
#[derive(ZeroizeOnDrop)]
pub struct SigningKey {
    inner: ed25519_dalek::SigningKey,
}

impl SigningKey {
    /// Generate a new random signing key
    #[must_use]
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::generate(rng),
        }
    }

    /// Create from raw 32-byte seed
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(bytes),
        }
    }

    /// Sign a message
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.inner.sign(message).to_bytes())
    }

    /// Get the corresponding verifying key (public key)
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            inner: self.inner.verifying_key(),
        }
    }
}

/// Ed25519 verifying key (public key)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: ed25519_dalek::VerifyingKey,
}

impl VerifyingKey {
    /// Create from a wire slice holding the raw 32-byte public key
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] for a slice of the wrong size
    /// and [`CryptoError::InvalidPublicKey`] if the bytes are not a valid
    /// Edwards point.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; ED25519_PUBLIC_KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: ED25519_PUBLIC_KEY_SIZE,
                    actual: bytes.len(),
                })?;
        let inner = ed25519_dalek::VerifyingKey::from_bytes(&array)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { inner })
    }

    /// Get the raw public key bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Verify a signature on a message
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if the signature does not
    /// authenticate the message under this key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.inner
            .verify(message, &signature)
            .map_err(|_| CryptoError::InvalidSignature)
    }
}
