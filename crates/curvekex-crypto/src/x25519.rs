//! X25519 Diffie-Hellman for ephemeral key exchange (RFC 7748).
//!
//! Provides curve25519-based key agreement with:
//! - Fallible key generation (RNG failure is reported, never retried)
//! - Low-order point rejection
//! - Automatic key clamping (RFC 7748)
//! - Zeroization of sensitive data

use crate::{CryptoError, X25519_PUBLIC_KEY_SIZE};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// X25519 ephemeral private key (32 bytes).
///
/// The raw scalar is held unclamped; clamping happens inside every
/// scalar multiplication. The default value is all-zero, which is also
/// the state after [`Zeroize::zeroize`].
///
/// Not `Clone`: wiping the key wipes the only copy.
///
/// ```compile_fail
/// use curvekex_crypto::x25519::PrivateKey;
///
/// let key = PrivateKey::default();
/// let copy = key.clone();
/// ```
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

/// X25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(x25519_dalek::PublicKey);

/// X25519 shared secret (32 bytes).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(x25519_dalek::SharedSecret);

impl PrivateKey {
    /// Generate a new random private key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomFailed`] if the RNG cannot produce output.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, CryptoError> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        rng.try_fill_bytes(bytes.as_mut())
            .map_err(|_| CryptoError::RandomFailed)?;
        Ok(Self(*bytes))
    }

    /// Derive the public key from this private key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        let secret = x25519_dalek::StaticSecret::from(self.0);
        PublicKey(x25519_dalek::PublicKey::from(&secret))
    }

    /// Perform Diffie-Hellman key exchange.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LowOrderPoint`] if the peer's public key is a
    /// low-order point and the output would be all-zero.
    pub fn exchange(&self, peer_public: &PublicKey) -> Result<SharedSecret, CryptoError> {
        let secret = x25519_dalek::StaticSecret::from(self.0);
        let shared = secret.diffie_hellman(&peer_public.0);

        if !shared.was_contributory() {
            return Err(CryptoError::LowOrderPoint);
        }

        Ok(SharedSecret(shared))
    }

    /// Returns `true` once the scalar has been wiped.
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Export as bytes.
    ///
    /// # Security
    ///
    /// The returned bytes contain the raw private key. Handle with care.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Import from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("zeroed", &self.is_zeroed())
            .finish_non_exhaustive()
    }
}

impl PublicKey {
    /// Export public key as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        *self.0.as_bytes()
    }

    /// Import public key from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(x25519_dalek::PublicKey::from(bytes))
    }

    /// Import public key from a wire slice of exactly 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] for any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: X25519_PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self::from_bytes(array))
    }

    /// Get bytes as a slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl SharedSecret {
    /// Get shared secret as bytes.
    ///
    /// # Security
    ///
    /// The raw output is the little-endian u-coordinate. SSH feeds it through
    /// the mpint encoding before hashing.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}
