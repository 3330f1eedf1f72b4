//! SHA-2 transcript hashing.
//!
//! The exchange hash, the host key fingerprint and the transport key
//! schedule all run through [`TranscriptHasher`], selected by
//! [`HashAlgorithm`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Transcript hash function identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// SHA-256 (`curve25519-sha256`)
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

/// Incremental hasher over the selected algorithm.
///
/// # Security
///
/// `sha2` hashers do not implement `Zeroize`. On drop this wrapper resets
/// the chaining state and overwrites the buffered input with zeros, so a
/// shared secret fed through it does not stay in the block buffer. The
/// scrub uses ordinary writes and is best effort. Digests over secret
/// input should be wrapped in `Zeroizing` by the caller.
#[derive(Clone)]
pub struct TranscriptHasher {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

/// Largest SHA-2 block size, in bytes.
const MAX_BLOCK_LEN: usize = 128;

impl TranscriptHasher {
    /// Create an empty hasher.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let inner = match algorithm {
            HashAlgorithm::Sha256 => Inner::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Inner::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Inner::Sha512(Sha512::new()),
        };
        Self { inner }
    }

    /// Update with more data.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.inner {
            Inner::Sha256(h) => h.update(data),
            Inner::Sha384(h) => h.update(data),
            Inner::Sha512(h) => h.update(data),
        }
    }

    /// Finalize and return the digest.
    #[must_use]
    pub fn finalize(mut self) -> Vec<u8> {
        match &mut self.inner {
            Inner::Sha256(h) => h.finalize_reset().to_vec(),
            Inner::Sha384(h) => h.finalize_reset().to_vec(),
            Inner::Sha512(h) => h.finalize_reset().to_vec(),
        }
    }
}

impl Drop for TranscriptHasher {
    fn drop(&mut self) {
        // The eager block buffer holds at most one byte less than a block
        let fill = [0u8; MAX_BLOCK_LEN];
        match &mut self.inner {
            Inner::Sha256(h) => {
                Digest::reset(h);
                Digest::update(h, &fill[..63]);
            }
            Inner::Sha384(h) => {
                Digest::reset(h);
                Digest::update(h, &fill[..127]);
            }
            Inner::Sha512(h) => {
                Digest::reset(h);
                Digest::update(h, &fill[..127]);
            }
        }
    }
}

/// One-shot digest.
#[must_use]
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut hasher = TranscriptHasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}
