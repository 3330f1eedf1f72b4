//! Transport key schedule (RFC 4253 §7.2).
//!
//! ```text
//! K1   = HASH(K || H || X || session_id)      X in 'A'..='F'
//! Kn+1 = HASH(K || H || K1 || ... || Kn)
//! key  = K1 || K2 || ...  truncated to the required length
//! ```
//!
//! `K` is the mpint-encoded shared secret, `H` the exchange hash.

use crate::error::KexError;
use crate::transport::KeyDerivationInput;
use curvekex_crypto::hash::TranscriptHasher;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Upper bound on any single derived key.
const MAX_KEY_LEN: usize = 1024;

/// Key lengths required by the negotiated cipher and MAC, per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySizes {
    /// Initial IV length
    pub iv_len: usize,
    /// Cipher key length
    pub cipher_key_len: usize,
    /// MAC key length (zero for AEAD ciphers)
    pub mac_key_len: usize,
}

impl Default for KeySizes {
    fn default() -> Self {
        Self {
            iv_len: 12,
            cipher_key_len: 32,
            mac_key_len: 32,
        }
    }
}

/// Keys for one direction of the transport.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DirectionalKeys {
    iv: Vec<u8>,
    cipher_key: Vec<u8>,
    mac_key: Vec<u8>,
}

impl DirectionalKeys {
    /// Initial IV
    #[must_use]
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Cipher key
    #[must_use]
    pub fn cipher_key(&self) -> &[u8] {
        &self.cipher_key
    }

    /// MAC key
    #[must_use]
    pub fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }
}

/// Both directions of derived transport keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct TransportKeys {
    /// Client to server
    pub client_to_server: DirectionalKeys,
    /// Server to client
    pub server_to_client: DirectionalKeys,
}

/// Run the key schedule.
///
/// # Errors
///
/// Returns [`KexError::InvalidArgument`] if a requested key length exceeds
/// the supported maximum.
pub fn derive_transport_keys(input: &KeyDerivationInput<'_>) -> Result<TransportKeys, KexError> {
    let sizes = input.key_sizes;
    Ok(TransportKeys {
        client_to_server: DirectionalKeys {
            iv: derive_key(input, b'A', sizes.iv_len)?,
            cipher_key: derive_key(input, b'C', sizes.cipher_key_len)?,
            mac_key: derive_key(input, b'E', sizes.mac_key_len)?,
        },
        server_to_client: DirectionalKeys {
            iv: derive_key(input, b'B', sizes.iv_len)?,
            cipher_key: derive_key(input, b'D', sizes.cipher_key_len)?,
            mac_key: derive_key(input, b'F', sizes.mac_key_len)?,
        },
    })
}

// Each hasher absorbs `K` and scrubs it on drop; see `TranscriptHasher`.
fn derive_key(input: &KeyDerivationInput<'_>, letter: u8, need: usize) -> Result<Vec<u8>, KexError> {
    if need > MAX_KEY_LEN {
        return Err(KexError::InvalidArgument("requested key length too large"));
    }
    if need == 0 {
        return Ok(Vec::new());
    }

    let mut hasher = TranscriptHasher::new(input.hash_algorithm);
    hasher.update(input.shared_secret);
    hasher.update(input.exchange_hash);
    hasher.update(&[letter]);
    hasher.update(input.session_id);
    let mut key = Zeroizing::new(hasher.finalize());
    // Grow once so no partial key is left behind in a freed allocation
    key.reserve(need + input.hash_algorithm.output_len());

    while key.len() < need {
        let mut hasher = TranscriptHasher::new(input.hash_algorithm);
        hasher.update(input.shared_secret);
        hasher.update(input.exchange_hash);
        hasher.update(&key);
        let block = Zeroizing::new(hasher.finalize());
        key.extend_from_slice(&block);
    }

    key.truncate(need);
    Ok(std::mem::take(&mut *key))
}
