//! Exchange configuration
//!
//! Values here are fixed by algorithm negotiation before the exchange
//! starts. Negotiation itself happens elsewhere.

use crate::hostkey::{EcdsaCurve, HostKeyType};
use crate::keys::KeySizes;
use curvekex_crypto::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Key exchange configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KexConfig {
    /// Exchange hash function
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
    /// Expected server host key family
    #[serde(default = "default_host_key_type")]
    pub host_key_type: HostKeyType,
    /// Expected curve when `host_key_type` is ECDSA; required for ECDSA,
    /// ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_key_curve: Option<EcdsaCurve>,
    /// Transport key lengths
    #[serde(default)]
    pub key_sizes: KeySizes,
}

fn default_host_key_type() -> HostKeyType {
    HostKeyType::Ed25519
}

impl Default for KexConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            host_key_type: default_host_key_type(),
            host_key_curve: None,
            key_sizes: KeySizes::default(),
        }
    }
}

impl KexConfig {
    /// `curve25519-sha256` with an Ed25519 host key.
    #[must_use]
    pub fn curve25519_sha256() -> Self {
        Self::default()
    }

    /// Expect an Ed25519 host key.
    #[must_use]
    pub fn with_ed25519_host_key(mut self) -> Self {
        self.host_key_type = HostKeyType::Ed25519;
        self.host_key_curve = None;
        self
    }

    /// Expect an ECDSA host key on `curve`.
    #[must_use]
    pub fn with_ecdsa_host_key(mut self, curve: EcdsaCurve) -> Self {
        self.host_key_type = HostKeyType::Ecdsa;
        self.host_key_curve = Some(curve);
        self
    }

    /// Override the transport key lengths.
    #[must_use]
    pub fn with_key_sizes(mut self, key_sizes: KeySizes) -> Self {
        self.key_sizes = key_sizes;
        self
    }
}
