//! Server host key and signature blob codec.
//!
//! Host keys arrive as SSH public key blobs (RFC 4253 §6.6):
//!
//! ```text
//! ssh-ed25519:          string "ssh-ed25519"  string key[32]
//! ecdsa-sha2-nistpNNN:  string "ecdsa-sha2-nistpNNN"  string "nistpNNN"  string Q
//! ```
//!
//! Signatures are `string algorithm || string signature`. For ECDSA the
//! inner signature is itself `mpint r || mpint s`.

use crate::error::KexError;
use crate::wire::{PacketReader, PacketWriter};
use curvekex_crypto::ecdsa::EcdsaP256VerifyingKey;
use curvekex_crypto::ed25519::{self, VerifyingKey};
use curvekex_crypto::hash::{HashAlgorithm, digest};
use curvekex_crypto::CryptoError;
use serde::{Deserialize, Serialize};

/// Host key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyType {
    /// `ssh-ed25519`
    Ed25519,
    /// `ecdsa-sha2-*`, parameterized by [`EcdsaCurve`]
    Ecdsa,
}

/// Named curve of an ECDSA host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcdsaCurve {
    /// NIST P-256
    #[serde(rename = "nistp256")]
    NistP256,
    /// NIST P-384
    #[serde(rename = "nistp384")]
    NistP384,
    /// NIST P-521
    #[serde(rename = "nistp521")]
    NistP521,
}

impl EcdsaCurve {
    /// Curve identifier as carried inside the blob.
    #[must_use]
    pub fn ssh_name(self) -> &'static str {
        match self {
            Self::NistP256 => "nistp256",
            Self::NistP384 => "nistp384",
            Self::NistP521 => "nistp521",
        }
    }

    /// Full key algorithm name.
    #[must_use]
    pub fn algorithm_name(self) -> &'static str {
        match self {
            Self::NistP256 => "ecdsa-sha2-nistp256",
            Self::NistP384 => "ecdsa-sha2-nistp384",
            Self::NistP521 => "ecdsa-sha2-nistp521",
        }
    }

    fn from_ssh_name(name: &[u8]) -> Option<Self> {
        match name {
            b"nistp256" => Some(Self::NistP256),
            b"nistp384" => Some(Self::NistP384),
            b"nistp521" => Some(Self::NistP521),
            _ => None,
        }
    }

    fn from_algorithm_name(name: &[u8]) -> Option<Self> {
        name.strip_prefix(b"ecdsa-sha2-")
            .and_then(Self::from_ssh_name)
    }

    /// Uncompressed SEC1 point length.
    fn point_len(self) -> usize {
        match self {
            Self::NistP256 => 65,
            Self::NistP384 => 97,
            Self::NistP521 => 133,
        }
    }
}

const ED25519_ALGORITHM: &str = "ssh-ed25519";

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyMaterial {
    Ed25519(VerifyingKey),
    Ecdsa { curve: EcdsaCurve, point: Vec<u8> },
}

/// Decoded server host key, retaining the original blob for hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostKey {
    blob: Vec<u8>,
    material: KeyMaterial,
}

impl HostKey {
    /// Decode a public key blob.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] for unknown algorithms,
    /// truncated or trailing data, a curve identifier that disagrees with
    /// the algorithm name, or key bytes that are not a valid point.
    pub fn from_blob(blob: &[u8]) -> Result<Self, KexError> {
        let mut reader = PacketReader::new(blob);
        let algorithm = reader.get_string()?;

        let material = if algorithm == ED25519_ALGORITHM.as_bytes() {
            let key = reader.get_string()?;
            let key = VerifyingKey::from_slice(key)
                .map_err(|_| KexError::MalformedMessage("invalid ed25519 host key"))?;
            KeyMaterial::Ed25519(key)
        } else if let Some(curve) = EcdsaCurve::from_algorithm_name(algorithm) {
            let curve_name = reader.get_string()?;
            if EcdsaCurve::from_ssh_name(curve_name) != Some(curve) {
                return Err(KexError::MalformedMessage("ecdsa curve does not match key type"));
            }
            let point = reader.get_string()?;
            if point.len() != curve.point_len() || point[0] != 0x04 {
                return Err(KexError::MalformedMessage("invalid ecdsa point encoding"));
            }
            if curve == EcdsaCurve::NistP256 {
                EcdsaP256VerifyingKey::from_sec1_bytes(point)
                    .map_err(|_| KexError::MalformedMessage("ecdsa point not on curve"))?;
            }
            KeyMaterial::Ecdsa {
                curve,
                point: point.to_vec(),
            }
        } else {
            return Err(KexError::MalformedMessage("unknown host key type"));
        };
        reader.get_end()?;

        Ok(Self {
            blob: blob.to_vec(),
            material,
        })
    }

    /// Build the blob for an Ed25519 key.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn from_ed25519(key: &VerifyingKey) -> Result<Self, KexError> {
        let mut writer = PacketWriter::new();
        writer.put_string(ED25519_ALGORITHM.as_bytes())?;
        writer.put_string(&key.to_bytes())?;
        Ok(Self {
            blob: writer.into_bytes(),
            material: KeyMaterial::Ed25519(*key),
        })
    }

    /// Build the blob for a P-256 key.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn from_ecdsa_p256(key: &EcdsaP256VerifyingKey) -> Result<Self, KexError> {
        let curve = EcdsaCurve::NistP256;
        let point = key.to_sec1_bytes();
        let mut writer = PacketWriter::new();
        writer.put_string(curve.algorithm_name().as_bytes())?;
        writer.put_string(curve.ssh_name().as_bytes())?;
        writer.put_string(&point)?;
        Ok(Self {
            blob: writer.into_bytes(),
            material: KeyMaterial::Ecdsa { curve, point },
        })
    }

    /// Key family.
    #[must_use]
    pub fn key_type(&self) -> HostKeyType {
        match self.material {
            KeyMaterial::Ed25519(_) => HostKeyType::Ed25519,
            KeyMaterial::Ecdsa { .. } => HostKeyType::Ecdsa,
        }
    }

    /// Named curve for ECDSA keys.
    #[must_use]
    pub fn curve(&self) -> Option<EcdsaCurve> {
        match self.material {
            KeyMaterial::Ed25519(_) => None,
            KeyMaterial::Ecdsa { curve, .. } => Some(curve),
        }
    }

    /// SSH algorithm name.
    #[must_use]
    pub fn algorithm_name(&self) -> &'static str {
        match self.material {
            KeyMaterial::Ed25519(_) => ED25519_ALGORITHM,
            KeyMaterial::Ecdsa { curve, .. } => curve.algorithm_name(),
        }
    }

    /// The encoded blob exactly as received.
    #[must_use]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// SHA-256 of the blob, as used for known-hosts fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> Vec<u8> {
        digest(HashAlgorithm::Sha256, &self.blob)
    }

    /// Verify an encoded signature blob over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::SignatureInvalid`] for any failure: algorithm
    /// mismatch, malformed blob, unsupported curve or a bad signature.
    pub fn verify(&self, signature_blob: &[u8], data: &[u8]) -> Result<(), KexError> {
        self.verify_inner(signature_blob, data)
            .map_err(|_| KexError::SignatureInvalid)
    }

    fn verify_inner(&self, signature_blob: &[u8], data: &[u8]) -> Result<(), KexError> {
        let mut reader = PacketReader::new(signature_blob);
        let algorithm = reader.get_string()?;
        let signature = reader.get_string()?;
        reader.get_end()?;

        if algorithm != self.algorithm_name().as_bytes() {
            return Err(KexError::SignatureInvalid);
        }

        match &self.material {
            KeyMaterial::Ed25519(key) => {
                let signature = ed25519::Signature::from_slice(signature)?;
                key.verify(data, &signature)?;
            }
            KeyMaterial::Ecdsa {
                curve: EcdsaCurve::NistP256,
                point,
            } => {
                let mut inner = PacketReader::new(signature);
                let r = inner.get_string()?;
                let s = inner.get_string()?;
                inner.get_end()?;
                EcdsaP256VerifyingKey::from_sec1_bytes(point)?.verify(data, r, s)?;
            }
            KeyMaterial::Ecdsa { curve, .. } => {
                return Err(CryptoError::UnsupportedAlgorithm(curve.algorithm_name()).into());
            }
        }
        Ok(())
    }
}

/// Encode an Ed25519 signature blob.
///
/// # Errors
///
/// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
pub fn encode_ed25519_signature(signature: &ed25519::Signature) -> Result<Vec<u8>, KexError> {
    let mut writer = PacketWriter::new();
    writer.put_string(ED25519_ALGORITHM.as_bytes())?;
    writer.put_string(signature.as_bytes())?;
    Ok(writer.into_bytes())
}

/// Encode an ECDSA signature blob from big-endian `(r, s)`.
///
/// # Errors
///
/// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
pub fn encode_ecdsa_signature(curve: EcdsaCurve, r: &[u8], s: &[u8]) -> Result<Vec<u8>, KexError> {
    let mut inner = PacketWriter::new();
    inner.put_raw(&crate::wire::encode_mpint(r)?)?;
    inner.put_raw(&crate::wire::encode_mpint(s)?)?;

    let mut writer = PacketWriter::new();
    writer.put_string(curve.algorithm_name().as_bytes())?;
    writer.put_string(inner.as_bytes())?;
    Ok(writer.into_bytes())
}
