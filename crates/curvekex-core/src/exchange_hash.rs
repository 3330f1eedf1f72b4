//! Exchange hash `H` for curve25519-sha256 (RFC 8731 §3, RFC 5656 §4).
//!
//! ```text
//! H = HASH(string V_C || string V_S || string I_C || string I_S ||
//!          string K_S || string Q_C || string Q_S || mpint K)
//! ```
//!
//! `I_C` / `I_S` are the KEXINIT payloads including their message number.
//! Captured transcripts exclude that byte, so it is re-inserted here.

use crate::error::KexError;
use crate::message::MessageType;
use crate::wire::PacketWriter;
use curvekex_crypto::hash::{HashAlgorithm, TranscriptHasher};
use std::fmt;
use zeroize::Zeroizing;

/// Inputs to the exchange hash, in hashing order.
///
/// `Debug` output omits the shared secret.
#[derive(Clone, Copy)]
pub struct ExchangeHashInput<'a> {
    /// Client identification string, without CR LF
    pub client_version: &'a [u8],
    /// Server identification string, without CR LF
    pub server_version: &'a [u8],
    /// Client KEXINIT payload after the message number
    pub client_kexinit: &'a [u8],
    /// Server KEXINIT payload after the message number
    pub server_kexinit: &'a [u8],
    /// Server host key blob
    pub host_key_blob: &'a [u8],
    /// Client ephemeral public key
    pub client_public: &'a [u8],
    /// Server ephemeral public key
    pub server_public: &'a [u8],
    /// Shared secret, already mpint-encoded with its length prefix
    pub shared_secret: &'a [u8],
}

impl fmt::Debug for ExchangeHashInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeHashInput")
            .field("client_version", &String::from_utf8_lossy(self.client_version))
            .field("server_version", &String::from_utf8_lossy(self.server_version))
            .field("host_key_blob", &hex::encode(self.host_key_blob))
            .field("client_public", &hex::encode(self.client_public))
            .field("server_public", &hex::encode(self.server_public))
            .finish_non_exhaustive()
    }
}

/// Compute `H`.
///
/// `K` is absorbed last and sits in the hasher's block buffer until the
/// hasher is dropped and scrubbed; see [`TranscriptHasher`].
///
/// # Errors
///
/// Returns [`KexError::MalformedMessage`] for an oversized transcript field
/// or [`KexError::AllocationFailure`] if a buffer cannot grow.
pub fn compute(
    algorithm: HashAlgorithm,
    input: &ExchangeHashInput<'_>,
) -> Result<Zeroizing<Vec<u8>>, KexError> {
    let mut public = PacketWriter::new();
    public.put_string(input.client_version)?;
    public.put_string(input.server_version)?;
    put_kexinit(&mut public, input.client_kexinit)?;
    put_kexinit(&mut public, input.server_kexinit)?;
    public.put_string(input.host_key_blob)?;
    public.put_string(input.client_public)?;
    public.put_string(input.server_public)?;

    let mut hasher = TranscriptHasher::new(algorithm);
    hasher.update(public.as_bytes());
    hasher.update(input.shared_secret);
    Ok(Zeroizing::new(hasher.finalize()))
}

fn put_kexinit(writer: &mut PacketWriter, payload: &[u8]) -> Result<(), KexError> {
    let len = u32::try_from(payload.len() + 1)
        .map_err(|_| KexError::MalformedMessage("kexinit transcript too large"))?;
    writer.put_u32(len)?;
    writer.put_u8(MessageType::KexInit as u8)?;
    writer.put_raw(payload)
}
