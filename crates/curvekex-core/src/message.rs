//! Key exchange message shapes.
//!
//! Payloads here exclude the leading message number byte; the transport
//! collaborator frames them with a [`MessageType`].

use crate::error::KexError;
use crate::wire::{PacketReader, PacketWriter};
use curvekex_crypto::X25519_PUBLIC_KEY_SIZE;

/// SSH transport message numbers used by this exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Algorithm negotiation (only hashed, never sent here)
    KexInit = 20,
    /// Switch to the newly derived keys
    NewKeys = 21,
    /// Client ephemeral public key
    KexEcdhInit = 30,
    /// Server host key, ephemeral public key and signature
    KexEcdhReply = 31,
}

impl TryFrom<u8> for MessageType {
    type Error = KexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            20 => Ok(Self::KexInit),
            21 => Ok(Self::NewKeys),
            30 => Ok(Self::KexEcdhInit),
            31 => Ok(Self::KexEcdhReply),
            _ => Err(KexError::MalformedMessage("unexpected message type")),
        }
    }
}

/// `SSH_MSG_KEX_ECDH_INIT` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdhInit<'a> {
    /// Raw client ephemeral public key
    pub client_public: &'a [u8; X25519_PUBLIC_KEY_SIZE],
}

impl<'a> EcdhInit<'a> {
    /// Encode as a single opaque string.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn encode(&self) -> Result<Vec<u8>, KexError> {
        let mut writer = PacketWriter::new();
        writer.put_string(self.client_public)?;
        Ok(writer.into_bytes())
    }

    /// Parse an init payload, enforcing the fixed key length.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] on a wrong length or trailing data.
    pub fn parse(payload: &'a [u8]) -> Result<Self, KexError> {
        let mut reader = PacketReader::new(payload);
        let key = reader.get_string()?;
        reader.get_end()?;
        let client_public = key
            .try_into()
            .map_err(|_| KexError::MalformedMessage("bad client public key length"))?;
        Ok(Self { client_public })
    }
}

/// `SSH_MSG_KEX_ECDH_REPLY` payload.
///
/// Only the framing is checked by [`EcdhReply::parse`]; the server point
/// length is a validation concern of the reply handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdhReply<'a> {
    /// Encoded server host public key
    pub host_key_blob: &'a [u8],
    /// Server ephemeral public key
    pub server_public: &'a [u8],
    /// Encoded signature over the exchange hash
    pub signature: &'a [u8],
}

impl<'a> EcdhReply<'a> {
    /// Encode the three strings in order.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] for oversized fields or
    /// [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn encode(&self) -> Result<Vec<u8>, KexError> {
        let mut writer = PacketWriter::new();
        writer.put_string(self.host_key_blob)?;
        writer.put_string(self.server_public)?;
        writer.put_string(self.signature)?;
        Ok(writer.into_bytes())
    }

    /// Parse exactly three strings and nothing more.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] on truncation or trailing data.
    pub fn parse(payload: &'a [u8]) -> Result<Self, KexError> {
        let mut reader = PacketReader::new(payload);
        let host_key_blob = reader.get_string()?;
        let server_public = reader.get_string()?;
        let signature = reader.get_string()?;
        reader.get_end()?;
        Ok(Self {
            host_key_blob,
            server_public,
            signature,
        })
    }
}
