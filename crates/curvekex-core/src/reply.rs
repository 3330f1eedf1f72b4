//! `SSH_MSG_KEX_ECDH_REPLY` handling: host key validation, shared secret,
//! exchange hash, signature check, session id commit and key derivation.
//!
//! Every exit path, success or failure, leaves the ephemeral private key
//! in [`KexState`] all-zero. Host rejection, a malformed server point and
//! a bad signature all surface as [`KexError::SignatureInvalid`]; the
//! specific reason is only logged.

use crate::error::KexError;
use crate::exchange_hash::{self, ExchangeHashInput};
use crate::hostkey::HostKey;
use crate::state::{KexPhase, KexState};
use crate::transport::{KexTransport, KeyDerivationInput};
use crate::wire::{PacketReader, encode_mpint};
use curvekex_crypto::x25519::{PrivateKey, PublicKey};
use std::fmt;

/// Result of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KexOutcome {
    session_id_committed: bool,
    host_key_algorithm: &'static str,
    host_key_fingerprint: Vec<u8>,
}

impl KexOutcome {
    /// Whether this exchange fixed the connection's session id (first
    /// exchange) rather than reusing an existing one (re-exchange).
    #[must_use]
    pub fn session_id_committed(&self) -> bool {
        self.session_id_committed
    }

    /// Algorithm name of the accepted host key.
    #[must_use]
    pub fn host_key_algorithm(&self) -> &'static str {
        self.host_key_algorithm
    }

    /// SHA-256 fingerprint of the accepted host key blob.
    #[must_use]
    pub fn host_key_fingerprint(&self) -> &[u8] {
        &self.host_key_fingerprint
    }
}

/// Internal reason behind a [`KexError::SignatureInvalid`].
#[derive(Debug, Clone, Copy)]
enum Rejection {
    HostKeyUntrusted,
    ServerPublicKeyLength(usize),
    BadSignature,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostKeyUntrusted => f.write_str("host key rejected by verifier"),
            Self::ServerPublicKeyLength(len) => write!(f, "server public key length {len}"),
            Self::BadSignature => f.write_str("exchange hash signature did not verify"),
        }
    }
}

fn reject(reason: Rejection) -> KexError {
    tracing::debug!(%reason, "rejecting KEX_ECDH_REPLY");
    KexError::SignatureInvalid
}

impl KexState {
    /// Process the server's reply and, on success, derive keys and send
    /// `NEWKEYS`.
    ///
    /// # Errors
    ///
    /// - [`KexError::InvalidArgument`] if no host key verifier is installed
    /// - [`KexError::InvalidState`] if no init is outstanding
    /// - [`KexError::MalformedMessage`] for framing or host key decode errors
    /// - [`KexError::KeyTypeMismatch`] if the host key is not the negotiated type
    /// - [`KexError::SignatureInvalid`] if the host is untrusted, the server
    ///   point has the wrong length, or the signature does not verify
    /// - [`KexError::PrimitiveFailure`] for a degenerate server point
    /// - errors from key derivation or the transport, unchanged
    ///
    /// Any error leaves the state in [`KexPhase::Failed`].
    pub fn handle_exchange_reply<T>(
        &mut self,
        payload: &[u8],
        transport: &mut T,
    ) -> Result<KexOutcome, KexError>
    where
        T: KexTransport + ?Sized,
    {
        // Taking the scalar leaves zeros in the state; the local copy wipes
        // itself on drop whichever way process_reply returns.
        let private = std::mem::take(&mut self.ephemeral_private);
        let result = self.process_reply(&private, payload, transport);
        drop(private);

        match &result {
            Ok(outcome) => {
                self.phase = KexPhase::SessionEstablished;
                tracing::debug!(
                    host_key = outcome.host_key_algorithm,
                    first_exchange = outcome.session_id_committed,
                    "key exchange complete"
                );
            }
            Err(e) => {
                self.phase = KexPhase::Failed;
                tracing::warn!("key exchange failed: {}", e);
            }
        }
        result
    }

    fn process_reply<T>(
        &mut self,
        private: &PrivateKey,
        payload: &[u8],
        transport: &mut T,
    ) -> Result<KexOutcome, KexError>
    where
        T: KexTransport + ?Sized,
    {
        if self.verify_host_key.is_none() {
            return Err(KexError::InvalidArgument("host key verifier not set"));
        }
        if self.phase != KexPhase::InitSent {
            return Err(KexError::InvalidState);
        }
        let client_public = self.ephemeral_public.ok_or(KexError::InvalidState)?;
        self.phase = KexPhase::ReplyProcessing;

        let mut reader = PacketReader::new(payload);

        let host_key_blob = reader.get_string()?;
        let host_key = HostKey::from_blob(host_key_blob)?;
        self.check_host_key_type(&host_key)?;
        let trusted = self
            .verify_host_key
            .as_mut()
            .is_some_and(|verifier| verifier.verify_host_key(&host_key));
        if !trusted {
            return Err(reject(Rejection::HostKeyUntrusted));
        }

        let server_public = reader.get_string()?;
        let signature = reader.get_string()?;
        reader.get_end()?;

        let server_key = PublicKey::from_slice(server_public)
            .map_err(|_| reject(Rejection::ServerPublicKeyLength(server_public.len())))?;
        tracing::trace!(server_public = %hex::encode(server_public), "server ephemeral key");

        let shared_secret = encode_mpint(private.exchange(&server_key)?.as_bytes())?;

        let exchange_hash = exchange_hash::compute(
            self.config.hash_algorithm,
            &ExchangeHashInput {
                client_version: &self.transcripts.client_version,
                server_version: &self.transcripts.server_version,
                client_kexinit: &self.transcripts.client_kexinit,
                server_kexinit: &self.transcripts.server_kexinit,
                host_key_blob,
                client_public: client_public.as_bytes(),
                server_public,
                shared_secret: &shared_secret,
            },
        )?;

        host_key
            .verify(signature, &exchange_hash)
            .map_err(|_| reject(Rejection::BadSignature))?;

        let session_id_committed = self.session_id.commit_once(&exchange_hash);
        let session_id = self.session_id.as_bytes().ok_or(KexError::InvalidState)?;

        transport.derive_session_keys(&KeyDerivationInput {
            hash_algorithm: self.config.hash_algorithm,
            key_sizes: &self.config.key_sizes,
            session_id,
            exchange_hash: &exchange_hash,
            shared_secret: &shared_secret,
        })?;
        transport.signal_encrypted_session_ready()?;

        Ok(KexOutcome {
            session_id_committed,
            host_key_algorithm: host_key.algorithm_name(),
            host_key_fingerprint: host_key.fingerprint(),
        })
    }
}
