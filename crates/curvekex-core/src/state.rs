//! Key exchange state owned by the surrounding connection.
//!
//! ```text
//! Idle ──begin_exchange──▶ InitSent ──handle_exchange_reply──▶ ReplyProcessing
//!   ▲                                                              │
//!   │                                                ┌─────────────┴──────────┐
//!   │                                                ▼                        ▼
//!   └───────────── (re-exchange) ────────── SessionEstablished              Failed
//! ```
//!
//! `Failed` is terminal: the transport must be torn down.

use crate::config::KexConfig;
use crate::error::KexError;
use crate::hostkey::{HostKey, HostKeyType};
use crate::session_id::SessionId;
use crate::transport::HostKeyVerifier;
use curvekex_crypto::x25519::{PrivateKey, PublicKey};
use zeroize::Zeroize;

/// Exchange phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KexPhase {
    /// No exchange started
    Idle,
    /// Init sent, awaiting the reply
    InitSent,
    /// Reply being validated
    ReplyProcessing,
    /// Keys derived and `NEWKEYS` sent
    SessionEstablished,
    /// Exchange failed; the connection must be dropped
    Failed,
}

/// Byte transcripts captured earlier in the handshake, hashed read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcripts {
    /// Client identification string, without CR LF
    pub client_version: Vec<u8>,
    /// Server identification string, without CR LF
    pub server_version: Vec<u8>,
    /// Client KEXINIT payload after the message number
    pub client_kexinit: Vec<u8>,
    /// Server KEXINIT payload after the message number
    pub server_kexinit: Vec<u8>,
}

/// Per-connection key exchange state.
pub struct KexState {
    pub(crate) config: KexConfig,
    pub(crate) transcripts: Transcripts,
    pub(crate) ephemeral_private: PrivateKey,
    pub(crate) ephemeral_public: Option<PublicKey>,
    pub(crate) session_id: SessionId,
    pub(crate) verify_host_key: Option<Box<dyn HostKeyVerifier + Send>>,
    pub(crate) phase: KexPhase,
}

impl KexState {
    /// Create idle state. A host key verifier must be installed with
    /// [`KexState::set_host_key_verifier`] before the exchange runs.
    #[must_use]
    pub fn new(config: KexConfig, transcripts: Transcripts) -> Self {
        Self {
            config,
            transcripts,
            ephemeral_private: PrivateKey::default(),
            ephemeral_public: None,
            session_id: SessionId::new(),
            verify_host_key: None,
            phase: KexPhase::Idle,
        }
    }

    /// Install the host trust decision.
    pub fn set_host_key_verifier<V>(&mut self, verifier: V)
    where
        V: HostKeyVerifier + Send + 'static,
    {
        self.verify_host_key = Some(Box::new(verifier));
    }

    /// Whether a host key verifier is installed.
    #[must_use]
    pub fn has_host_key_verifier(&self) -> bool {
        self.verify_host_key.is_some()
    }

    /// Replace the KEXINIT transcripts ahead of a re-exchange.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::InvalidState`] while an exchange is in flight.
    pub fn set_transcripts(&mut self, transcripts: Transcripts) -> Result<(), KexError> {
        if matches!(self.phase, KexPhase::InitSent | KexPhase::ReplyProcessing) {
            return Err(KexError::InvalidState);
        }
        self.transcripts = transcripts;
        Ok(())
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> KexPhase {
        self.phase
    }

    /// Exchange configuration.
    #[must_use]
    pub fn config(&self) -> &KexConfig {
        &self.config
    }

    /// Captured transcripts.
    #[must_use]
    pub fn transcripts(&self) -> &Transcripts {
        &self.transcripts
    }

    /// The connection's session id.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Ephemeral private key of the current attempt; all-zero once consumed.
    #[must_use]
    pub fn ephemeral_private(&self) -> &PrivateKey {
        &self.ephemeral_private
    }

    /// Ephemeral public key of the current attempt.
    #[must_use]
    pub fn ephemeral_public(&self) -> Option<&PublicKey> {
        self.ephemeral_public.as_ref()
    }

    /// Abandon an in-flight attempt during transport teardown.
    pub fn abandon(&mut self) {
        self.ephemeral_private.zeroize();
        if self.phase != KexPhase::SessionEstablished {
            self.phase = KexPhase::Failed;
        }
        tracing::debug!(phase = ?self.phase, "key exchange abandoned");
    }

    /// Check the decoded host key against the negotiated type.
    ///
    /// An ECDSA key must also match the negotiated curve; an ECDSA
    /// configuration without a curve matches no key. The curve setting is
    /// ignored for Ed25519.
    pub(crate) fn check_host_key_type(&self, host_key: &HostKey) -> Result<(), KexError> {
        if host_key.key_type() != self.config.host_key_type {
            return Err(KexError::KeyTypeMismatch);
        }
        if self.config.host_key_type == HostKeyType::Ecdsa
            && host_key.curve() != self.config.host_key_curve
        {
            return Err(KexError::KeyTypeMismatch);
        }
        Ok(())
    }
}

impl std::fmt::Debug for KexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KexState")
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("session_id", &self.session_id)
            .field("ephemeral_private", &self.ephemeral_private)
            .field("has_host_key_verifier", &self.verify_host_key.is_some())
            .finish_non_exhaustive()
    }
}
