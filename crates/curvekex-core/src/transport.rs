//! Collaborator contracts: packet transport, key installation and the
//! host trust decision.

use crate::error::KexError;
use crate::hostkey::HostKey;
use crate::keys::{KeySizes, TransportKeys, derive_transport_keys};
use crate::message::MessageType;
use curvekex_crypto::hash::HashAlgorithm;
use std::fmt;

/// Everything the key schedule consumes.
///
/// `Debug` output omits the shared secret.
#[derive(Clone, Copy)]
pub struct KeyDerivationInput<'a> {
    /// Hash used for the exchange
    pub hash_algorithm: HashAlgorithm,
    /// Required key lengths
    pub key_sizes: &'a KeySizes,
    /// Permanent session id of the connection
    pub session_id: &'a [u8],
    /// Exchange hash of this exchange
    pub exchange_hash: &'a [u8],
    /// mpint-encoded shared secret
    pub shared_secret: &'a [u8],
}

impl fmt::Debug for KeyDerivationInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDerivationInput")
            .field("hash_algorithm", &self.hash_algorithm)
            .field("key_sizes", self.key_sizes)
            .field("session_id", &hex::encode(self.session_id))
            .field("exchange_hash", &hex::encode(self.exchange_hash))
            .finish_non_exhaustive()
    }
}

/// Packet transport and session transition for one connection.
///
/// Implementations own framing, sequence numbers and the socket. Any
/// error they return is propagated to the caller unchanged.
pub trait KexTransport {
    /// Frame and send a typed message.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::Transport`] if the transport is unusable.
    fn send_message(&mut self, message_type: MessageType, payload: &[u8]) -> Result<(), KexError>;

    /// Take ownership of freshly derived keys.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::Transport`] if the keys cannot be installed.
    fn install_keys(&mut self, keys: TransportKeys) -> Result<(), KexError>;

    /// Derive transport keys and hand them to [`KexTransport::install_keys`].
    ///
    /// # Errors
    ///
    /// Propagates key schedule and installation failures.
    fn derive_session_keys(&mut self, input: &KeyDerivationInput<'_>) -> Result<(), KexError> {
        let keys = derive_transport_keys(input)?;
        self.install_keys(keys)
    }

    /// Announce readiness to switch keys by sending `NEWKEYS`.
    ///
    /// # Errors
    ///
    /// Propagates [`KexTransport::send_message`] failures.
    fn signal_encrypted_session_ready(&mut self) -> Result<(), KexError> {
        self.send_message(MessageType::NewKeys, &[])
    }
}

/// Caller-supplied trust decision for a presented host key, e.g. a
/// known-hosts or certificate authority check.
pub trait HostKeyVerifier {
    /// Return `true` to accept the key.
    fn verify_host_key(&mut self, host_key: &HostKey) -> bool;
}

impl<F> HostKeyVerifier for F
where
    F: FnMut(&HostKey) -> bool,
{
    fn verify_host_key(&mut self, host_key: &HostKey) -> bool {
        self(host_key)
    }
}

/// Accepts only keys whose SHA-256 fingerprint is in a fixed list.
#[derive(Debug, Clone, Default)]
pub struct PinnedHostKeys {
    fingerprints: Vec<Vec<u8>>,
}

impl PinnedHostKeys {
    /// Empty pin set; rejects everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust `host_key`.
    pub fn pin(&mut self, host_key: &HostKey) {
        self.fingerprints.push(host_key.fingerprint());
    }

    /// Trust a key by its raw SHA-256 fingerprint.
    pub fn pin_fingerprint(&mut self, fingerprint: Vec<u8>) {
        self.fingerprints.push(fingerprint);
    }
}

impl HostKeyVerifier for PinnedHostKeys {
    fn verify_host_key(&mut self, host_key: &HostKey) -> bool {
        let fingerprint = host_key.fingerprint();
        self.fingerprints.iter().any(|pinned| *pinned == fingerprint)
    }
}
