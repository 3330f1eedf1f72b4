//! Client side of the exchange start: ephemeral key generation and
//! `SSH_MSG_KEX_ECDH_INIT`.

use crate::error::KexError;
use crate::message::{EcdhInit, MessageType};
use crate::state::{KexPhase, KexState};
use crate::transport::KexTransport;
use curvekex_crypto::x25519::PrivateKey;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

impl KexState {
    /// Generate a fresh ephemeral key pair and send its public half.
    ///
    /// Returns once the message is handed to the transport; the reply is
    /// delivered later to [`KexState::handle_exchange_reply`].
    ///
    /// # Errors
    ///
    /// - [`KexError::InvalidArgument`] if no host key verifier is installed
    /// - [`KexError::InvalidState`] if an exchange is already in flight or
    ///   a previous one failed
    /// - [`KexError::PrimitiveFailure`] if key generation fails
    /// - transport errors from [`KexTransport::send_message`], unchanged
    pub fn begin_exchange<R, T>(&mut self, rng: &mut R, transport: &mut T) -> Result<(), KexError>
    where
        R: RngCore + CryptoRng,
        T: KexTransport + ?Sized,
    {
        if self.verify_host_key.is_none() {
            return Err(KexError::InvalidArgument("host key verifier not set"));
        }
        if !matches!(self.phase, KexPhase::Idle | KexPhase::SessionEstablished) {
            return Err(KexError::InvalidState);
        }

        let private = PrivateKey::generate(rng).map_err(|e| {
            self.phase = KexPhase::Failed;
            KexError::from(e)
        })?;
        let public = private.public_key();
        self.ephemeral_private = private;
        self.ephemeral_public = Some(public);
        tracing::trace!(client_public = %hex::encode(public.as_bytes()), "generated ephemeral key");

        let sent = EcdhInit {
            client_public: public.as_bytes(),
        }
        .encode()
        .and_then(|payload| transport.send_message(MessageType::KexEcdhInit, &payload));

        if let Err(e) = sent {
            self.ephemeral_private.zeroize();
            self.phase = KexPhase::Failed;
            tracing::warn!("failed to send KEX_ECDH_INIT: {}", e);
            return Err(e);
        }

        self.phase = KexPhase::InitSent;
        tracing::debug!("expecting KEX_ECDH_REPLY");
        Ok(())
    }
}
