//! Fuzz target for KEX_ECDH_REPLY handling
//!
//! Feeds arbitrary reply payloads to a client that has sent its init. The
//! handler must never panic, and every failure must leave the ephemeral
//! key wiped.

#![no_main]

use arbitrary::Arbitrary;
use curvekex_core::{
    HostKey, KexConfig, KexError, KexPhase, KexState, KexTransport, MessageType, Transcripts,
    TransportKeys,
};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::StdRng;

struct NullTransport;

impl KexTransport for NullTransport {
    fn send_message(&mut self, _: MessageType, _: &[u8]) -> Result<(), KexError> {
        Ok(())
    }

    fn install_keys(&mut self, _keys: TransportKeys) -> Result<(), KexError> {
        Ok(())
    }
}

#[derive(Debug, Arbitrary)]
struct ReplyInput {
    seed: [u8; 32],
    ecdsa: bool,
    payload: Vec<u8>,
}

fuzz_target!(|input: ReplyInput| {
    let config = if input.ecdsa {
        KexConfig::default().with_ecdsa_host_key(curvekex_core::EcdsaCurve::NistP256)
    } else {
        KexConfig::default()
    };
    let mut state = KexState::new(config, Transcripts::default());
    state.set_host_key_verifier(|_: &HostKey| true);

    let mut rng = StdRng::from_seed(input.seed);
    if state.begin_exchange(&mut rng, &mut NullTransport).is_err() {
        return;
    }

    if state
        .handle_exchange_reply(&input.payload, &mut NullTransport)
        .is_err()
    {
        assert_eq!(state.phase(), KexPhase::Failed);
    }
    assert!(state.ephemeral_private().is_zeroed());
});
