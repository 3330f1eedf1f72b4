//! End-to-end tests of the client exchange against a simulated server.

use curvekex_core::keys::derive_transport_keys;
use curvekex_core::message::EcdhReply;
use curvekex_core::wire::PacketWriter;
use curvekex_core::{
    EcdsaCurve, HostKey, HostKeyType, KexConfig, KexError, KexPhase, KexState, KeyDerivationInput, KeySizes,
    MessageType, PinnedHostKeys, Transcripts,
};
use curvekex_crypto::hash::HashAlgorithm;
use curvekex_integration_tests::{
    RecordingTransport, SimulatedReply, SimulatedServer, Tamper, init_tracing,
    sample_transcripts, trusting_client,
};
use rand_core::OsRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run `begin_exchange` and return the server's reply to it.
fn start(
    state: &mut KexState,
    server: &SimulatedServer,
    transport: &mut RecordingTransport,
    tamper: Tamper,
) -> SimulatedReply {
    state.begin_exchange(&mut OsRng, transport).unwrap();
    server.respond_with(transport.last_init(), tamper)
}

// ============================================================================
// Successful Exchanges
// ============================================================================

#[test]
fn test_full_exchange_ed25519() {
    init_tracing();
    let server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let outcome = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap();

    assert_eq!(state.phase(), KexPhase::SessionEstablished);
    assert!(outcome.session_id_committed());
    assert_eq!(outcome.host_key_algorithm(), "ssh-ed25519");
    assert_eq!(outcome.host_key_fingerprint(), server.host_key().fingerprint());

    // Both sides agree on K and H; the first H becomes the session id
    let derived = &transport.derivations[0];
    assert_eq!(derived.shared_secret, reply.shared_secret);
    assert_eq!(derived.exchange_hash, reply.exchange_hash);
    assert_eq!(state.session_id().as_bytes(), Some(reply.exchange_hash.as_slice()));
    assert_eq!(derived.session_id, reply.exchange_hash);

    assert_eq!(
        transport.sent_types(),
        vec![MessageType::KexEcdhInit, MessageType::NewKeys]
    );
    assert!(transport.sent[1].1.is_empty());
    assert!(state.ephemeral_private().is_zeroed());
}

#[test]
fn test_full_exchange_ecdsa_p256() {
    let server = SimulatedServer::ecdsa_p256();
    let mut state = trusting_client(KexConfig::default().with_ecdsa_host_key(EcdsaCurve::NistP256));
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let outcome = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap();

    assert_eq!(outcome.host_key_algorithm(), "ecdsa-sha2-nistp256");
    assert_eq!(state.session_id().as_bytes(), Some(reply.exchange_hash.as_slice()));
    assert_eq!(transport.installed.len(), 1);
}

#[test]
fn test_installed_keys_match_server_schedule() {
    let server = SimulatedServer::ed25519();
    let sizes = KeySizes {
        iv_len: 16,
        cipher_key_len: 64,
        mac_key_len: 0,
    };
    let mut state = trusting_client(KexConfig::default().with_key_sizes(sizes));
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap();

    let expected = derive_transport_keys(&KeyDerivationInput {
        hash_algorithm: HashAlgorithm::Sha256,
        key_sizes: &sizes,
        session_id: &reply.exchange_hash,
        exchange_hash: &reply.exchange_hash,
        shared_secret: &reply.shared_secret,
    })
    .unwrap();

    let installed = &transport.installed[0];
    assert_eq!(installed.client_to_server.iv(), expected.client_to_server.iv());
    assert_eq!(
        installed.server_to_client.cipher_key(),
        expected.server_to_client.cipher_key()
    );
    assert_eq!(installed.client_to_server.cipher_key().len(), 64);
    assert!(installed.client_to_server.mac_key().is_empty());
}

#[test]
fn test_reexchange_keeps_session_id() {
    let server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();

    let first = start(&mut state, &server, &mut transport, Tamper::None);
    state
        .handle_exchange_reply(&first.payload, &mut transport)
        .unwrap();

    let second = start(&mut state, &server, &mut transport, Tamper::None);
    let outcome = state
        .handle_exchange_reply(&second.payload, &mut transport)
        .unwrap();

    assert!(!outcome.session_id_committed());
    assert_ne!(first.exchange_hash, second.exchange_hash);
    assert_eq!(state.session_id().as_bytes(), Some(first.exchange_hash.as_slice()));

    let derived = &transport.derivations[1];
    assert_eq!(derived.session_id, first.exchange_hash);
    assert_eq!(derived.exchange_hash, second.exchange_hash);
}

#[test]
fn test_reexchange_with_new_transcripts() {
    let mut server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();

    let first = start(&mut state, &server, &mut transport, Tamper::None);
    state
        .handle_exchange_reply(&first.payload, &mut transport)
        .unwrap();

    let rekey = Transcripts {
        client_kexinit: b"rekey client kexinit".to_vec(),
        server_kexinit: b"rekey server kexinit".to_vec(),
        ..sample_transcripts()
    };
    state.set_transcripts(rekey.clone()).unwrap();
    server.transcripts = rekey;

    let second = start(&mut state, &server, &mut transport, Tamper::None);
    assert!(state
        .handle_exchange_reply(&second.payload, &mut transport)
        .is_ok());
}

#[test]
fn test_pinned_host_key_accepted() {
    let server = SimulatedServer::ed25519();
    let mut pins = PinnedHostKeys::new();
    pins.pin(server.host_key());

    let mut state = KexState::new(KexConfig::default(), sample_transcripts());
    state.set_host_key_verifier(pins);
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    assert!(state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .is_ok());
}

// ============================================================================
// Rejected Replies
// ============================================================================

/// Run a full exchange against a tampered reply and return the error.
fn reject_with(tamper: Tamper) -> (KexState, RecordingTransport, KexError) {
    init_tracing();
    let server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, tamper);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();
    (state, transport, err)
}

fn assert_failed_cleanly(state: &KexState, transport: &RecordingTransport) {
    assert_eq!(state.phase(), KexPhase::Failed);
    assert!(state.ephemeral_private().is_zeroed());
    assert!(!state.session_id().is_set());
    assert!(transport.installed.is_empty());
    assert_eq!(transport.sent_types(), vec![MessageType::KexEcdhInit]);
}

#[test]
fn test_flipped_signature_rejected() {
    let (state, transport, err) = reject_with(Tamper::FlipSignatureBit);
    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_flipped_ecdsa_signature_rejected() {
    let server = SimulatedServer::ecdsa_p256();
    let mut state = trusting_client(KexConfig::default().with_ecdsa_host_key(EcdsaCurve::NistP256));
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::FlipSignatureBit);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();
    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_trailing_bytes_rejected() {
    let (state, transport, err) = reject_with(Tamper::TrailingBytes);
    assert!(matches!(err, KexError::MalformedMessage(_)));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_short_server_public_rejected() {
    let (state, transport, err) = reject_with(Tamper::ReplaceServerPublic(vec![0x09; 31]));
    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_long_server_public_rejected() {
    let (state, transport, err) = reject_with(Tamper::ReplaceServerPublic(vec![0x09; 33]));
    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_low_order_server_public_rejected() {
    let (state, transport, err) = reject_with(Tamper::ReplaceServerPublic(vec![0; 32]));
    assert!(matches!(err, KexError::PrimitiveFailure(_)));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_host_key_type_mismatch_skips_verifier() {
    let server = SimulatedServer::ed25519();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mut state = KexState::new(
        KexConfig::default().with_ecdsa_host_key(EcdsaCurve::NistP256),
        sample_transcripts(),
    );
    state.set_host_key_verifier(move |_: &HostKey| {
        seen.fetch_add(1, Ordering::SeqCst);
        true
    });
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::KeyTypeMismatch));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_failed_cleanly(&state, &transport);
}

/// ECDSA client state with a verifier that counts its calls.
fn counting_ecdsa_client(config: KexConfig) -> (KexState, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut state = KexState::new(config, sample_transcripts());
    state.set_host_key_verifier(move |_: &HostKey| {
        seen.fetch_add(1, Ordering::SeqCst);
        true
    });
    (state, calls)
}

#[test]
fn test_ecdsa_config_without_curve_rejects_p256() {
    init_tracing();
    let server = SimulatedServer::ecdsa_p256();
    let (mut state, calls) = counting_ecdsa_client(KexConfig {
        host_key_type: HostKeyType::Ecdsa,
        host_key_curve: None,
        ..Default::default()
    });
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::KeyTypeMismatch));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_p256_host_key_rejected_for_p384_config() {
    let server = SimulatedServer::ecdsa_p256();
    let (mut state, calls) =
        counting_ecdsa_client(KexConfig::default().with_ecdsa_host_key(EcdsaCurve::NistP384));
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::KeyTypeMismatch));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_untrusted_host_rejected() {
    let server = SimulatedServer::ed25519();
    let other = SimulatedServer::ed25519();
    let mut pins = PinnedHostKeys::new();
    pins.pin(other.host_key());

    let mut state = KexState::new(KexConfig::default(), sample_transcripts());
    state.set_host_key_verifier(pins);
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_transcript_mismatch_rejected() {
    let mut server = SimulatedServer::ed25519();
    server.transcripts.server_version = b"SSH-2.0-Impostor".to_vec();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_p384_host_key_signature_unsupported() {
    let mut state = trusting_client(KexConfig::default().with_ecdsa_host_key(EcdsaCurve::NistP384));
    let mut transport = RecordingTransport::default();
    state.begin_exchange(&mut OsRng, &mut transport).unwrap();

    let mut point = vec![0x04];
    point.extend_from_slice(&[0x11; 96]);
    let mut blob = PacketWriter::new();
    blob.put_string(b"ecdsa-sha2-nistp384").unwrap();
    blob.put_string(b"nistp384").unwrap();
    blob.put_string(&point).unwrap();

    let signature = curvekex_core::hostkey::encode_ecdsa_signature(
        EcdsaCurve::NistP384,
        &[0x01; 48],
        &[0x02; 48],
    )
    .unwrap();
    let server_public = curvekex_crypto::x25519::PrivateKey::generate(&mut OsRng)
        .unwrap()
        .public_key();
    let payload = EcdhReply {
        host_key_blob: blob.as_bytes(),
        server_public: server_public.as_bytes(),
        signature: &signature,
    }
    .encode()
    .unwrap();

    let err = state
        .handle_exchange_reply(&payload, &mut transport)
        .unwrap_err();
    assert!(matches!(err, KexError::SignatureInvalid));
    assert_failed_cleanly(&state, &transport);
}

#[test]
fn test_garbage_host_key_is_malformed() {
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();
    state.begin_exchange(&mut OsRng, &mut transport).unwrap();

    let payload = EcdhReply {
        host_key_blob: b"\x00\x00\x00\x07ssh-rsa",
        server_public: &[0x09; 32],
        signature: b"",
    }
    .encode()
    .unwrap();

    let err = state
        .handle_exchange_reply(&payload, &mut transport)
        .unwrap_err();
    assert!(matches!(err, KexError::MalformedMessage(_)));
    assert_failed_cleanly(&state, &transport);
}

// ============================================================================
// Lifecycle and Transport Errors
// ============================================================================

#[test]
fn test_reply_without_verifier_is_invalid_argument() {
    let server = SimulatedServer::ed25519();
    let mut state = KexState::new(KexConfig::default(), sample_transcripts());
    let mut transport = RecordingTransport::default();

    let err = state
        .handle_exchange_reply(server.host_key().blob(), &mut transport)
        .unwrap_err();
    assert!(matches!(err, KexError::InvalidArgument(_)));
    assert_eq!(err.code(), -10);
}

#[test]
fn test_duplicate_reply_is_invalid_state() {
    let server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap();

    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();
    assert!(matches!(err, KexError::InvalidState));
    assert_eq!(state.phase(), KexPhase::Failed);
    assert_eq!(transport.installed.len(), 1);
}

#[test]
fn test_failed_state_is_terminal() {
    let (mut state, mut transport, _) = reject_with(Tamper::FlipSignatureBit);
    assert!(matches!(
        state.begin_exchange(&mut OsRng, &mut transport),
        Err(KexError::InvalidState)
    ));
}

#[test]
fn test_newkeys_send_failure_propagates() {
    let server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport {
        fail_send: Some(MessageType::NewKeys),
        ..Default::default()
    };

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::Transport(_)));
    assert_eq!(state.phase(), KexPhase::Failed);
    assert!(state.ephemeral_private().is_zeroed());
}

#[test]
fn test_key_install_failure_skips_newkeys() {
    let server = SimulatedServer::ed25519();
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport {
        fail_install: true,
        ..Default::default()
    };

    let reply = start(&mut state, &server, &mut transport, Tamper::None);
    let err = state
        .handle_exchange_reply(&reply.payload, &mut transport)
        .unwrap_err();

    assert!(matches!(err, KexError::Transport(_)));
    assert_eq!(transport.sent_types(), vec![MessageType::KexEcdhInit]);
}

#[test]
fn test_abandon_mid_exchange() {
    let mut state = trusting_client(KexConfig::default());
    let mut transport = RecordingTransport::default();
    state.begin_exchange(&mut OsRng, &mut transport).unwrap();
    assert!(!state.ephemeral_private().is_zeroed());

    state.abandon();
    assert!(state.ephemeral_private().is_zeroed());
    assert_eq!(state.phase(), KexPhase::Failed);
}
