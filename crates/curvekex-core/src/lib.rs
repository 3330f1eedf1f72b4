//! # curvekex core
//!
//! Client side of the SSH `curve25519-sha256` key exchange.
//!
//! This crate provides:
//! - `SSH_MSG_KEX_ECDH_INIT` construction with a fresh ephemeral key
//! - `SSH_MSG_KEX_ECDH_REPLY` validation (host key, server point, signature)
//! - Exchange hash computation and set-once session id
//! - Transport key derivation handed off to the caller's transport
//!
//! ## Flow
//!
//! ```text
//! client                                              server
//!   │  begin_exchange:  KEX_ECDH_INIT (Q_C)             │
//!   │ ───────────────────────────────────────────────▶  │
//!   │                                                   │
//!   │  KEX_ECDH_REPLY (K_S, Q_S, sig over H)            │
//!   │ ◀───────────────────────────────────────────────  │
//!   │  handle_exchange_reply:                           │
//!   │    K = X25519(a, Q_S)                             │
//!   │    H = HASH(V_C ‖ V_S ‖ I_C ‖ I_S ‖ K_S ‖ Q_C ‖ Q_S ‖ K)
//!   │    verify sig, commit session id, derive keys     │
//!   │  NEWKEYS                                          │
//!   │ ───────────────────────────────────────────────▶  │
//! ```
//!
//! The connection owns a [`KexState`] and drives both calls; I/O goes
//! through the [`KexTransport`] it supplies.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod exchange_hash;
pub mod hostkey;
mod initiator;
pub mod keys;
pub mod message;
mod reply;
pub mod session_id;
pub mod state;
pub mod transport;
pub mod wire;

pub use config::KexConfig;
pub use error::KexError;
pub use hostkey::{EcdsaCurve, HostKey, HostKeyType};
pub use keys::{DirectionalKeys, KeySizes, TransportKeys};
pub use message::MessageType;
pub use reply::KexOutcome;
pub use session_id::SessionId;
pub use state::{KexPhase, KexState, Transcripts};
pub use transport::{HostKeyVerifier, KexTransport, KeyDerivationInput, PinnedHostKeys};

/// Key exchange method name
pub const KEX_ALGORITHM: &str = "curve25519-sha256";

/// Pre-standard alias of [`KEX_ALGORITHM`]
pub const KEX_ALGORITHM_LIBSSH: &str = "curve25519-sha256@libssh.org";
