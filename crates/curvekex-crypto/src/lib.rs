//! # curvekex Crypto
//!
//! Cryptographic primitives for the curvekex key exchange.
//!
//! This crate provides:
//! - X25519 ephemeral key generation and scalar multiplication
//! - Ed25519 host key signatures
//! - ECDSA P-256 host key signatures
//! - SHA-2 transcript hashing
//!
//! ## Cryptographic Suite
//!
//! | Function | Algorithm | Security Level |
//! |----------|-----------|----------------|
//! | Key Exchange | X25519 | 128-bit |
//! | Exchange Hash | SHA-256 / SHA-384 / SHA-512 | 128-bit+ collision |
//! | Host Signatures | Ed25519 | 128-bit |
//! | Host Signatures | ECDSA P-256 | 128-bit |
//!
//! Secret values are wiped on drop; ephemeral private keys additionally
//! expose [`x25519::PrivateKey::is_zeroed`] so callers can assert the wipe.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ecdsa;
pub mod ed25519;
pub mod error;
pub mod hash;
pub mod x25519;

pub use error::CryptoError;

/// X25519 public key size
pub const X25519_PUBLIC_KEY_SIZE: usize = 32;

/// X25519 secret key size
pub const X25519_SECRET_KEY_SIZE: usize = 32;

/// Ed25519 public key size
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 signature size
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// P-256 scalar (r, s) size
pub const P256_SCALAR_SIZE: usize = 32;
