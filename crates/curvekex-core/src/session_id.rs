//! Set-once session identifier.
//!
//! The exchange hash of the first successful key exchange on a connection
//! becomes its permanent session id. Later re-exchanges never replace it.

use std::fmt;

/// Permanent connection identity, unset until the first exchange completes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionId(Option<Vec<u8>>);

impl SessionId {
    /// Unset session id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an exchange has already fixed the id.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// The fixed id, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }

    /// Fix the id to `exchange_hash` if it is still unset.
    ///
    /// Returns `true` if this call set it. A second call is a no-op and
    /// returns `false`; the original value is kept.
    pub fn commit_once(&mut self, exchange_hash: &[u8]) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(exchange_hash.to_vec());
        true
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(id) => write!(f, "SessionId({})", hex::encode(id)),
            None => f.write_str("SessionId(unset)"),
        }
    }
}
