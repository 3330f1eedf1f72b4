//! SSH binary packet field encoding (RFC 4251 §5).
//!
//! Readers are zero-copy over the received payload. All multi-byte
//! integers are big-endian; strings are `u32` length-prefixed.

use crate::error::KexError;
use zeroize::Zeroizing;

/// Largest string this codec will accept or emit.
pub const MAX_STRING_LEN: usize = 256 * 1024;

/// Sequential reader over a message payload.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    /// Start reading at the beginning of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], KexError> {
        if len > self.remaining() {
            return Err(KexError::MalformedMessage("message incomplete"));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] at end of input.
    pub fn get_u8(&mut self) -> Result<u8, KexError> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] if fewer than four bytes remain.
    pub fn get_u32(&mut self) -> Result<u32, KexError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a length-prefixed opaque string.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] if the length exceeds
    /// [`MAX_STRING_LEN`] or the remaining input.
    pub fn get_string(&mut self) -> Result<&'a [u8], KexError> {
        let len = self.get_u32()? as usize;
        if len > MAX_STRING_LEN {
            return Err(KexError::MalformedMessage("string too large"));
        }
        self.take(len)
    }

    /// Assert the payload has been fully consumed.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] if any bytes remain.
    pub fn get_end(&self) -> Result<(), KexError> {
        if self.remaining() != 0 {
            return Err(KexError::MalformedMessage("unexpected trailing data"));
        }
        Ok(())
    }
}

/// Append-only message builder.
#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(&mut self, additional: usize) -> Result<(), KexError> {
        self.buf
            .try_reserve(additional)
            .map_err(|_| KexError::AllocationFailure)
    }

    /// Append one byte.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn put_u8(&mut self, value: u8) -> Result<(), KexError> {
        self.reserve(1)?;
        self.buf.push(value);
        Ok(())
    }

    /// Append a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn put_u32(&mut self, value: u32) -> Result<(), KexError> {
        self.reserve(4)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Append raw bytes with no length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::AllocationFailure`] if the buffer cannot grow.
    pub fn put_raw(&mut self, data: &[u8]) -> Result<(), KexError> {
        self.reserve(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Append a length-prefixed opaque string.
    ///
    /// # Errors
    ///
    /// Returns [`KexError::MalformedMessage`] for strings longer than
    /// [`MAX_STRING_LEN`], [`KexError::AllocationFailure`] if the buffer
    /// cannot grow.
    pub fn put_string(&mut self, data: &[u8]) -> Result<(), KexError> {
        if data.len() > MAX_STRING_LEN {
            return Err(KexError::MalformedMessage("string too large"));
        }
        self.reserve(4 + data.len())?;
        self.put_u32(data.len() as u32)?;
        self.put_raw(data)
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode an unsigned big-endian magnitude as an SSH `mpint`, including
/// its length prefix.
///
/// Leading zero bytes are stripped, a single `0x00` is prepended when the
/// most significant bit is set, and zero encodes as the empty string. The
/// output is wiped on drop since callers use it for shared secrets.
///
/// # Errors
///
/// Returns [`KexError::AllocationFailure`] if the buffer cannot be allocated.
pub fn encode_mpint(magnitude: &[u8]) -> Result<Zeroizing<Vec<u8>>, KexError> {
    let start = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let digits = &magnitude[start..];
    let pad = usize::from(digits.first().is_some_and(|&b| b & 0x80 != 0));
    let body_len = digits.len() + pad;

    let mut out = Zeroizing::new(Vec::new());
    out.try_reserve_exact(4 + body_len)
        .map_err(|_| KexError::AllocationFailure)?;
    out.extend_from_slice(&(body_len as u32).to_be_bytes());
    if pad == 1 {
        out.push(0);
    }
    out.extend_from_slice(digits);
    Ok(out)
}
