//! Decodable views over assembled payloads.
//!
//! This module provides:
//! - [`ValueView`], the read-only handle the assembler hands out
//! - [`DecodeCursor`], a bounds-checked little-endian reader used by decoders

use crate::error::{Error, Result};
use bytes::Bytes;

/// Lazily decodable payload; decoding starts at offset zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueView {
    data: Bytes,
}

impl ValueView {
    /// Wraps an assembled buffer.
    #[must_use]
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the view, returning the payload.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Opens a decode cursor at offset zero.
    #[must_use]
    pub fn cursor(&self) -> DecodeCursor<'_> {
        DecodeCursor::new(&self.data)
    }
}

impl AsRef<[u8]> for ValueView {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Sequential reader over a byte slice.
///
/// All multi-byte reads use little-endian byte order.
#[derive(Debug, Clone)]
pub struct DecodeCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> DecodeCursor<'a> {
    /// Creates a cursor at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Returns the current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns true once every byte has been read.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads `len` bytes without copying.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::buffer_too_short(
                self.position.saturating_add(len),
                self.data.len(),
            ));
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    #[inline(always)]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads a u8.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] at the end of the buffer.
    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads an i8.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] at the end of the buffer.
    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_array().map(i8::from_le_bytes)
    }

    /// Reads a u16 in little-endian.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 2 bytes remain.
    #[inline(always)]
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Reads a u32 in little-endian.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 4 bytes remain.
    #[inline(always)]
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Reads an i32 in little-endian.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 4 bytes remain.
    #[inline(always)]
    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Reads a u64 in little-endian.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 8 bytes remain.
    #[inline(always)]
    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Reads an i64 in little-endian.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 8 bytes remain.
    #[inline(always)]
    pub fn read_i64_le(&mut self) -> Result<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Reads an f64 in little-endian.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if fewer than 8 bytes remain.
    #[inline(always)]
    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.read_u64_le().map(f64::from_bits)
    }

    /// Reads a u32 length prefix followed by that many bytes.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if the prefix or the data is cut short.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32_le()? as usize;
        self.read_bytes(len)
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUtf8`] if the bytes are not valid UTF-8.
    pub fn read_str(&mut self) -> Result<&'a str> {
        let offset = self.position + 4;
        let bytes = self.read_var_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { offset })
    }
}
