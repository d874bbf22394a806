//! Chunked output buffer used as the serializer's write target.
//!
//! [`OutputBuffer`] accumulates little-endian primitives into fixed-size
//! blocks. Full blocks are frozen into shared storage and exposed as owned
//! chunks; the block still being written is exposed as a borrowed chunk that
//! is only valid while the buffer is not touched again.

use crate::chunk::{Chunk, ChunkSequence};
use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};

/// Default block size for [`OutputBuffer`] (4KB).
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Producer of an ordered chunk sequence for one written payload.
pub trait ChunkSource {
    /// Returns the chunks written so far, in wire order.
    fn chunks(&self) -> ChunkSequence<'_>;
}

/// Growable output buffer made of independently allocated blocks.
#[derive(Debug)]
pub struct OutputBuffer {
    sealed: Vec<Bytes>,
    current: BytesMut,
    block_size: usize,
}

impl OutputBuffer {
    /// Creates an output buffer with the default block size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Creates an output buffer with the given block size.
    ///
    /// # Arguments
    /// * `block_size` - Bytes per block, at least 1
    #[must_use]
    pub fn with_block_size(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            sealed: Vec::new(),
            current: BytesMut::with_capacity(block_size),
            block_size,
        }
    }

    /// Returns the block size.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the total number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sealed.iter().map(Bytes::len).sum::<usize>() + self.current.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes raw bytes, spilling into new blocks as needed.
    pub fn write_bytes(&mut self, mut src: &[u8]) {
        while !src.is_empty() {
            let space = self.block_size - self.current.len();
            if space == 0 {
                self.seal();
                continue;
            }
            let take = space.min(src.len());
            self.current.extend_from_slice(&src[..take]);
            src = &src[take..];
        }
    }

    /// Appends a blob by reference, without copying its bytes.
    ///
    /// The block in progress is sealed first so wire order is preserved.
    pub fn write_blob(&mut self, blob: Bytes) {
        if blob.is_empty() {
            return;
        }
        self.seal();
        self.sealed.push(blob);
    }

    /// Writes a u8.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    /// Writes an i8.
    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a u16 in little-endian.
    #[inline]
    pub fn write_u16_le(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a u32 in little-endian.
    #[inline]
    pub fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes an i32 in little-endian.
    #[inline]
    pub fn write_i32_le(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a u64 in little-endian.
    #[inline]
    pub fn write_u64_le(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes an i64 in little-endian.
    #[inline]
    pub fn write_i64_le(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes an f64 in little-endian.
    #[inline]
    pub fn write_f64_le(&mut self, value: f64) {
        self.write_u64_le(value.to_bits());
    }

    /// Writes a u32 length prefix followed by the bytes.
    ///
    /// # Errors
    /// Returns [`Error::SizeLimitExceeded`] if `src` is longer than `u32::MAX`.
    pub fn write_var_bytes(&mut self, src: &[u8]) -> Result<()> {
        let len = u32::try_from(src.len())
            .map_err(|_| Error::size_limit_exceeded(src.len() as u64, u64::from(u32::MAX)))?;
        self.write_u32_le(len);
        self.write_bytes(src);
        Ok(())
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    /// See [`OutputBuffer::write_var_bytes`].
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_var_bytes(value.as_bytes())
    }

    /// Discards everything written so far, keeping the block size.
    ///
    /// Any borrowed chunk obtained earlier is invalidated by the borrow checker.
    pub fn clear(&mut self) {
        self.sealed.clear();
        self.current.clear();
    }

    /// Converts the whole buffer into owned chunks without copying.
    #[must_use]
    pub fn into_chunks(mut self) -> ChunkSequence<'static> {
        self.seal();
        self.sealed.into_iter().map(Chunk::Owned).collect()
    }

    /// Converts the whole buffer into one contiguous payload.
    ///
    /// Output held in a single block is returned as is; output spread over
    /// several blocks is copied once.
    #[must_use]
    pub fn freeze(mut self) -> Bytes {
        match (self.sealed.len(), self.current.is_empty()) {
            (0, _) => self.current.freeze(),
            (1, true) => self.sealed.swap_remove(0),
            _ => {
                let mut joined = BytesMut::with_capacity(self.len());
                for block in &self.sealed {
                    joined.extend_from_slice(block);
                }
                joined.extend_from_slice(&self.current);
                joined.freeze()
            }
        }
    }

    fn seal(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let block = std::mem::replace(
            &mut self.current,
            BytesMut::with_capacity(self.block_size),
        );
        self.sealed.push(block.freeze());
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkSource for OutputBuffer {
    fn chunks(&self) -> ChunkSequence<'_> {
        let mut seq = ChunkSequence::with_capacity(self.sealed.len() + 1);
        for block in &self.sealed {
            seq.push(Chunk::Owned(block.clone()));
        }
        if !self.current.is_empty() {
            seq.push(Chunk::Borrowed(&self.current[..]));
        }
        seq
    }
}
