//! Inbound payload assembler.
//!
//! Copies the fragments of a [`FrameSequence`] into one contiguous buffer of
//! exactly the declared length and wraps it in a [`ValueView`]. The declared
//! length is checked before anything is allocated.

use crate::error::{Error, Result};
use crate::frame::{FrameCursor, FrameSequence};
use crate::view::ValueView;
use bytes::BytesMut;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest payload the assembler ever accepts.
pub const MAX_PAYLOAD_LEN: u64 = u32::MAX as u64;

/// Configuration for [`Assembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Largest accepted declared length, clamped to [`MAX_PAYLOAD_LEN`].
    pub max_payload_len: u64,
}

impl AssemblerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }

    /// Sets the maximum payload length.
    #[must_use]
    pub const fn max_payload_len(mut self, max_payload_len: u64) -> Self {
        self.max_payload_len = max_payload_len;
        self
    }

    /// Returns the effective limit.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        if self.max_payload_len < MAX_PAYLOAD_LEN {
            self.max_payload_len
        } else {
            MAX_PAYLOAD_LEN
        }
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome counters shared by clones of one [`Assembler`].
#[derive(Debug, Default)]
pub struct AssemblerStats {
    assembled: AtomicU64,
    rejected: AtomicU64,
    reader_failures: AtomicU64,
}

impl AssemblerStats {
    /// Returns the number of payloads assembled.
    #[must_use]
    pub fn assembled(&self) -> u64 {
        self.assembled.load(Ordering::Relaxed)
    }

    /// Returns the number of payloads rejected for their declared length.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Returns the number of frame sequences whose cursor failed to open.
    #[must_use]
    pub fn reader_failures(&self) -> u64 {
        self.reader_failures.load(Ordering::Relaxed)
    }

    /// Returns the number of frame sequences handed to the assembler.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.assembled() + self.rejected() + self.reader_failures()
    }
}

/// Reassembles inbound frame sequences into contiguous payloads.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: AssemblerConfig,
    stats: Arc<AssemblerStats>,
}

impl Assembler {
    /// Creates an assembler with the given configuration.
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            stats: Arc::new(AssemblerStats::default()),
        }
    }

    /// Returns the assembler configuration.
    #[must_use]
    pub const fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Returns the shared outcome counters.
    #[must_use]
    pub fn stats(&self) -> &Arc<AssemblerStats> {
        &self.stats
    }

    /// Assembles `frames` into a single view.
    ///
    /// The sequence is disposed on every path.
    ///
    /// # Errors
    /// - [`Error::SizeLimitExceeded`] if the declared length is over the limit;
    ///   nothing is allocated and no cursor is opened.
    /// - [`Error::ReaderInitFailed`] if the cursor cannot be opened.
    ///
    /// # Panics
    /// Panics if the frames do not add up to exactly the declared length.
    pub fn assemble<S: FrameSequence>(&self, mut frames: S) -> Result<ValueView> {
        let declared = frames.declared_len();
        let limit = self.config.limit();
        let len = match usize::try_from(declared) {
            Ok(len) if declared <= limit => len,
            _ => {
                tracing::warn!(declared, limit, "rejecting oversized payload");
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                frames.dispose();
                return Err(Error::size_limit_exceeded(declared, limit));
            }
        };

        let mut buffer = BytesMut::with_capacity(len);
        let drained = drain_frames(&mut frames, &mut buffer, len);
        frames.dispose();
        if let Err(err) = drained {
            self.stats.reader_failures.fetch_add(1, Ordering::Relaxed);
            return Err(err);
        }

        self.stats.assembled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(len, "assembled inbound payload");
        Ok(ValueView::new(buffer.freeze()))
    }
}

/// Copies every frame into `buffer`, which must end up exactly `len` long.
fn drain_frames<S: FrameSequence>(frames: &mut S, buffer: &mut BytesMut, len: usize) -> Result<()> {
    let Some(mut cursor) = frames.open_cursor() else {
        tracing::warn!(len, "failed to open frame cursor");
        return Err(Error::ReaderInitFailed);
    };

    while let Some(frame) = cursor.next_frame() {
        let bytes = frame.as_ref();
        assert!(
            bytes.len() <= len - buffer.len(),
            "frames exceed declared payload length {len}"
        );
        buffer.extend_from_slice(bytes);
    }
    assert_eq!(
        buffer.len(),
        len,
        "frames do not add up to declared payload length"
    );

    cursor.dispose();
    Ok(())
}

/// Assembles `frames` with the default limit.
///
/// # Errors
/// See [`Assembler::assemble`].
pub fn assemble<S: FrameSequence>(frames: S) -> Result<ValueView> {
    Assembler::default().assemble(frames)
}
