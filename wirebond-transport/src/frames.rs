//! In-memory inbound frame sequences.
//!
//! [`VecFrameSequence`] is the frame sequence a transport hands to the
//! assembler once it has received every fragment of a payload. Frames can be
//! any byte container, including the [`WireSlice`]s of an outbound buffer, in
//! which case each slice is released as soon as the assembler has copied it.

use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;
use wirebond_core::{FrameCursor, FrameSequence, WireBuffer, WireSlice};

/// Received fragments of one payload, in arrival order.
#[derive(Debug)]
pub struct VecFrameSequence<F> {
    frames: VecDeque<F>,
    declared: u64,
}

impl<F: AsRef<[u8]>> VecFrameSequence<F> {
    /// Creates a sequence whose declared length is the sum of its frames.
    pub fn new(frames: impl IntoIterator<Item = F>) -> Self {
        let frames: VecDeque<F> = frames.into_iter().collect();
        let declared = frames.iter().map(|f| f.as_ref().len() as u64).sum();
        Self { frames, declared }
    }

    /// Overrides the declared length reported to the assembler.
    #[must_use]
    pub fn with_declared_len(mut self, declared: u64) -> Self {
        self.declared = declared;
        self
    }

    /// Returns the number of frames not yet consumed.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl VecFrameSequence<Bytes> {
    /// Creates a sequence holding one frame.
    #[must_use]
    pub fn single(payload: Bytes) -> Self {
        Self::new([payload])
    }
}

impl VecFrameSequence<WireSlice> {
    /// Treats every slice of `buffer` as one received frame, without copying.
    #[must_use]
    pub fn from_wire_buffer(buffer: WireBuffer) -> Self {
        Self::new(buffer)
    }
}

impl<F: AsRef<[u8]>> FrameSequence for VecFrameSequence<F> {
    type Frame = F;
    type Cursor<'a>
        = VecFrameCursor<'a, F>
    where
        Self: 'a;

    fn declared_len(&self) -> u64 {
        self.declared
    }

    fn open_cursor(&mut self) -> Option<VecFrameCursor<'_, F>> {
        Some(VecFrameCursor {
            frames: &mut self.frames,
        })
    }

    fn dispose(self) {
        if !self.frames.is_empty() {
            tracing::debug!(
                remaining = self.frames.len(),
                "disposing frame sequence with unread frames"
            );
        }
    }
}

/// Cursor popping frames off a [`VecFrameSequence`].
#[derive(Debug)]
pub struct VecFrameCursor<'a, F> {
    frames: &'a mut VecDeque<F>,
}

impl<F: AsRef<[u8]>> FrameCursor for VecFrameCursor<'_, F> {
    type Frame = F;

    fn next_frame(&mut self) -> Option<F> {
        self.frames.pop_front()
    }
}

/// Copies a wire buffer into one contiguous frame.
#[must_use]
pub fn flatten(buffer: &WireBuffer) -> Bytes {
    let mut out = BytesMut::with_capacity(buffer.len());
    for slice in buffer {
        out.put_slice(slice);
    }
    out.freeze()
}
