//! Inbound frame sequence contract implemented by transports.
//!
//! A frame sequence is single-use: the assembler takes it by value, opens at
//! most one cursor over it, and disposes of the cursor and then the sequence
//! exactly once. Ownership makes a second disposal impossible.

/// Sequence of received byte fragments with a declared total length.
pub trait FrameSequence: Sized {
    /// Fragment type yielded by the cursor.
    type Frame: AsRef<[u8]>;

    /// Cursor type borrowing the sequence.
    type Cursor<'a>: FrameCursor<Frame = Self::Frame>
    where
        Self: 'a;

    /// Returns the total length the transport declares for the payload.
    fn declared_len(&self) -> u64;

    /// Opens a cursor over the frames, or `None` if the reader cannot be
    /// initialized.
    fn open_cursor(&mut self) -> Option<Self::Cursor<'_>>;

    /// Releases the sequence and any transport resources behind it.
    fn dispose(self) {}
}

/// Forward-only reader over a [`FrameSequence`].
pub trait FrameCursor: Sized {
    /// Fragment type.
    type Frame: AsRef<[u8]>;

    /// Returns the next frame, or `None` once the sequence is exhausted.
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// Releases the cursor.
    fn dispose(self) {}
}
