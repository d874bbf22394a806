//! Deterministic payload fixtures.

use bytes::Bytes;
use wirebond_core::OutputBuffer;
use wirebond_transport::VecFrameSequence;

/// Returns `len` bytes of a repeating pattern.
#[must_use]
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Writes a `len` byte payload into blocks of `block_size` bytes.
#[must_use]
pub fn chunked_payload(len: usize, block_size: usize) -> OutputBuffer {
    let mut out = OutputBuffer::with_block_size(block_size);
    out.write_bytes(&pattern(len));
    out
}

/// Splits `payload` into frames of at most `frame_size` bytes.
#[must_use]
pub fn fragment(payload: &Bytes, frame_size: usize) -> VecFrameSequence<Bytes> {
    let frame_size = frame_size.max(1);
    let frames = (0..payload.len())
        .step_by(frame_size)
        .map(|start| payload.slice(start..payload.len().min(start + frame_size)));
    VecFrameSequence::new(frames)
}
