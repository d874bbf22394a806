//! # WireBond Transport
//!
//! Transport-side collaborators for the WireBond bridge and assembler.
//!
//! This crate provides:
//! - [`frames`] - In-memory inbound frame sequences
//! - [`framing`] - Length-prefixed framing codecs for byte streams
//! - [`dispatch`] - Typed codec adapter for schema values

pub mod dispatch;
pub mod error;
pub mod frames;
pub mod framing;

pub use dispatch::{BondedCodec, SerializationTraits};
pub use error::TransportError;
pub use frames::{VecFrameCursor, VecFrameSequence, flatten};
pub use framing::{BondedFrameCodec, DEFAULT_MAX_FRAME_SIZE, PayloadFrameCodec};

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
