//! # WireBond Core
//!
//! Zero-copy bridging between serialized chunk sequences and transport wire
//! buffers, and reassembly of inbound frame sequences for typed decoding.
//!
//! This crate provides:
//! - Chunks, chunk sequences and a chunked [`OutputBuffer`] serializer target
//! - [`BufferBridge`] turning chunk sequences into [`WireBuffer`]s without copying
//! - [`FrameSequence`] / [`FrameCursor`] contracts for inbound transports
//! - [`Assembler`] producing a [`ValueView`] from inbound frames
//! - [`Encodable`] / [`Decodable`] / [`Schema`] capabilities and [`Bonded`] values
//! - Error types shared by the outbound and inbound paths

pub mod assembler;
pub mod bonded;
pub mod bridge;
pub mod chunk;
pub mod codec;
pub mod error;
pub mod frame;
mod group;
pub mod output;
pub mod view;
pub mod wire;

pub use assembler::{Assembler, AssemblerConfig, MAX_PAYLOAD_LEN, assemble};
pub use bonded::Bonded;
pub use bridge::{BridgeConfig, BridgeStats, BufferBridge, to_wire_buffer};
pub use chunk::{Chunk, ChunkKind, ChunkSequence};
pub use codec::{Decodable, Encodable, Schema};
pub use error::{Error, ErrorKind, Result};
pub use frame::{FrameCursor, FrameSequence};
pub use output::{ChunkSource, OutputBuffer};
pub use view::{DecodeCursor, ValueView};
pub use wire::{WireBuffer, WireSlice};
