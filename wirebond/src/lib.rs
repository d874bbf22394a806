//! # WireBond
//!
//! Zero-copy bridging between a serializer's chunked output and a
//! transport's scatter/gather wire buffers, plus reassembly of inbound
//! fragments into a contiguous payload for typed decoding.
//!
//! ## Quick Start
//!
//! ```
//! use wirebond::prelude::*;
//!
//! struct Ping {
//!     seq: u64,
//! }
//!
//! impl Encodable for Ping {
//!     fn encode(&self, out: &mut OutputBuffer) -> CoreResult<()> {
//!         out.write_u64_le(self.seq);
//!         Ok(())
//!     }
//! }
//!
//! impl Decodable for Ping {
//!     fn decode(cursor: &mut DecodeCursor<'_>) -> CoreResult<Self> {
//!         Ok(Self { seq: cursor.read_u64_le()? })
//!     }
//! }
//!
//! impl Schema for Ping {
//!     const NAME: &'static str = "Ping";
//! }
//!
//! let codec = BondedCodec::<Ping>::default();
//! let (wire, _) = codec.serialize(&Bonded::new(Ping { seq: 7 })).unwrap();
//!
//! let frames = VecFrameSequence::from_wire_buffer(wire);
//! let ping = codec.deserialize(Some(frames)).unwrap().into_value().unwrap();
//! assert_eq!(ping.seq, 7);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Chunks, bridge, slice groups, assembler and schema traits
//! - [`transport`] - Frame sequences, stream framing and the typed codec adapter

pub mod prelude;

/// Buffer bridging, assembly and schema capabilities.
pub mod core {
    pub use wirebond_core::*;
}

/// Transport-side collaborators.
pub mod transport {
    pub use wirebond_transport::*;
}

pub use wirebond_core::{
    Assembler, AssemblerConfig, Bonded, BridgeConfig, BufferBridge, ChunkSequence, ValueView,
    WireBuffer, WireSlice, assemble, to_wire_buffer,
};

pub use wirebond_transport::{
    BondedCodec, BondedFrameCodec, PayloadFrameCodec, SerializationTraits,
};
