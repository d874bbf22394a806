//! Prelude module for convenient imports.
//!
//! ```
//! use wirebond::prelude::*;
//! ```

// Core types
pub use wirebond_core::error::{Error as CoreError, ErrorKind, Result as CoreResult};
pub use wirebond_core::{
    Assembler, AssemblerConfig, Bonded, BridgeConfig, BridgeStats, BufferBridge, Chunk,
    ChunkKind, ChunkSequence, ChunkSource, Decodable, DecodeCursor, Encodable, FrameCursor,
    FrameSequence, OutputBuffer, Schema, ValueView, WireBuffer, WireSlice,
};

// Transport types
pub use wirebond_transport::{
    BondedCodec, BondedFrameCodec, PayloadFrameCodec, SerializationTraits, TransportError,
    VecFrameSequence,
};
