//! Typed codec adapter plugged into the dispatch layer.
//!
//! The dispatch layer only ever sees wire buffers going out and frame
//! sequences coming in. [`BondedCodec`] connects those to a schema type by
//! running the bridge on the way out and the assembler on the way in.

use std::marker::PhantomData;
use wirebond_core::{
    Assembler, AssemblerConfig, Bonded, BridgeConfig, BufferBridge, Encodable, Error,
    FrameSequence, OutputBuffer, Result, Schema, WireBuffer,
};

/// Serialization hooks the dispatch layer calls for one message type.
pub trait SerializationTraits: Send + Sync {
    /// Message type handled by this codec.
    type Message;

    /// Serializes a message into a wire buffer.
    ///
    /// The returned flag is true when the buffer owns its storage and the
    /// transport must release every slice when done.
    ///
    /// # Errors
    /// Returns an error if the message cannot be encoded.
    fn serialize(&self, message: &Self::Message) -> Result<(WireBuffer, bool)>;

    /// Deserializes a received frame sequence.
    ///
    /// # Errors
    /// - [`Error::NoPayload`] if no frames were received
    /// - any error reported by the assembler
    fn deserialize<S: FrameSequence>(&self, frames: Option<S>) -> Result<Self::Message>;
}

/// Codec adapter for [`Bonded`] schema values.
#[derive(Debug)]
pub struct BondedCodec<T> {
    bridge: BufferBridge,
    assembler: Assembler,
    _schema: PhantomData<fn() -> T>,
}

impl<T: Schema> BondedCodec<T> {
    /// Creates a codec with the given bridge and assembler configuration.
    #[must_use]
    pub fn new(bridge: BridgeConfig, assembler: AssemblerConfig) -> Self {
        Self {
            bridge: BufferBridge::new(bridge),
            assembler: Assembler::new(assembler),
            _schema: PhantomData,
        }
    }

    /// Returns the underlying bridge, e.g. to inspect its stats.
    #[must_use]
    pub fn bridge(&self) -> &BufferBridge {
        &self.bridge
    }

    /// Returns the underlying assembler.
    #[must_use]
    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// Serializes a plain value straight into a wire buffer.
    ///
    /// # Errors
    /// Returns the encoder's error.
    pub fn serialize_value(&self, value: &T) -> Result<WireBuffer> {
        let mut out = OutputBuffer::new();
        value.encode(&mut out)?;
        Ok(self.bridge.bridge(out.into_chunks()))
    }
}

impl<T: Schema> Default for BondedCodec<T> {
    fn default() -> Self {
        Self::new(BridgeConfig::default(), AssemblerConfig::default())
    }
}

impl<T: Schema> SerializationTraits for BondedCodec<T> {
    type Message = Bonded<T>;

    fn serialize(&self, message: &Bonded<T>) -> Result<(WireBuffer, bool)> {
        let mut out = OutputBuffer::new();
        message.encode(&mut out)?;
        let wire = self.bridge.bridge(out.into_chunks());
        tracing::trace!(
            schema = T::NAME,
            bytes = wire.len(),
            slices = wire.slice_count(),
            "serialized message"
        );
        Ok((wire, true))
    }

    fn deserialize<S: FrameSequence>(&self, frames: Option<S>) -> Result<Bonded<T>> {
        let Some(frames) = frames else {
            tracing::debug!(schema = T::NAME, "no frames to deserialize");
            return Err(Error::NoPayload);
        };
        let view = self.assembler.assemble(frames)?;
        Ok(Bonded::from_payload(view))
    }
}
