//! Length-prefixed payload framing.
//!
//! Frame format: `[4-byte length (little-endian)][payload]`. Outbound wire
//! buffers are written slice by slice; inbound frames surface as
//! single-frame [`VecFrameSequence`]s ready for the assembler.
//! [`BondedFrameCodec`] runs the typed codec on top, so a framed stream
//! yields and accepts [`Bonded`] values directly.

use crate::Result;
use crate::dispatch::{BondedCodec, SerializationTraits};
use crate::error::TransportError;
use crate::frames::VecFrameSequence;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use wirebond_core::{AssemblerConfig, Bonded, BridgeConfig, Schema, WireBuffer};

const LENGTH_PREFIX: usize = 4;

/// Default maximum payload size per frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Length-prefixed framing codec for bridged payloads.
#[derive(Debug, Clone)]
pub struct PayloadFrameCodec {
    max_frame_size: usize,
}

impl PayloadFrameCodec {
    /// Creates a new frame codec with the specified maximum frame size.
    ///
    /// The size is clamped to what the length prefix can express.
    ///
    /// # Arguments
    /// * `max_frame_size` - Maximum allowed payload size in bytes
    #[must_use]
    pub fn new(max_frame_size: usize) -> Self {
        let max_frame_size = max_frame_size.min(u32::MAX as usize);
        Self { max_frame_size }
    }

    /// Returns the maximum frame size.
    #[must_use]
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_frame_size {
            return Err(TransportError::frame_too_large(size, self.max_frame_size));
        }
        Ok(())
    }
}

impl Default for PayloadFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for PayloadFrameCodec {
    type Item = VecFrameSequence<Bytes>;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let length = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
        self.check_size(length)?;

        if src.len() < LENGTH_PREFIX + length {
            src.reserve(LENGTH_PREFIX + length - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX);
        let payload = src.split_to(length).freeze();
        tracing::trace!(len = length, "decoded payload frame");
        Ok(Some(VecFrameSequence::single(payload)))
    }
}

impl Encoder<WireBuffer> for PayloadFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: WireBuffer, dst: &mut BytesMut) -> Result<()> {
        let len = item.len();
        self.check_size(len)?;

        dst.reserve(LENGTH_PREFIX + len);
        dst.put_u32_le(len as u32);
        for slice in &item {
            dst.put_slice(slice);
        }
        tracing::trace!(len, slices = item.slice_count(), "encoded payload frame");
        // Dropping `item` here releases every slice back to its group.
        Ok(())
    }
}

impl Encoder<&[u8]> for PayloadFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        self.check_size(item.len())?;

        dst.reserve(LENGTH_PREFIX + item.len());
        dst.put_u32_le(item.len() as u32);
        dst.put_slice(item);
        Ok(())
    }
}

/// Framing codec that assembles and bridges [`Bonded`] values.
///
/// Assembly and encoding failures surface as [`TransportError::Codec`].
#[derive(Debug)]
pub struct BondedFrameCodec<T> {
    framing: PayloadFrameCodec,
    codec: BondedCodec<T>,
}

impl<T: Schema> BondedFrameCodec<T> {
    /// Creates a codec from a framing layer and a typed codec.
    #[must_use]
    pub fn new(framing: PayloadFrameCodec, codec: BondedCodec<T>) -> Self {
        Self { framing, codec }
    }

    /// Creates a codec whose assembler limit matches the frame size limit.
    #[must_use]
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        let framing = PayloadFrameCodec::new(max_frame_size);
        let limit = framing.max_frame_size() as u64;
        let codec = BondedCodec::new(
            BridgeConfig::default(),
            AssemblerConfig::new().max_payload_len(limit),
        );
        Self::new(framing, codec)
    }

    /// Returns the typed codec.
    #[must_use]
    pub fn codec(&self) -> &BondedCodec<T> {
        &self.codec
    }
}

impl<T: Schema> Default for BondedFrameCodec<T> {
    fn default() -> Self {
        Self::new(PayloadFrameCodec::default(), BondedCodec::default())
    }
}

impl<T: Schema> Decoder for BondedFrameCodec<T> {
    type Item = Bonded<T>;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bonded<T>>> {
        let Some(frames) = self.framing.decode(src)? else {
            return Ok(None);
        };
        Ok(Some(self.codec.deserialize(Some(frames))?))
    }
}

impl<T: Schema> Encoder<Bonded<T>> for BondedFrameCodec<T> {
    type Error = TransportError;

    fn encode(&mut self, item: Bonded<T>, dst: &mut BytesMut) -> Result<()> {
        let (wire, _owned) = self.codec.serialize(&item)?;
        self.framing.encode(wire, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use tokio_util::codec::Framed;
    use wirebond_core::{
        BufferBridge, ChunkSource, Decodable, DecodeCursor, Encodable, Error, OutputBuffer,
        WireSlice, assemble,
    };

    fn take_payload(frames: VecFrameSequence<Bytes>) -> Bytes {
        assemble(frames).unwrap().into_bytes()
    }

    #[test]
    fn test_encode_decode() {
        let mut codec = PayloadFrameCodec::new(1024);
        let mut buf = BytesMut::new();

        let data = b"Hello, payload!";
        codec.encode(data.as_slice(), &mut buf).unwrap();
        assert_eq!(buf.len(), 4 + data.len());

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&take_payload(decoded)[..], data);
    }

    #[test]
    fn test_encode_wire_buffer_releases_slices() {
        let bridge = BufferBridge::default();
        let mut out = OutputBuffer::with_block_size(3);
        out.write_bytes(b"0123456789");
        let wire = bridge.bridge(out.chunks());
        assert_eq!(wire.slice_count(), 4);

        let mut codec = PayloadFrameCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(wire, &mut buf).unwrap();

        assert_eq!(bridge.stats().live_groups(), 0);
        assert_eq!(&buf[..4], &10u32.to_le_bytes());
        assert_eq!(&buf[4..], b"0123456789");
    }

    #[test]
    fn test_partial_frame() {
        let mut codec = PayloadFrameCodec::new(1024);
        let mut buf = BytesMut::new();

        buf.put_u8(10);
        buf.put_u8(0);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.put_u8(0);
        buf.put_u8(0);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.put_slice(&[7u8; 10]);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(take_payload(decoded).len(), 10);
    }

    #[test]
    fn test_frame_too_large() {
        let mut codec = PayloadFrameCodec::new(100);
        let mut buf = BytesMut::new();
        buf.put_u32_le(200);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            TransportError::FrameTooLarge { size: 200, max: 100 }
        ));
    }

    #[test]
    fn test_encode_too_large() {
        let mut codec = PayloadFrameCodec::new(10);
        let mut buf = BytesMut::new();

        let data = [0u8; 20];
        assert!(codec.encode(data.as_slice(), &mut buf).is_err());
        assert!(buf.is_empty());

        let wire = WireBuffer::from_slices(vec![WireSlice::from_static(&[0u8; 11])], true);
        assert!(codec.encode(wire, &mut buf).is_err());
    }

    #[test]
    fn test_max_frame_size_is_clamped() {
        let codec = PayloadFrameCodec::new(usize::MAX);
        assert_eq!(codec.max_frame_size(), u32::MAX as usize);
        assert_eq!(
            PayloadFrameCodec::default().max_frame_size(),
            DEFAULT_MAX_FRAME_SIZE
        );
    }

    #[test]
    fn test_multiple_frames() {
        let mut codec = PayloadFrameCodec::new(1024);
        let mut buf = BytesMut::new();

        codec.encode(b"frame1".as_slice(), &mut buf).unwrap();
        codec.encode(b"".as_slice(), &mut buf).unwrap();
        codec.encode(b"frame3".as_slice(), &mut buf).unwrap();

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&take_payload(first)[..], b"frame1");
        let empty = codec.decode(&mut buf).unwrap().unwrap();
        assert!(take_payload(empty).is_empty());
        let third = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&take_payload(third)[..], b"frame3");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: u64,
        symbol: String,
        price: f64,
    }

    impl Encodable for Order {
        fn encode(&self, out: &mut OutputBuffer) -> wirebond_core::Result<()> {
            out.write_u64_le(self.id);
            out.write_str(&self.symbol)?;
            out.write_f64_le(self.price);
            Ok(())
        }
    }

    impl Decodable for Order {
        fn decode(cursor: &mut DecodeCursor<'_>) -> wirebond_core::Result<Self> {
            Ok(Self {
                id: cursor.read_u64_le()?,
                symbol: cursor.read_str()?.to_owned(),
                price: cursor.read_f64_le()?,
            })
        }
    }

    impl Schema for Order {
        const NAME: &'static str = "Order";
    }

    #[tokio::test]
    async fn test_round_trip_over_stream() {
        let (client, server) = tokio::io::duplex(1024);
        let mut tx = Framed::new(client, PayloadFrameCodec::default());
        let mut rx = Framed::new(server, PayloadFrameCodec::default());

        let codec = BondedCodec::<Order>::default();
        let orders: Vec<Order> = (0..3)
            .map(|i| Order {
                id: i,
                symbol: format!("SYM{i}"),
                price: 100.0 + i as f64,
            })
            .collect();

        let expected = orders.clone();
        let sender = tokio::spawn(async move {
            let codec = BondedCodec::<Order>::default();
            for order in &orders {
                let wire = codec.serialize_value(order).unwrap();
                tx.send(wire).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while received.len() < expected.len() {
            let frames = rx.next().await.unwrap().unwrap();
            let bonded = codec.deserialize(Some(frames)).unwrap();
            received.push(bonded.into_value().unwrap());
        }
        sender.await.unwrap();

        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn test_bonded_frames_over_stream() {
        let (client, server) = tokio::io::duplex(1024);
        let mut tx = Framed::new(client, BondedFrameCodec::<Order>::default());
        let mut rx = Framed::new(server, BondedFrameCodec::<Order>::default());

        let order = Order {
            id: 7,
            symbol: "ACME".to_owned(),
            price: 12.5,
        };
        tx.send(Bonded::new(order.clone())).await.unwrap();
        drop(tx);

        let bonded = rx.next().await.unwrap().unwrap();
        assert!(bonded.is_payload());
        assert_eq!(bonded.into_value().unwrap(), order);
        assert!(rx.next().await.is_none());
        assert_eq!(rx.codec().codec().assembler().stats().assembled(), 1);
    }

    #[test]
    fn test_bonded_decode_reports_assembler_error() {
        let codec = BondedCodec::<Order>::new(
            BridgeConfig::default(),
            AssemblerConfig::new().max_payload_len(4),
        );
        let mut bonded = BondedFrameCodec::new(PayloadFrameCodec::new(1024), codec);

        let mut buf = BytesMut::new();
        bonded.framing.encode(&[0u8; 5][..], &mut buf).unwrap();
        let err = bonded.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Codec(Error::SizeLimitExceeded { declared: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_bonded_encode_respects_frame_limit() {
        let mut codec = BondedFrameCodec::<Order>::with_max_frame_size(8);
        assert_eq!(codec.codec().assembler().config().limit(), 8);

        let mut buf = BytesMut::new();
        let order = Order {
            id: 1,
            symbol: "TOO LONG".to_owned(),
            price: 1.0,
        };
        let err = codec.encode(Bonded::new(order), &mut buf).unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { max: 8, .. }));
        assert!(buf.is_empty());
        assert_eq!(codec.codec().bridge().stats().live_groups(), 0);
    }
}
