//! Lazily deserialized schema values.

use crate::codec::{Encodable, Schema};
use crate::error::Result;
use crate::output::OutputBuffer;
use crate::view::ValueView;

enum Repr<T> {
    Value(T),
    Payload(ValueView),
}

/// A schema value that is either in memory or still an undecoded payload.
///
/// Payload-backed values are decoded only when asked, and serializing them
/// re-emits the original bytes without decoding or copying.
pub struct Bonded<T> {
    repr: Repr<T>,
}

impl<T: Schema> Bonded<T> {
    /// Wraps an in-memory value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            repr: Repr::Value(value),
        }
    }

    /// Binds `T`'s decoder to an assembled payload without decoding it.
    #[must_use]
    pub fn from_payload(view: ValueView) -> Self {
        Self {
            repr: Repr::Payload(view),
        }
    }

    /// Returns the undecoded payload, if this value is payload-backed.
    #[must_use]
    pub fn payload(&self) -> Option<&ValueView> {
        match &self.repr {
            Repr::Payload(view) => Some(view),
            Repr::Value(_) => None,
        }
    }

    /// Returns true if this value has not been decoded yet.
    #[must_use]
    pub fn is_payload(&self) -> bool {
        matches!(self.repr, Repr::Payload(_))
    }

    /// Decodes the payload, or clones the in-memory value.
    ///
    /// # Errors
    /// Returns the decoder's error if the payload is malformed.
    pub fn deserialize(&self) -> Result<T>
    where
        T: Clone,
    {
        match &self.repr {
            Repr::Value(value) => Ok(value.clone()),
            Repr::Payload(view) => T::decode(&mut view.cursor()),
        }
    }

    /// Consumes the wrapper and returns the value, decoding if needed.
    ///
    /// # Errors
    /// Returns the decoder's error if the payload is malformed.
    pub fn into_value(self) -> Result<T> {
        match self.repr {
            Repr::Value(value) => Ok(value),
            Repr::Payload(view) => T::decode(&mut view.cursor()),
        }
    }

    /// Reinterprets this value under another schema type.
    ///
    /// In-memory values are encoded first; payloads are rebound as they are.
    ///
    /// # Errors
    /// Returns the encoder's error if an in-memory value cannot be encoded.
    pub fn convert<U: Schema>(self) -> Result<Bonded<U>> {
        let view = match self.repr {
            Repr::Payload(view) => view,
            Repr::Value(value) => {
                let mut out = OutputBuffer::new();
                value.encode(&mut out)?;
                ValueView::new(out.freeze())
            }
        };
        Ok(Bonded::from_payload(view))
    }
}

impl<T: Schema> Encodable for Bonded<T> {
    fn encode(&self, out: &mut OutputBuffer) -> Result<()> {
        match &self.repr {
            Repr::Value(value) => value.encode(out),
            Repr::Payload(view) => {
                out.write_blob(view.as_bytes().clone());
                Ok(())
            }
        }
    }
}

impl<T: Schema> From<T> for Bonded<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone> Clone for Bonded<T> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Value(value) => Repr::Value(value.clone()),
            Repr::Payload(view) => Repr::Payload(view.clone()),
        };
        Self { repr }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Bonded<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.repr {
            Repr::Value(value) => f.debug_tuple("Bonded::Value").field(value).finish(),
            Repr::Payload(view) => f
                .debug_struct("Bonded::Payload")
                .field("len", &view.len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkKind;
    use crate::codec::Decodable;
    use crate::error::Error;
    use crate::output::ChunkSource;
    use crate::view::DecodeCursor;
    use bytes::Bytes;

    #[derive(Debug, Clone, PartialEq)]
    struct Quote {
        symbol: String,
        price: i64,
    }

    impl Encodable for Quote {
        fn encode(&self, out: &mut OutputBuffer) -> Result<()> {
            out.write_str(&self.symbol)?;
            out.write_i64_le(self.price);
            Ok(())
        }
    }

    impl Decodable for Quote {
        fn decode(cursor: &mut DecodeCursor<'_>) -> Result<Self> {
            Ok(Self {
                symbol: cursor.read_str()?.to_owned(),
                price: cursor.read_i64_le()?,
            })
        }
    }

    impl Schema for Quote {
        const NAME: &'static str = "test.Quote";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Symbol(String);

    impl Encodable for Symbol {
        fn encode(&self, out: &mut OutputBuffer) -> Result<()> {
            out.write_str(&self.0)
        }
    }

    impl Decodable for Symbol {
        fn decode(cursor: &mut DecodeCursor<'_>) -> Result<Self> {
            Ok(Self(cursor.read_str()?.to_owned()))
        }
    }

    impl Schema for Symbol {
        const NAME: &'static str = "test.Symbol";
    }

    /// Opaque body carried as a single shared blob.
    #[derive(Debug, Clone, PartialEq)]
    struct Attachment(Bytes);

    impl Encodable for Attachment {
        fn encode(&self, out: &mut OutputBuffer) -> Result<()> {
            out.write_blob(self.0.clone());
            Ok(())
        }
    }

    impl Decodable for Attachment {
        fn decode(cursor: &mut DecodeCursor<'_>) -> Result<Self> {
            Ok(Self(Bytes::copy_from_slice(cursor.read_bytes(cursor.remaining())?)))
        }
    }

    impl Schema for Attachment {
        const NAME: &'static str = "test.Attachment";
    }

    fn quote() -> Quote {
        Quote {
            symbol: "AAPL".to_owned(),
            price: 15050,
        }
    }

    fn encoded(value: &Quote) -> Bytes {
        let mut out = OutputBuffer::new();
        value.encode(&mut out).unwrap();
        Bytes::from(out.chunks().to_vec())
    }

    #[test]
    fn test_payload_decodes_lazily() {
        let bonded = Bonded::<Quote>::from_payload(ValueView::new(encoded(&quote())));
        assert!(bonded.is_payload());
        assert_eq!(bonded.deserialize().unwrap(), quote());
        assert_eq!(bonded.into_value().unwrap(), quote());
    }

    #[test]
    fn test_truncated_payload_fails_on_demand() {
        let bytes = encoded(&quote());
        let truncated = bytes.slice(..bytes.len() - 1);
        let bonded = Bonded::<Quote>::from_payload(ValueView::new(truncated));
        assert!(matches!(
            bonded.deserialize(),
            Err(Error::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_payload_reencodes_without_copy() {
        let bytes = encoded(&quote());
        let ptr = bytes.as_ptr();
        let bonded = Bonded::<Quote>::from_payload(ValueView::new(bytes));

        let mut out = OutputBuffer::new();
        bonded.encode(&mut out).unwrap();
        let chunks = out.chunks();
        let chunk = chunks.iter().next().unwrap();
        assert_eq!(chunk.kind(), ChunkKind::Owned);
        assert_eq!(chunk.as_ptr(), ptr);
    }

    #[test]
    fn test_value_encodes_like_inner() {
        let bonded = Bonded::new(quote());
        assert!(!bonded.is_payload());
        assert!(bonded.payload().is_none());

        let mut out = OutputBuffer::new();
        bonded.encode(&mut out).unwrap();
        assert_eq!(out.chunks().to_vec(), encoded(&quote()).to_vec());
    }

    #[test]
    fn test_convert_reads_prefix_as_other_schema() {
        let symbol = Bonded::new(quote()).convert::<Symbol>().unwrap();
        assert_eq!(symbol.into_value().unwrap(), Symbol("AAPL".to_owned()));
    }

    #[test]
    fn test_debug() {
        let bonded = Bonded::<Quote>::from_payload(ValueView::new(encoded(&quote())));
        assert!(format!("{:?}", bonded).contains("Bonded::Payload"));
    }

    #[test]
    fn test_convert_value_keeps_single_block_storage() {
        let body = Bytes::from_static(b"attachment body");
        let ptr = body.as_ptr();
        let converted = Bonded::new(Attachment(body))
            .convert::<Attachment>()
            .unwrap();

        let view = converted.payload().unwrap();
        assert_eq!(view.as_bytes().as_ptr(), ptr);
        assert_eq!(&view.as_bytes()[..], b"attachment body");
    }
}
