//! Schema capability traits.
//!
//! Generated schema types implement [`Encodable`] and [`Decodable`] directly
//! and opt into wire dispatch through [`Schema`]. The codec adapters are only
//! available for types carrying that capability.

use crate::error::Result;
use crate::output::OutputBuffer;
use crate::view::DecodeCursor;

/// Types that can write themselves into an [`OutputBuffer`].
pub trait Encodable {
    /// Encodes `self` at the end of `out`.
    ///
    /// # Errors
    /// Returns an error if a field cannot be represented on the wire.
    fn encode(&self, out: &mut OutputBuffer) -> Result<()>;
}

/// Types that can read themselves from a [`DecodeCursor`].
pub trait Decodable: Sized {
    /// Decodes a value starting at the cursor position.
    ///
    /// # Errors
    /// Returns an error if the bytes are truncated or malformed.
    fn decode(cursor: &mut DecodeCursor<'_>) -> Result<Self>;
}

/// Marker for schema-generated payload types.
///
/// # Example
/// ```
/// use wirebond_core::{Decodable, DecodeCursor, Encodable, OutputBuffer, Result, Schema};
///
/// struct Ping {
///     seq: u64,
/// }
///
/// impl Encodable for Ping {
///     fn encode(&self, out: &mut OutputBuffer) -> Result<()> {
///         out.write_u64_le(self.seq);
///         Ok(())
///     }
/// }
///
/// impl Decodable for Ping {
///     fn decode(cursor: &mut DecodeCursor<'_>) -> Result<Self> {
///         Ok(Self { seq: cursor.read_u64_le()? })
///     }
/// }
///
/// impl Schema for Ping {
///     const NAME: &'static str = "example.Ping";
/// }
/// ```
pub trait Schema: Encodable + Decodable {
    /// Fully qualified schema name.
    const NAME: &'static str;
}
