//! Chunks and chunk sequences produced by a serializer.
//!
//! A [`Chunk`] is either borrowed from the producer's internal storage or
//! owned independently of it. The kind is an explicit tag so the bridge can
//! copy a borrowed chunk exactly once when it escapes the producer and alias
//! an owned one for free.

use bytes::Bytes;

/// Ownership kind of a [`Chunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Aliases storage that is only valid until the producer is reused.
    Borrowed,
    /// Storage is decoupled from the producer.
    Owned,
}

/// One immutable byte range of a serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Bytes living inside the producer.
    Borrowed(&'a [u8]),
    /// Bytes with independent, shared storage.
    Owned(Bytes),
}

impl<'a> Chunk<'a> {
    /// Creates a chunk borrowing the given bytes.
    #[must_use]
    pub const fn borrowed(data: &'a [u8]) -> Self {
        Self::Borrowed(data)
    }

    /// Creates a chunk owning the given bytes.
    #[must_use]
    pub fn owned(data: impl Into<Bytes>) -> Self {
        Self::Owned(data.into())
    }

    /// Returns the ownership kind of this chunk.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ChunkKind {
        match self {
            Self::Borrowed(_) => ChunkKind::Borrowed,
            Self::Owned(_) => ChunkKind::Owned,
        }
    }

    /// Returns the chunk contents.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Borrowed(data) => data,
            Self::Owned(data) => data,
        }
    }

    /// Returns a pointer to the first byte of the chunk.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// Returns the length of the chunk in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the chunk holds no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detaches the chunk from the producer's lifetime.
    ///
    /// Borrowed bytes are copied into fresh storage; owned bytes are returned
    /// as they are.
    #[must_use]
    pub fn make_independent(self) -> Bytes {
        match self {
            Self::Borrowed(data) => Bytes::copy_from_slice(data),
            Self::Owned(data) => data,
        }
    }
}

impl AsRef<[u8]> for Chunk<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Ordered chunks forming one serialized payload, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSequence<'a> {
    chunks: Vec<Chunk<'a>>,
}

impl<'a> ChunkSequence<'a> {
    /// Creates an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Creates an empty sequence with room for `capacity` chunks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chunks: Vec::with_capacity(capacity),
        }
    }

    /// Appends a chunk at the end of the sequence.
    pub fn push(&mut self, chunk: Chunk<'a>) {
        self.chunks.push(chunk);
    }

    /// Returns the number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the sequence has no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the sum of all chunk lengths.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Iterates the chunks in wire order.
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk<'a>> {
        self.chunks.iter()
    }

    /// Concatenates all chunks into one vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len());
        for chunk in &self.chunks {
            out.extend_from_slice(chunk.as_slice());
        }
        out
    }
}

impl<'a> FromIterator<Chunk<'a>> for ChunkSequence<'a> {
    fn from_iter<I: IntoIterator<Item = Chunk<'a>>>(iter: I) -> Self {
        Self {
            chunks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for ChunkSequence<'a> {
    type Item = Chunk<'a>;
    type IntoIter = std::vec::IntoIter<Chunk<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

impl<'s, 'a> IntoIterator for &'s ChunkSequence<'a> {
    type Item = &'s Chunk<'a>;
    type IntoIter = std::slice::Iter<'s, Chunk<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
