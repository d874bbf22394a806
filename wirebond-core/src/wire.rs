//! Transport-facing wire slices and wire buffers.
//!
//! A [`WireSlice`] is a `(pointer, length, release callback)` triple. The
//! callback owns whatever keeps the bytes alive and runs exactly once, when the
//! slice is released or dropped. A [`WireBuffer`] is the ordered list of slices
//! making up one payload.

use bytes::Bytes;
use std::ops::Deref;

type ReleaseFn = Box<dyn FnOnce() + Send + Sync + 'static>;

/// Zero-copy view into storage kept alive by a release callback.
pub struct WireSlice {
    ptr: *const u8,
    len: usize,
    release: Option<ReleaseFn>,
}

// SAFETY: the pointed-to bytes are immutable for the lifetime of the slice and
// the release callback is itself `Send + Sync`.
unsafe impl Send for WireSlice {}
unsafe impl Sync for WireSlice {}

impl WireSlice {
    /// Creates a slice from raw parts and a release callback.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `len` bytes, and those bytes must not
    /// be mutated or freed until `release` has run.
    pub unsafe fn from_raw_parts<F>(ptr: *const u8, len: usize, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            ptr,
            len,
            release: Some(Box::new(release)),
        }
    }

    /// Creates a slice that keeps `bytes` alive until released.
    #[must_use]
    pub fn from_bytes(bytes: Bytes) -> Self {
        let ptr = bytes.as_ptr();
        let len = bytes.len();
        // SAFETY: `Bytes` storage is immutable and stays put while the closure
        // holds the handle.
        unsafe { Self::from_raw_parts(ptr, len, move || drop(bytes)) }
    }

    /// Creates a slice over static data; releasing it is a no-op.
    #[must_use]
    pub const fn from_static(data: &'static [u8]) -> Self {
        Self {
            ptr: data.as_ptr(),
            len: data.len(),
            release: None,
        }
    }

    /// Returns the slice contents.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: guaranteed by the constructor contract until release runs,
        // which only happens once `self` is consumed.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Returns a pointer to the first byte.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// Returns the length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the slice is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Releases the slice, running its callback now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for WireSlice {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Deref for WireSlice {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for WireSlice {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl std::fmt::Debug for WireSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireSlice")
            .field("len", &self.len)
            .field("releasable", &self.release.is_some())
            .finish()
    }
}

/// Ordered wire slices forming one payload.
///
/// An owned buffer tells the transport it is responsible for releasing every
/// slice; dropping the buffer does so.
#[derive(Debug)]
pub struct WireBuffer {
    slices: Vec<WireSlice>,
    owned: bool,
}

impl WireBuffer {
    /// Creates an empty, owned buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slices: Vec::new(),
            owned: true,
        }
    }

    /// Creates a buffer from ordered slices.
    #[must_use]
    pub fn from_slices(slices: Vec<WireSlice>, owned: bool) -> Self {
        Self { slices, owned }
    }

    /// Appends a slice at the end of the buffer.
    pub fn push(&mut self, slice: WireSlice) {
        self.slices.push(slice);
    }

    /// Returns whether the transport owns the slices.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        self.owned
    }

    /// Returns the number of slices.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Returns the total payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.iter().map(WireSlice::len).sum()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slices in wire order.
    #[must_use]
    pub fn slices(&self) -> &[WireSlice] {
        &self.slices
    }

    /// Iterates the slices in wire order.
    pub fn iter(&self) -> std::slice::Iter<'_, WireSlice> {
        self.slices.iter()
    }

    /// Takes the slices out of the buffer.
    #[must_use]
    pub fn into_slices(self) -> Vec<WireSlice> {
        self.slices
    }

    /// Copies the payload into one contiguous vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for slice in &self.slices {
            out.extend_from_slice(slice.as_slice());
        }
        out
    }
}

impl Default for WireBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for WireBuffer {
    type Item = WireSlice;
    type IntoIter = std::vec::IntoIter<WireSlice>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.into_iter()
    }
}

impl<'a> IntoIterator for &'a WireBuffer {
    type Item = &'a WireSlice;
    type IntoIter = std::slice::Iter<'a, WireSlice>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}
