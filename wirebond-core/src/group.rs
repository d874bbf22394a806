//! Shared owner of one outbound payload's chunk storage.
//!
//! Every wire slice keeps a [`SliceGroup`] handle inside its release callback,
//! so the storage lives exactly as long as the last slice. The handle count is
//! atomic; teardown runs once, on whichever release drops the last handle.

use crate::bridge::BridgeStats;
use bytes::Bytes;
use std::sync::Arc;

struct GroupInner {
    chunks: Vec<Bytes>,
    stats: Arc<BridgeStats>,
}

impl Drop for GroupInner {
    fn drop(&mut self) {
        self.stats.record_group_destroyed();
        tracing::trace!(
            chunks = self.chunks.len(),
            bytes = self.chunks.iter().map(Bytes::len).sum::<usize>(),
            "slice group released"
        );
    }
}

/// Reference-counted handle to the chunk storage behind a wire buffer.
#[derive(Clone)]
pub(crate) struct SliceGroup {
    inner: Arc<GroupInner>,
}

impl SliceGroup {
    /// Creates a group owning `chunks`, holding one reference for the caller.
    pub(crate) fn new(chunks: Vec<Bytes>, stats: Arc<BridgeStats>) -> Self {
        stats.record_group_created();
        Self {
            inner: Arc::new(GroupInner { chunks, stats }),
        }
    }

    /// Returns the current number of handles.
    pub(crate) fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns the number of chunks held by the group.
    pub(crate) fn len(&self) -> usize {
        self.inner.chunks.len()
    }

    /// Returns the chunk at `index`.
    pub(crate) fn chunk(&self, index: usize) -> Option<&Bytes> {
        self.inner.chunks.get(index)
    }

    /// Returns the total number of payload bytes held by the group.
    pub(crate) fn total_len(&self) -> usize {
        self.inner.chunks.iter().map(Bytes::len).sum()
    }
}

impl std::fmt::Debug for SliceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceGroup")
            .field("refs", &self.ref_count())
            .field("chunks", &self.len())
            .field("bytes", &self.total_len())
            .finish()
    }
}
