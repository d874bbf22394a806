//! Outbound buffer bridge.
//!
//! Turns a fully written [`ChunkSequence`] into a [`WireBuffer`] without
//! copying owned chunks. Borrowed chunks are copied once so the storage no
//! longer depends on the producer. All chunks end up in one shared slice group,
//! and each wire slice holds one group reference in its release callback.

use crate::chunk::{ChunkKind, ChunkSequence};
use crate::group::SliceGroup;
use crate::output::ChunkSource;
use crate::wire::{WireBuffer, WireSlice};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default pre-sizing hint for the slice list.
pub const DEFAULT_SLICE_CAPACITY_HINT: usize = 8;

/// Configuration for [`BufferBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Expected number of chunks per payload. Only used to pre-size vectors.
    pub slice_capacity_hint: usize,
}

impl BridgeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slice_capacity_hint: DEFAULT_SLICE_CAPACITY_HINT,
        }
    }

    /// Sets the slice capacity hint.
    #[must_use]
    pub const fn slice_capacity_hint(mut self, hint: usize) -> Self {
        self.slice_capacity_hint = hint;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifetime counters shared by every group a bridge creates.
#[derive(Debug, Default)]
pub struct BridgeStats {
    groups_created: AtomicU64,
    groups_destroyed: AtomicU64,
    chunks_materialized: AtomicU64,
    bytes_materialized: AtomicU64,
    slices_issued: AtomicU64,
}

impl BridgeStats {
    pub(crate) fn record_group_created(&self) {
        self.groups_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_group_destroyed(&self) {
        self.groups_destroyed.fetch_add(1, Ordering::AcqRel);
    }

    fn record_materialized(&self, bytes: usize) {
        self.chunks_materialized.fetch_add(1, Ordering::Relaxed);
        self.bytes_materialized
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn record_slices(&self, count: usize) {
        self.slices_issued
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Returns the number of slice groups created.
    #[must_use]
    pub fn groups_created(&self) -> u64 {
        self.groups_created.load(Ordering::Acquire)
    }

    /// Returns the number of slice groups torn down.
    #[must_use]
    pub fn groups_destroyed(&self) -> u64 {
        self.groups_destroyed.load(Ordering::Acquire)
    }

    /// Returns the number of groups still referenced by some slice.
    #[must_use]
    pub fn live_groups(&self) -> u64 {
        self.groups_created()
            .saturating_sub(self.groups_destroyed())
    }

    /// Returns the number of borrowed chunks copied out of their producer.
    #[must_use]
    pub fn chunks_materialized(&self) -> u64 {
        self.chunks_materialized.load(Ordering::Relaxed)
    }

    /// Returns the number of bytes copied while materializing chunks.
    #[must_use]
    pub fn bytes_materialized(&self) -> u64 {
        self.bytes_materialized.load(Ordering::Relaxed)
    }

    /// Returns the number of wire slices handed out.
    #[must_use]
    pub fn slices_issued(&self) -> u64 {
        self.slices_issued.load(Ordering::Relaxed)
    }
}

/// Converts chunk sequences into owned wire buffers.
#[derive(Debug, Clone, Default)]
pub struct BufferBridge {
    config: BridgeConfig,
    stats: Arc<BridgeStats>,
}

impl BufferBridge {
    /// Creates a bridge with the given configuration.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            stats: Arc::new(BridgeStats::default()),
        }
    }

    /// Returns the bridge configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the shared lifetime counters.
    #[must_use]
    pub fn stats(&self) -> &Arc<BridgeStats> {
        &self.stats
    }

    /// Bridges a chunk sequence into a wire buffer.
    ///
    /// The result has one slice per chunk, in chunk order, each aliasing the
    /// group's storage. Once this returns the group's reference count equals
    /// the number of slices; an empty sequence yields an empty buffer and the
    /// group is released before returning.
    #[must_use]
    pub fn bridge(&self, chunks: ChunkSequence<'_>) -> WireBuffer {
        let (buffer, group) = self.bridge_with_group(chunks);
        // Dropping the local handle leaves one reference per slice.
        drop(group);
        buffer
    }

    /// Bridges `chunks` and also returns the bridge's own group handle.
    pub(crate) fn bridge_with_group(
        &self,
        chunks: ChunkSequence<'_>,
    ) -> (WireBuffer, SliceGroup) {
        let capacity = chunks.len().max(self.config.slice_capacity_hint);

        let mut storage = Vec::with_capacity(capacity);
        for chunk in chunks {
            if chunk.kind() == ChunkKind::Borrowed {
                self.stats.record_materialized(chunk.len());
            }
            storage.push(chunk.make_independent());
        }

        // The local handle keeps the group alive while slices are created.
        let group = SliceGroup::new(storage, Arc::clone(&self.stats));

        let mut slices = Vec::with_capacity(capacity);
        for index in 0..group.len() {
            let Some(data) = group.chunk(index) else {
                break;
            };
            let (ptr, len) = (data.as_ptr(), data.len());
            let handle = group.clone();
            // SAFETY: the chunk storage is owned by the group and never
            // mutated; the handle moved into the callback keeps it alive until
            // the slice is released.
            let slice = unsafe { WireSlice::from_raw_parts(ptr, len, move || drop(handle)) };
            slices.push(slice);
        }

        self.stats.record_slices(slices.len());
        tracing::trace!(
            slices = slices.len(),
            bytes = group.total_len(),
            "bridged chunk sequence"
        );

        (WireBuffer::from_slices(slices, true), group)
    }

    /// Bridges whatever `source` has written so far.
    #[must_use]
    pub fn bridge_source<S: ChunkSource + ?Sized>(&self, source: &S) -> WireBuffer {
        self.bridge(source.chunks())
    }
}

/// Bridges a chunk sequence with a default, unshared bridge.
#[must_use]
pub fn to_wire_buffer(chunks: ChunkSequence<'_>) -> WireBuffer {
    BufferBridge::default().bridge(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::output::OutputBuffer;
    use bytes::Bytes;
    use proptest::prelude::*;
    use std::thread;

    fn sequence(parts: &[Vec<u8>]) -> ChunkSequence<'static> {
        parts.iter().cloned().map(Chunk::owned).collect()
    }

    #[test]
    fn test_two_chunk_scenario() {
        let bridge = BufferBridge::default();
        let buffer = bridge.bridge(sequence(&[b"AB".to_vec(), b"CDE".to_vec()]));

        assert!(buffer.is_owned());
        let lens: Vec<_> = buffer.iter().map(WireSlice::len).collect();
        assert_eq!(lens, vec![2, 3]);
        assert_eq!(buffer.to_vec(), b"ABCDE");
        assert_eq!(bridge.stats().live_groups(), 1);

        drop(buffer);
        assert_eq!(bridge.stats().groups_destroyed(), 1);
    }

    #[test]
    fn test_owned_chunks_are_aliased() {
        let first = Bytes::from_static(b"hello ");
        let second = Bytes::from(b"world".to_vec());
        let ptrs = [first.as_ptr(), second.as_ptr()];

        let bridge = BufferBridge::default();
        let seq = [Chunk::Owned(first), Chunk::Owned(second)].into_iter().collect();
        let buffer = bridge.bridge(seq);

        let slice_ptrs: Vec<_> = buffer.iter().map(WireSlice::as_ptr).collect();
        assert_eq!(slice_ptrs, ptrs);
        assert_eq!(bridge.stats().chunks_materialized(), 0);
    }

    #[test]
    fn test_borrowed_chunk_materialized_once() {
        let bridge = BufferBridge::default();
        let mut out = OutputBuffer::with_block_size(4);
        out.write_bytes(b"ABCDEF");

        let buffer = bridge.bridge_source(&out);
        // The producer can be reused once bridging returned.
        out.clear();
        out.write_bytes(b"zzzzzz");

        assert_eq!(buffer.to_vec(), b"ABCDEF");
        assert_eq!(bridge.stats().chunks_materialized(), 1);
        assert_eq!(bridge.stats().bytes_materialized(), 2);
    }

    #[test]
    fn test_empty_sequence_yields_empty_buffer() {
        let bridge = BufferBridge::default();
        let buffer = bridge.bridge(ChunkSequence::new());

        assert_eq!(buffer.slice_count(), 0);
        assert!(buffer.is_empty());
        assert!(buffer.is_owned());
        assert_eq!(bridge.stats().groups_created(), 1);
        assert_eq!(bridge.stats().groups_destroyed(), 1);
    }

    #[test]
    fn test_group_released_only_after_last_slice() {
        let bridge = BufferBridge::default();
        let buffer = bridge.bridge(sequence(&[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]));
        let mut slices = buffer.into_slices();

        let last = slices.pop().unwrap();
        for slice in slices {
            slice.release();
            assert_eq!(bridge.stats().groups_destroyed(), 0);
        }
        assert_eq!(last.as_slice(), b"c");
        last.release();
        assert_eq!(bridge.stats().groups_destroyed(), 1);
    }

    #[test]
    fn test_group_count_tracks_live_slices() {
        let bridge = BufferBridge::default();
        let (buffer, group) =
            bridge.bridge_with_group(sequence(&[b"a".to_vec(), b"bc".to_vec(), b"def".to_vec()]));
        // One reference per slice plus the handle returned here.
        assert_eq!(group.ref_count(), buffer.slice_count() + 1);

        let mut remaining = buffer.slice_count();
        for slice in buffer.into_slices() {
            slice.release();
            remaining -= 1;
            assert_eq!(group.ref_count(), remaining + 1);
        }
        assert_eq!(bridge.stats().groups_destroyed(), 0);

        drop(group);
        assert_eq!(bridge.stats().groups_destroyed(), 1);
    }

    #[test]
    fn test_concurrent_release() {
        let bridge = BufferBridge::default();
        for _ in 0..64 {
            let parts: Vec<Vec<u8>> = (0..16u8).map(|i| vec![i; usize::from(i) + 1]).collect();
            let buffer = bridge.bridge(sequence(&parts));

            let handles: Vec<_> = buffer
                .into_slices()
                .into_iter()
                .map(|slice| {
                    thread::spawn(move || {
                        let first = slice.as_slice()[0];
                        assert!(slice.iter().all(|&b| b == first));
                        slice.release();
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        }
        assert_eq!(bridge.stats().groups_created(), 64);
        assert_eq!(bridge.stats().groups_destroyed(), 64);
        assert_eq!(bridge.stats().slices_issued(), 64 * 16);
    }

    #[test]
    fn test_config_hint() {
        let config = BridgeConfig::new().slice_capacity_hint(2);
        let bridge = BufferBridge::new(config);
        assert_eq!(bridge.config().slice_capacity_hint, 2);
        let buffer = bridge.bridge(sequence(&[b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]));
        assert_eq!(buffer.slice_count(), 3);
    }

    fn chunks_and_order() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<usize>)> {
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 0..12).prop_flat_map(
            |chunks| {
                let order: Vec<usize> = (0..chunks.len()).collect();
                (Just(chunks), Just(order).prop_shuffle())
            },
        )
    }

    proptest! {
        #[test]
        fn prop_slices_mirror_chunks(parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16)) {
            let seq = sequence(&parts);
            let chunk_lens: Vec<usize> = seq.iter().map(Chunk::len).collect();
            let expected = seq.to_vec();

            let buffer = to_wire_buffer(seq);
            let slice_lens: Vec<usize> = buffer.iter().map(WireSlice::len).collect();

            prop_assert_eq!(slice_lens, chunk_lens);
            prop_assert_eq!(buffer.to_vec(), expected);
        }

        #[test]
        fn prop_any_release_order_tears_down_once((parts, order) in chunks_and_order()) {
            let bridge = BufferBridge::default();
            let buffer = bridge.bridge(sequence(&parts));
            let mut slices: Vec<Option<WireSlice>> = buffer.into_slices().into_iter().map(Some).collect();

            for (released, &index) in order.iter().enumerate() {
                prop_assert_eq!(bridge.stats().groups_destroyed(), 0);
                let slice = slices[index].take().unwrap();
                prop_assert_eq!(slice.as_slice(), &parts[index][..]);
                slice.release();
                let remaining = order.len() - released - 1;
                let expected = if remaining == 0 { 1 } else { 0 };
                prop_assert_eq!(bridge.stats().groups_destroyed(), expected);
            }
            prop_assert_eq!(bridge.stats().groups_destroyed(), 1);
            prop_assert_eq!(bridge.stats().live_groups(), 0);
        }
    }
}
