//! The tag statistics table.

use crate::api::stats::{MemoryStats, TagUsage};
use crate::api::tag::MemoryTag;
use crate::sync::mutex::Mutex;

struct TableInner {
    tags: [TagUsage; MemoryTag::COUNT],
    total_live: usize,
    peak_total: usize,
}

/// Per-tag counters behind a single lock.
///
/// Every update and every snapshot takes the same lock, so concurrent
/// allocate/free calls never lose an update and a snapshot only ever sees
/// completed updates.
pub struct TagTable {
    inner: Mutex<TableInner>,
}

impl TagTable {
    /// Create a zeroed table.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                tags: [TagUsage::default(); MemoryTag::COUNT],
                total_live: 0,
                peak_total: 0,
            }),
        }
    }

    /// Account an allocation.
    pub fn record_alloc(&self, tag: MemoryTag, size: usize) {
        let mut inner = self.inner.lock();
        inner.tags[tag.index()].record_alloc(size);
        inner.total_live += size;
        if inner.total_live > inner.peak_total {
            inner.peak_total = inner.total_live;
        }
    }

    /// Account a free.
    ///
    /// On underflow the tag is clamped to zero and the live byte count it had
    /// before the free is returned as the error.
    pub fn record_free(&self, tag: MemoryTag, size: usize) -> Result<(), usize> {
        let mut inner = self.inner.lock();
        let result = inner.tags[tag.index()].record_free(size);
        let released = match result {
            Ok(()) => size,
            Err(live) => live,
        };
        inner.total_live -= released;
        result
    }

    /// Live bytes for one tag.
    pub fn live_bytes(&self, tag: MemoryTag) -> usize {
        self.inner.lock().tags[tag.index()].live_bytes
    }

    /// Snapshot of every tag.
    pub fn snapshot(&self) -> MemoryStats {
        let inner = self.inner.lock();
        MemoryStats::new(inner.tags, inner.peak_total)
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_conservation() {
        let table = TagTable::new();
        table.record_alloc(MemoryTag::String, 64);
        assert_eq!(table.live_bytes(MemoryTag::String), 64);
        assert_eq!(table.record_free(MemoryTag::String, 64), Ok(()));
        assert_eq!(table.live_bytes(MemoryTag::String), 0);

        let stats = table.snapshot();
        assert_eq!(stats.tag(MemoryTag::String).allocation_count, 1);
        assert_eq!(stats.tag(MemoryTag::String).free_count, 1);
        assert_eq!(stats.peak_total, 64);
    }

    #[test]
    fn test_cross_tag_isolation() {
        let table = TagTable::new();
        table.record_alloc(MemoryTag::Texture, 1024);
        table.record_alloc(MemoryTag::String, 256);

        let stats = table.snapshot();
        for (tag, usage) in stats.iter() {
            let expected = match tag {
                MemoryTag::Texture => 1024,
                MemoryTag::String => 256,
                _ => 0,
            };
            assert_eq!(usage.live_bytes, expected, "{}", tag);
        }
        assert_eq!(stats.total_live_bytes(), 1280);
    }

    #[test]
    fn test_underflow_clamps_total() {
        let table = TagTable::new();
        table.record_alloc(MemoryTag::Job, 10);
        table.record_alloc(MemoryTag::Game, 5);

        assert_eq!(table.record_free(MemoryTag::Job, 40), Err(10));
        let stats = table.snapshot();
        assert_eq!(stats.live_bytes(MemoryTag::Job), 0);
        assert_eq!(stats.total_live_bytes(), 5);
    }

    #[test]
    fn test_concurrent_updates() {
        let table = Arc::new(TagTable::new());
        let threads = 8;
        let iterations = 2_000;

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    for j in 0..iterations {
                        let size = 1 + (i * 31 + j) % 97;
                        table.record_alloc(MemoryTag::Entity, size);
                        table.record_free(MemoryTag::Entity, size).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = table.snapshot();
        let usage = stats.tag(MemoryTag::Entity);
        assert_eq!(usage.live_bytes, 0);
        assert_eq!(usage.allocation_count, (threads * iterations) as u64);
        assert_eq!(usage.free_count, (threads * iterations) as u64);
    }
}
