//! Owned tagged buffers.

use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::api::tag::MemoryTag;
use crate::api::tracker::MemoryTracker;
use crate::platform::PlatformBackend;

/// A zeroed, tracked byte block that frees itself on drop.
///
/// The buffer keeps its own size and tag, so the free always matches the
/// allocation.
///
/// # Example
///
/// ```rust
/// use tagalloc::{MemoryTag, MemoryTracker, TrackerConfig};
///
/// let tracker = MemoryTracker::new(TrackerConfig::default());
/// {
///     let mut buf = tracker.buffer(16, MemoryTag::String).unwrap();
///     buf[..5].copy_from_slice(b"hello");
///     assert_eq!(tracker.live_bytes(MemoryTag::String), 16);
/// }
/// assert_eq!(tracker.live_bytes(MemoryTag::String), 0);
/// ```
pub struct TaggedBuf<'a, B: PlatformBackend> {
    tracker: &'a MemoryTracker<B>,
    block: NonNull<u8>,
    size: usize,
    tag: MemoryTag,
}

impl<'a, B: PlatformBackend> TaggedBuf<'a, B> {
    /// Allocate `size` zeroed bytes under `tag`.
    pub fn zeroed(tracker: &'a MemoryTracker<B>, size: usize, tag: MemoryTag) -> Option<Self> {
        let block = tracker.allocate(size, tag)?;
        // SAFETY: fresh block of `size` bytes.
        unsafe { tracker.zero_memory(block.as_ptr(), size) };
        Some(Self {
            tracker,
            block,
            size,
            tag,
        })
    }

    /// Allocate a copy of `bytes` under `tag`.
    pub fn from_slice(tracker: &'a MemoryTracker<B>, bytes: &[u8], tag: MemoryTag) -> Option<Self> {
        let block = tracker.allocate(bytes.len(), tag)?;
        // SAFETY: fresh block of `bytes.len()` bytes, cannot overlap `bytes`.
        unsafe { tracker.copy_memory(block.as_ptr(), bytes.as_ptr(), bytes.len()) };
        Some(Self {
            tracker,
            block,
            size: bytes.len(),
            tag,
        })
    }

    pub fn tag(&self) -> MemoryTag {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Set every byte to `value as u8`.
    pub fn fill(&mut self, value: i32) {
        // SAFETY: the block is owned and `size` bytes long.
        unsafe { self.tracker.set_memory(self.block.as_ptr(), value, self.size) };
    }
}

impl<B: PlatformBackend> Deref for TaggedBuf<'_, B> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the block is live, initialized and `size` bytes long.
        unsafe { std::slice::from_raw_parts(self.block.as_ptr(), self.size) }
    }
}

impl<B: PlatformBackend> DerefMut for TaggedBuf<'_, B> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` makes the access unique.
        unsafe { std::slice::from_raw_parts_mut(self.block.as_ptr(), self.size) }
    }
}

impl<B: PlatformBackend> Drop for TaggedBuf<'_, B> {
    fn drop(&mut self) {
        // SAFETY: allocated by this tracker with exactly this size and tag.
        unsafe { self.tracker.free(self.block, self.size, self.tag) };
    }
}

impl<B: PlatformBackend> std::fmt::Debug for TaggedBuf<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedBuf")
            .field("ptr", &self.block)
            .field("len", &self.size)
            .field("tag", &self.tag)
            .finish()
    }
}

// SAFETY: the buffer exclusively owns its block, and the tracker is Sync.
unsafe impl<B: PlatformBackend> Send for TaggedBuf<'_, B> {}
unsafe impl<B: PlatformBackend> Sync for TaggedBuf<'_, B> {}
