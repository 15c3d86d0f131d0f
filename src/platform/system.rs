//! System allocator backend.

use std::alloc::{GlobalAlloc, Layout, System};
use std::mem::size_of;
use std::ptr::NonNull;
use std::time::Duration;

use super::clock::MonotonicClock;
use super::{block_align, PlatformBackend};
use crate::util::layout::{is_aligned, prefixed_layout};

/// Process-wide clock shared by every `SystemBackend` value.
static CLOCK: MonotonicClock = MonotonicClock::new();

/// Bytes of bookkeeping in front of each block: the user size, then the alignment.
const HEADER_LEN: usize = 2 * size_of::<usize>();

/// Header length for a block of the given alignment: one alignment unit.
#[inline]
const fn header_len(align: usize) -> usize {
    if align > HEADER_LEN {
        align
    } else {
        HEADER_LEN
    }
}

/// Backend over the native system allocator.
///
/// `free` takes no size, so each block is prefixed with a small header holding
/// the user size and alignment. The header occupies one alignment unit, which
/// keeps the returned pointer aligned.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl SystemBackend {
    /// Create the backend.
    pub const fn new() -> Self {
        Self
    }

    /// The clock behind [`PlatformBackend::absolute_time`].
    pub fn clock(&self) -> &'static MonotonicClock {
        &CLOCK
    }

    /// User size recorded for a live block.
    ///
    /// # Safety
    ///
    /// `block` must be a live block returned by this backend.
    pub unsafe fn block_size(block: NonNull<u8>) -> usize {
        read_header(block).0
    }
}

#[inline]
unsafe fn write_header(block: NonNull<u8>, size: usize, align: usize) {
    let words = block.as_ptr().sub(HEADER_LEN).cast::<usize>();
    words.write(size);
    words.add(1).write(align);
}

#[inline]
unsafe fn read_header(block: NonNull<u8>) -> (usize, usize) {
    let words = block.as_ptr().sub(HEADER_LEN).cast::<usize>();
    (words.read(), words.add(1).read())
}

impl PlatformBackend for SystemBackend {
    fn allocate(&self, size: usize, aligned: bool) -> Option<NonNull<u8>> {
        let align = block_align(aligned);
        let header = header_len(align);
        let layout = prefixed_layout(size, header, align)?;

        // SAFETY: the layout is never zero-sized, it always includes the header.
        let base = NonNull::new(unsafe { System.alloc(layout) })?;

        // SAFETY: the block is `header + size` bytes long and `header >= HEADER_LEN`,
        // so both header words and the user range are in bounds.
        unsafe {
            let block = NonNull::new_unchecked(base.as_ptr().add(header));
            debug_assert!(is_aligned(block.as_ptr(), align));
            write_header(block, size, align);
            Some(block)
        }
    }

    unsafe fn free(&self, block: NonNull<u8>, aligned: bool) {
        let (size, align) = read_header(block);
        debug_assert_eq!(
            align,
            block_align(aligned),
            "block at {:p} freed with aligned={} but allocated with the other flag",
            block,
            aligned
        );

        // The header holds the real alignment, so release with it.
        let header = header_len(align);
        let base = block.as_ptr().sub(header);
        let layout = Layout::from_size_align_unchecked(size + header, align);
        System.dealloc(base, layout);
    }

    fn absolute_time(&self) -> f64 {
        CLOCK.absolute_time()
    }

    fn sleep(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }

    fn processor_count(&self) -> usize {
        let count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        log::info!("{} processor cores detected.", count);
        count
    }
}
