//! Platform backend: raw memory, clock and CPU capabilities.
//!
//! The tracker never talks to the operating system directly. Everything it
//! needs goes through [`PlatformBackend`], and exactly one implementation is
//! selected as [`DefaultBackend`] for the build. Swapping the backend does not
//! change a single call site above this module.
//!
//! The backend knows nothing about tags.

use std::ptr::{self, NonNull};

pub mod clock;
pub mod system;

pub use clock::MonotonicClock;
pub use system::SystemBackend;

/// Backend used by the process-wide tracker.
///
/// `std::alloc::System` already dispatches to the native allocator of every
/// supported target (HeapAlloc on Windows, malloc elsewhere), so one
/// implementation covers them all.
pub type DefaultBackend = SystemBackend;

/// Alignment of blocks requested with `aligned == false`.
pub const MIN_ALIGN: usize = 16;

/// Alignment of blocks requested with `aligned == true` (one cache line).
pub const CACHE_LINE_ALIGN: usize = 64;

/// Alignment a backend must honour for the given `aligned` flag.
#[inline]
pub const fn block_align(aligned: bool) -> usize {
    if aligned {
        CACHE_LINE_ALIGN
    } else {
        MIN_ALIGN
    }
}

/// The fixed, OS-agnostic capability set of a platform layer.
///
/// Implementations must be thread-safe: every method may be called from any
/// thread at any time.
pub trait PlatformBackend: Send + Sync {
    /// Allocate `size` bytes, aligned to [`block_align`]`(aligned)`.
    ///
    /// Returns `None` if the platform cannot satisfy the request. Never retries.
    fn allocate(&self, size: usize, aligned: bool) -> Option<NonNull<u8>>;

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `block` must come from [`allocate`](Self::allocate) on this backend,
    /// must not have been freed already, and `aligned` must equal the flag used
    /// to allocate it.
    unsafe fn free(&self, block: NonNull<u8>, aligned: bool);

    /// Set `size` bytes at `block` to zero and return `block`.
    ///
    /// # Safety
    ///
    /// `block` must be valid for `size` bytes of writes. Any pointer, null
    /// included, is accepted when `size == 0`.
    unsafe fn zero_memory(&self, block: *mut u8, size: usize) -> *mut u8 {
        if size != 0 {
            ptr::write_bytes(block, 0, size);
        }
        block
    }

    /// Copy `size` bytes from `source` to `dest` and return `dest`.
    ///
    /// # Safety
    ///
    /// Both ranges must be valid for `size` bytes and must not overlap. Any
    /// pointers are accepted when `size == 0`.
    unsafe fn copy_memory(&self, dest: *mut u8, source: *const u8, size: usize) -> *mut u8 {
        if size != 0 {
            ptr::copy_nonoverlapping(source, dest, size);
        }
        dest
    }

    /// Set every byte in `dest[..size]` to `value` truncated to its low 8 bits
    /// and return `dest`.
    ///
    /// # Safety
    ///
    /// `dest` must be valid for `size` bytes of writes. Any pointer is accepted
    /// when `size == 0`.
    unsafe fn set_memory(&self, dest: *mut u8, value: i32, size: usize) -> *mut u8 {
        if size != 0 {
            ptr::write_bytes(dest, value as u8, size);
        }
        dest
    }

    /// Seconds since a backend-chosen epoch. Monotonic, never wall-clock.
    fn absolute_time(&self) -> f64;

    /// Block the calling thread for roughly `ms` milliseconds.
    ///
    /// Only meant for handing unused frame time back to the OS.
    fn sleep(&self, ms: u64);

    /// Number of logical processors visible to the process (at least 1).
    fn processor_count(&self) -> usize;
}
