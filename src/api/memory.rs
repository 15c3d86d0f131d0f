//! Process-wide memory functions.
//!
//! Thin wrappers over the [`global`](crate::global) tracker so call sites do
//! not need to carry a tracker reference. Bulk memory and time functions touch
//! no tag state; they go straight to the default backend and never create the
//! tracker, so startup code can use them before [`init`](crate::init).

use std::ptr::NonNull;

use crate::api::error::ContractViolation;
use crate::api::stats::MemoryStats;
use crate::api::tag::MemoryTag;
use crate::core::global::global;
use crate::platform::{DefaultBackend, PlatformBackend};

/// Allocate `size` bytes attributed to `tag`.
pub fn allocate(size: usize, tag: MemoryTag) -> Option<NonNull<u8>> {
    global().allocate(size, tag)
}

/// Allocate a cache-line-aligned block attributed to `tag`.
pub fn allocate_aligned(size: usize, tag: MemoryTag) -> Option<NonNull<u8>> {
    global().allocate_aligned(size, tag)
}

/// Free a block from [`allocate`].
///
/// # Safety
///
/// See [`MemoryTracker::free`](crate::MemoryTracker::free).
pub unsafe fn free(block: NonNull<u8>, size: usize, tag: MemoryTag) {
    global().free(block, size, tag)
}

/// Free a block from [`allocate_aligned`].
///
/// # Safety
///
/// See [`MemoryTracker::free_aligned`](crate::MemoryTracker::free_aligned).
pub unsafe fn free_aligned(block: NonNull<u8>, size: usize, tag: MemoryTag) {
    global().free_aligned(block, size, tag)
}

/// Free a block from [`allocate`], returning any contract violation.
///
/// # Safety
///
/// See [`MemoryTracker::try_free`](crate::MemoryTracker::try_free).
pub unsafe fn try_free(
    block: NonNull<u8>,
    size: usize,
    tag: MemoryTag,
) -> Result<(), ContractViolation> {
    global().try_free(block, size, tag)
}

/// Zero `size` bytes at `block`.
///
/// # Safety
///
/// `block` must be valid for `size` bytes of writes. Null is accepted when
/// `size` is zero.
pub unsafe fn zero_memory(block: *mut u8, size: usize) -> *mut u8 {
    DefaultBackend::new().zero_memory(block, size)
}

/// Copy `size` bytes from `source` to `dest`.
///
/// # Safety
///
/// Both ranges must be valid for `size` bytes and must not overlap.
pub unsafe fn copy_memory(dest: *mut u8, source: *const u8, size: usize) -> *mut u8 {
    DefaultBackend::new().copy_memory(dest, source, size)
}

/// Set `size` bytes at `dest` to `value as u8`.
///
/// # Safety
///
/// `dest` must be valid for `size` bytes of writes.
pub unsafe fn set_memory(dest: *mut u8, value: i32, size: usize) -> *mut u8 {
    DefaultBackend::new().set_memory(dest, value, size)
}

/// Snapshot of the process-wide tag table.
pub fn stats() -> MemoryStats {
    global().stats()
}

/// Live bytes for one tag in the process-wide table.
pub fn live_bytes(tag: MemoryTag) -> usize {
    global().live_bytes(tag)
}

/// Per-tag usage summary of the process-wide table.
pub fn usage_report() -> String {
    global().usage_report()
}

/// Seconds on the monotonic clock.
pub fn absolute_time() -> f64 {
    DefaultBackend::new().absolute_time()
}

/// Block the calling thread for about `ms` milliseconds.
pub fn sleep(ms: u64) {
    DefaultBackend::new().sleep(ms)
}

/// Logical processors available to the process.
pub fn processor_count() -> usize {
    DefaultBackend::new().processor_count()
}
