//! C API over the process-wide tracker.
//!
//! Sizes cross the boundary as `u64` and tags as their stable `u32` values.
//! An out-of-range tag or a size that does not fit `usize` fails the call
//! (null or 0) instead of being misattributed or truncated.

use std::ffi::c_void;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

use crate::api::memory;
use crate::api::tag::MemoryTag;

fn tag_from_raw(tag: u32) -> Option<MemoryTag> {
    match MemoryTag::try_from(tag) {
        Ok(tag) => Some(tag),
        Err(raw) => {
            log::error!("invalid memory tag {} passed over the C API", raw);
            None
        }
    }
}

fn size_from_raw(size: u64) -> Option<usize> {
    match usize::try_from(size) {
        Ok(size) => Some(size),
        Err(_) => {
            log::error!("size {} passed over the C API does not fit in usize", size);
            None
        }
    }
}

/// Allocate `size` bytes under `tag`. Returns null on failure or invalid tag.
#[no_mangle]
pub extern "C" fn tagalloc_allocate(size: u64, tag: u32) -> *mut c_void {
    let Some(tag) = tag_from_raw(tag) else {
        return ptr::null_mut();
    };
    let Some(size) = size_from_raw(size) else {
        return ptr::null_mut();
    };
    match memory::allocate(size, tag) {
        Some(block) => block.as_ptr().cast(),
        None => ptr::null_mut(),
    }
}

/// Free a block from `tagalloc_allocate`. Null is ignored.
///
/// # Safety
///
/// `block`, `size` and `tag` must match a live allocation.
#[no_mangle]
pub unsafe extern "C" fn tagalloc_free(block: *mut c_void, size: u64, tag: u32) {
    let Some(block) = NonNull::new(block.cast::<u8>()) else {
        return;
    };
    let (Some(tag), Some(size)) = (tag_from_raw(tag), size_from_raw(size)) else {
        return;
    };
    memory::free(block, size, tag);
}

/// Zero `size` bytes at `block`. Returns `block`, or null if `size` does not
/// fit `usize`.
///
/// # Safety
///
/// `block` must be valid for `size` bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn tagalloc_zero_memory(block: *mut c_void, size: u64) -> *mut c_void {
    match size_from_raw(size) {
        Some(size) => memory::zero_memory(block.cast(), size).cast(),
        None => ptr::null_mut(),
    }
}

/// # Safety
///
/// Both ranges must be valid for `size` bytes and must not overlap.
#[no_mangle]
pub unsafe extern "C" fn tagalloc_copy_memory(
    dest: *mut c_void,
    source: *const c_void,
    size: u64,
) -> *mut c_void {
    match size_from_raw(size) {
        Some(size) => memory::copy_memory(dest.cast(), source.cast(), size).cast(),
        None => ptr::null_mut(),
    }
}

/// # Safety
///
/// `dest` must be valid for `size` bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn tagalloc_set_memory(dest: *mut c_void, value: i32, size: u64) -> *mut c_void {
    match size_from_raw(size) {
        Some(size) => memory::set_memory(dest.cast(), value, size).cast(),
        None => ptr::null_mut(),
    }
}

/// Live bytes under `tag`, or 0 for an invalid tag.
#[no_mangle]
pub extern "C" fn tagalloc_live_bytes(tag: u32) -> u64 {
    tag_from_raw(tag).map_or(0, |tag| memory::live_bytes(tag) as u64)
}

/// Write the usage report into `buf` as a NUL-terminated string, truncated
/// to `capacity`. Returns the full report length without the terminator, so
/// a short buffer can be detected and retried.
///
/// # Safety
///
/// `buf` must be null or valid for `capacity` bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn tagalloc_usage_report(buf: *mut c_char, capacity: usize) -> usize {
    let report = memory::usage_report();
    if !buf.is_null() && capacity > 0 {
        let len = report.len().min(capacity - 1);
        ptr::copy_nonoverlapping(report.as_ptr(), buf.cast::<u8>(), len);
        *buf.add(len) = 0;
    }
    report.len()
}

#[no_mangle]
pub extern "C" fn tagalloc_absolute_time() -> f64 {
    memory::absolute_time()
}

#[no_mangle]
pub extern "C" fn tagalloc_sleep(ms: u64) {
    memory::sleep(ms)
}

#[no_mangle]
pub extern "C" fn tagalloc_processor_count() -> u32 {
    u32::try_from(memory::processor_count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag() {
        crate::diagnostics::suppress_diagnostics(true);
        assert!(tagalloc_allocate(16, MemoryTag::COUNT as u32).is_null());
        assert_eq!(tagalloc_live_bytes(u32::MAX), 0);
        unsafe { tagalloc_free(ptr::null_mut(), 16, 0) };
    }

    #[test]
    fn test_allocate_free() {
        crate::diagnostics::suppress_diagnostics(true);
        let tag = MemoryTag::Application as u32;
        let block = tagalloc_allocate(24, tag);
        assert!(!block.is_null());
        unsafe {
            assert_eq!(tagalloc_set_memory(block, 7, 24), block);
            assert_eq!(*block.cast::<u8>().add(23), 7);
            tagalloc_free(block, 24, tag);
        }
    }

    #[test]
    fn test_bulk_ops() {
        let mut dest = [0xEEu8; 16];
        let src = [0x5Au8; 16];
        let d = dest.as_mut_ptr().cast::<c_void>();
        unsafe {
            assert_eq!(tagalloc_copy_memory(d, src.as_ptr().cast(), 16), d);
            assert_eq!(dest, src);
            assert_eq!(tagalloc_set_memory(d, 0x101, 8), d);
            assert_eq!(&dest[..8], &[1u8; 8]);
            assert_eq!(tagalloc_zero_memory(d, 16), d);
            assert_eq!(dest, [0u8; 16]);
        }
        assert!(tagalloc_processor_count() >= 1);
    }

    #[test]
    #[cfg(target_pointer_width = "32")]
    fn test_oversized_size_is_rejected() {
        let mut dest = [0u8; 4];
        let d = dest.as_mut_ptr().cast::<c_void>();
        let huge = u64::from(u32::MAX) + 1;
        unsafe {
            assert!(tagalloc_zero_memory(d, huge).is_null());
            assert!(tagalloc_set_memory(d, 1, huge).is_null());
            assert!(tagalloc_copy_memory(d, d, huge).is_null());
        }
        assert!(tagalloc_allocate(huge, 0).is_null());
        assert_eq!(dest, [0u8; 4]);
    }

    #[test]
    fn test_size_from_raw() {
        assert_eq!(size_from_raw(4096), Some(4096));
        assert_eq!(size_from_raw(u64::MAX), usize::try_from(u64::MAX).ok());
    }

    #[test]
    fn test_usage_report_truncates() {
        let mut buf = [0x7f as c_char; 8];
        let full = unsafe { tagalloc_usage_report(buf.as_mut_ptr(), buf.len()) };
        assert!(full > buf.len());
        assert_eq!(buf[7], 0);

        assert!(unsafe { tagalloc_usage_report(ptr::null_mut(), 0) } > 0);
    }
}
