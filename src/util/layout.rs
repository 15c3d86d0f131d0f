//! Layout utilities.

use std::alloc::Layout;

/// Layout of a block carrying a `header`-byte prefix in front of `size` user bytes.
///
/// Callers pass a header that is a whole multiple of `align`, so the user
/// pointer keeps the block's alignment.
pub fn prefixed_layout(size: usize, header: usize, align: usize) -> Option<Layout> {
    let total = size.checked_add(header)?;
    Layout::from_size_align(total, align).ok()
}

/// Whether `ptr` sits on an `align` boundary.
#[inline]
pub fn is_aligned(ptr: *const u8, align: usize) -> bool {
    (ptr as usize) & (align - 1) == 0
}
