//! Backend-only functions must not create the process-wide tracker.
//!
//! Kept in its own test binary so no other test initializes the tracker first.

use tagalloc::{memory, MemoryTag, TrackerConfig};

#[test]
fn test_bulk_ops_before_init() {
    let mut buf = [0xAAu8; 8];
    let src = [1u8, 2, 3, 4, 5, 6, 7, 8];

    unsafe {
        memory::set_memory(buf.as_mut_ptr(), 0x33, buf.len());
        assert_eq!(buf, [0x33; 8]);
        memory::copy_memory(buf.as_mut_ptr(), src.as_ptr(), src.len());
        assert_eq!(buf, src);
        memory::zero_memory(buf.as_mut_ptr(), buf.len());
        assert_eq!(buf, [0; 8]);
    }
    memory::absolute_time();
    memory::sleep(0);
    memory::processor_count();
    assert!(!tagalloc::is_initialized());

    let tracker = tagalloc::init(TrackerConfig::unchecked().with_allocation_logging(true)).unwrap();
    assert!(tracker.config().log_allocations);

    let block = memory::allocate(32, MemoryTag::Application).unwrap();
    assert_eq!(memory::live_bytes(MemoryTag::Application), 32);
    unsafe { memory::free(block, 32, MemoryTag::Application) };
}
