//! The tagged memory tracker.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::buffer::TaggedBuf;
use crate::api::config::TrackerConfig;
use crate::api::error::ContractViolation;
use crate::api::stats::MemoryStats;
use crate::api::tag::MemoryTag;
use crate::core::budget::{BudgetStatus, TagLimit};
use crate::core::shadow::{AllocRecord, LeakRecord, ShadowTable};
use crate::core::table::TagTable;
use crate::debug::poison::FREED_PATTERN;
use crate::platform::{DefaultBackend, PlatformBackend};
use crate::{tm_emit, tm_emit_ctx};

/// The sanctioned entry point for heap memory.
///
/// Every block is attributed to a [`MemoryTag`]; live bytes, peaks and counts
/// are kept per tag and can be read at any time with [`stats`](Self::stats).
/// Bulk operations (`zero_memory`, `copy_memory`, `set_memory`) are forwarded
/// to the backend unchanged so callers depend on a single surface.
///
/// The tracker is `Sync`; share it by reference or through the process-wide
/// instance ([`crate::global`]).
///
/// # Example
///
/// ```rust
/// use tagalloc::{MemoryTag, MemoryTracker, TrackerConfig};
///
/// let tracker = MemoryTracker::new(TrackerConfig::default());
///
/// let block = tracker.allocate(64, MemoryTag::String).unwrap();
/// assert_eq!(tracker.live_bytes(MemoryTag::String), 64);
///
/// unsafe { tracker.free(block, 64, MemoryTag::String) };
/// assert_eq!(tracker.live_bytes(MemoryTag::String), 0);
/// ```
pub struct MemoryTracker<B: PlatformBackend = DefaultBackend> {
    backend: B,
    config: TrackerConfig,
    table: TagTable,
    /// Present in checked mode only.
    shadow: Option<ShadowTable>,
    unknown_noted: AtomicBool,
}

impl MemoryTracker<DefaultBackend> {
    /// Create a tracker over the default platform backend.
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_backend(DefaultBackend::new(), config)
    }
}

impl<B: PlatformBackend> MemoryTracker<B> {
    /// Create a tracker over a specific backend.
    pub fn with_backend(backend: B, config: TrackerConfig) -> Self {
        let shadow = config.checked.then(ShadowTable::new);
        Self {
            backend,
            config,
            table: TagTable::new(),
            shadow,
            unknown_noted: AtomicBool::new(false),
        }
    }

    /// The backend this tracker forwards to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Whether frees are validated against a shadow table.
    pub fn is_checked(&self) -> bool {
        self.shadow.is_some()
    }

    /// Allocate `size` bytes attributed to `tag`.
    ///
    /// Returns `None` if the backend fails or the tag's hard limit would be
    /// passed; nothing is accounted in that case. The block is aligned to
    /// [`MIN_ALIGN`](crate::platform::MIN_ALIGN) and its contents are
    /// unspecified.
    pub fn allocate(&self, size: usize, tag: MemoryTag) -> Option<NonNull<u8>> {
        self.allocate_inner(size, tag, false)
    }

    /// Like [`allocate`](Self::allocate), aligned to a cache line.
    ///
    /// Release with [`free_aligned`](Self::free_aligned).
    pub fn allocate_aligned(&self, size: usize, tag: MemoryTag) -> Option<NonNull<u8>> {
        self.allocate_inner(size, tag, true)
    }

    /// Allocate a zeroed buffer that frees itself on drop.
    pub fn buffer(&self, size: usize, tag: MemoryTag) -> Option<TaggedBuf<'_, B>> {
        TaggedBuf::zeroed(self, size, tag)
    }

    fn allocate_inner(&self, size: usize, tag: MemoryTag, aligned: bool) -> Option<NonNull<u8>> {
        if tag == MemoryTag::Unknown && !self.unknown_noted.swap(true, Ordering::Relaxed) {
            tm_emit!(TM102);
        }

        let limit = self.config.budgets.get(tag);
        if limit != TagLimit::UNLIMITED {
            let live = self.table.live_bytes(tag);
            let projected = live.saturating_add(size);
            match limit.check_status(live, size) {
                BudgetStatus::Exceeded => {
                    tm_emit_ctx!(
                        TM301,
                        "tag={} live={} requested={} hard_limit={}",
                        tag,
                        live,
                        size,
                        limit.hard_limit
                    );
                    return None;
                }
                // Only report the crossing, not every allocation past it.
                BudgetStatus::Warning if !limit.over_soft(live) => {
                    tm_emit_ctx!(
                        TM302,
                        "tag={} live={} requested={} soft_limit={} hard_usage={:.1}%",
                        tag,
                        live,
                        size,
                        limit.soft_limit,
                        limit.usage_percent(projected)
                    );
                }
                _ => {}
            }
        }

        let block = match self.backend.allocate(size, aligned) {
            Some(block) => block,
            None => {
                tm_emit_ctx!(TM101, "tag={} size={} aligned={}", tag, size, aligned);
                return None;
            }
        };

        if let Some(ref shadow) = self.shadow {
            shadow.insert(block, AllocRecord::new(size, tag, aligned));
        }
        self.table.record_alloc(tag, size);

        if self.config.log_allocations {
            log::trace!("allocate {:p}: {} bytes tagged {}", block, size, tag);
        }

        Some(block)
    }

    /// Free a block and untrack `size` bytes from `tag`.
    ///
    /// Contract violations are reported as diagnostics; use
    /// [`try_free`](Self::try_free) to receive them as values.
    ///
    /// # Safety
    ///
    /// `block` must come from [`allocate`](Self::allocate) on this tracker and
    /// must not have been freed. `size` and `tag` must equal the values passed
    /// to `allocate`. In checked mode violations are caught; in unchecked mode
    /// they are undefined behavior.
    pub unsafe fn free(&self, block: NonNull<u8>, size: usize, tag: MemoryTag) {
        let _ = self.free_inner(block, size, tag, false);
    }

    /// Free a block from [`allocate_aligned`](Self::allocate_aligned).
    ///
    /// # Safety
    ///
    /// As [`free`](Self::free), for aligned blocks.
    pub unsafe fn free_aligned(&self, block: NonNull<u8>, size: usize, tag: MemoryTag) {
        let _ = self.free_inner(block, size, tag, true);
    }

    /// Free a block, returning the first contract violation found.
    ///
    /// In checked mode a block with a mismatched size, tag or alignment is
    /// still released, using what was recorded at allocation, so the tag
    /// totals stay exact. An untracked pointer is never passed to the backend.
    ///
    /// # Safety
    ///
    /// As [`free`](Self::free).
    pub unsafe fn try_free(
        &self,
        block: NonNull<u8>,
        size: usize,
        tag: MemoryTag,
    ) -> Result<(), ContractViolation> {
        self.free_inner(block, size, tag, false)
    }

    /// [`try_free`](Self::try_free) for aligned blocks.
    ///
    /// # Safety
    ///
    /// As [`free`](Self::free).
    pub unsafe fn try_free_aligned(
        &self,
        block: NonNull<u8>,
        size: usize,
        tag: MemoryTag,
    ) -> Result<(), ContractViolation> {
        self.free_inner(block, size, tag, true)
    }

    unsafe fn free_inner(
        &self,
        block: NonNull<u8>,
        size: usize,
        tag: MemoryTag,
        aligned: bool,
    ) -> Result<(), ContractViolation> {
        let address = block.as_ptr() as usize;
        let mut violation = None;

        let (size, tag, aligned) = match self.shadow {
            None => (size, tag, aligned),
            Some(ref shadow) => {
                let record = match shadow.take(block) {
                    Some(record) => record,
                    None => {
                        tm_emit_ctx!(TM001, "ptr={:p} size={} tag={}", block, size, tag);
                        return Err(ContractViolation::UntrackedPointer { address });
                    }
                };

                for found in record.mismatches(address, size, tag, aligned) {
                    match found {
                        ContractViolation::SizeMismatch { .. } => {
                            tm_emit_ctx!(TM002, "ptr={:p} allocated={} freed={}", block, record.size, size);
                        }
                        ContractViolation::TagMismatch { .. } => {
                            tm_emit_ctx!(TM003, "ptr={:p} allocated={} freed={}", block, record.tag, tag);
                        }
                        _ => tm_emit_ctx!(TM004, "ptr={:p} allocated_aligned={}", block, record.aligned),
                    }
                    violation.get_or_insert(found);
                }

                if self.config.poison_on_free {
                    self.backend.set_memory(block.as_ptr(), FREED_PATTERN as i32, record.size);
                }
                (record.size, record.tag, record.aligned)
            }
        };

        self.backend.free(block, aligned);

        if let Err(live) = self.table.record_free(tag, size) {
            tm_emit_ctx!(TM005, "tag={} live={} freed={}", tag, live, size);
            violation.get_or_insert(ContractViolation::Underflow {
                tag,
                live,
                freed: size,
            });
        }

        if self.config.log_allocations {
            log::trace!("free {:p}: {} bytes tagged {}", block, size, tag);
        }

        match violation {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// Zero `size` bytes at `block`; see [`PlatformBackend::zero_memory`].
    ///
    /// # Safety
    ///
    /// `block` must be valid for `size` bytes of writes.
    pub unsafe fn zero_memory(&self, block: *mut u8, size: usize) -> *mut u8 {
        self.backend.zero_memory(block, size)
    }

    /// Copy `size` bytes; see [`PlatformBackend::copy_memory`].
    ///
    /// # Safety
    ///
    /// Both ranges must be valid for `size` bytes and must not overlap.
    pub unsafe fn copy_memory(&self, dest: *mut u8, source: *const u8, size: usize) -> *mut u8 {
        self.backend.copy_memory(dest, source, size)
    }

    /// Fill `size` bytes with `value as u8`; see [`PlatformBackend::set_memory`].
    ///
    /// # Safety
    ///
    /// `dest` must be valid for `size` bytes of writes.
    pub unsafe fn set_memory(&self, dest: *mut u8, value: i32, size: usize) -> *mut u8 {
        self.backend.set_memory(dest, value, size)
    }

    /// Consistent snapshot of every tag's counters.
    pub fn stats(&self) -> MemoryStats {
        self.table.snapshot()
    }

    /// Live bytes for one tag.
    pub fn live_bytes(&self, tag: MemoryTag) -> usize {
        self.table.live_bytes(tag)
    }

    /// Multi-line per-tag usage summary.
    pub fn usage_report(&self) -> String {
        self.stats().usage_report()
    }

    /// Every live block. Empty in unchecked mode.
    pub fn leak_report(&self) -> Vec<LeakRecord> {
        self.shadow
            .as_ref()
            .map(ShadowTable::leaks)
            .unwrap_or_default()
    }

    /// Emit `TM201` if any block is still live, and return how many are.
    ///
    /// Uses the shadow table in checked mode and the tag counters otherwise.
    pub fn check_leaks(&self) -> u64 {
        let live = match self.shadow {
            Some(ref shadow) => shadow.len() as u64,
            None => self.stats().total_live_allocations(),
        };
        if live > 0 {
            let stats = self.stats();
            tm_emit_ctx!(
                TM201,
                "{} blocks, {} bytes",
                live,
                stats.total_live_bytes()
            );
        }
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::poison::is_freed_poison;
    use crate::diagnostics::suppress_diagnostics;
    use crate::platform::SystemBackend;
    use std::sync::atomic::AtomicUsize;

    /// System backend that can be told to fail, and checks poisoning on free.
    #[derive(Default)]
    struct TestBackend {
        inner: SystemBackend,
        fail: AtomicBool,
        expect_poison: AtomicBool,
        frees: AtomicUsize,
    }

    impl PlatformBackend for TestBackend {
        fn allocate(&self, size: usize, aligned: bool) -> Option<NonNull<u8>> {
            if self.fail.load(Ordering::Relaxed) {
                return None;
            }
            self.inner.allocate(size, aligned)
        }

        unsafe fn free(&self, block: NonNull<u8>, aligned: bool) {
            if self.expect_poison.load(Ordering::Relaxed) {
                let size = SystemBackend::block_size(block);
                let bytes = std::slice::from_raw_parts(block.as_ptr(), size);
                assert!(is_freed_poison(bytes));
            }
            self.frees.fetch_add(1, Ordering::Relaxed);
            self.inner.free(block, aligned)
        }

        fn absolute_time(&self) -> f64 {
            self.inner.absolute_time()
        }

        fn sleep(&self, ms: u64) {
            self.inner.sleep(ms)
        }

        fn processor_count(&self) -> usize {
            1
        }
    }

    fn checked() -> MemoryTracker<TestBackend> {
        suppress_diagnostics(true);
        MemoryTracker::with_backend(TestBackend::default(), TrackerConfig::checked())
    }

    fn unchecked() -> MemoryTracker<TestBackend> {
        suppress_diagnostics(true);
        MemoryTracker::with_backend(TestBackend::default(), TrackerConfig::unchecked())
    }

    #[test]
    fn test_allocate_free_conservation() {
        for tracker in [checked(), unchecked()] {
            let block = tracker.allocate(64, MemoryTag::String).unwrap();
            assert_eq!(tracker.live_bytes(MemoryTag::String), 64);

            unsafe { tracker.try_free(block, 64, MemoryTag::String).unwrap() };
            assert_eq!(tracker.live_bytes(MemoryTag::String), 0);

            let usage = *tracker.stats().tag(MemoryTag::String);
            assert_eq!(usage.allocation_count, 1);
            assert_eq!(usage.free_count, 1);
            assert_eq!(usage.peak_bytes, 64);
        }
    }

    #[test]
    fn test_cross_tag_isolation() {
        let tracker = checked();
        let texture = tracker.allocate(1024, MemoryTag::Texture).unwrap();
        let string = tracker.allocate(256, MemoryTag::String).unwrap();

        let stats = tracker.stats();
        assert_eq!(stats.live_bytes(MemoryTag::Texture), 1024);
        assert_eq!(stats.live_bytes(MemoryTag::String), 256);
        assert_eq!(stats.total_live_bytes(), 1280);

        unsafe {
            tracker.free(texture, 1024, MemoryTag::Texture);
            tracker.free(string, 256, MemoryTag::String);
        }
        assert_eq!(tracker.stats().total_live_bytes(), 0);
    }

    #[test]
    fn test_backend_failure_is_not_accounted() {
        let tracker = checked();
        tracker.backend().fail.store(true, Ordering::Relaxed);

        assert!(tracker.allocate(128, MemoryTag::Job).is_none());
        let usage = *tracker.stats().tag(MemoryTag::Job);
        assert_eq!(usage.live_bytes, 0);
        assert_eq!(usage.allocation_count, 0);
        assert!(tracker.leak_report().is_empty());
    }

    #[test]
    fn test_unknown_tag_is_accounted() {
        let tracker = unchecked();
        let block = tracker.allocate(8, MemoryTag::Unknown).unwrap();
        assert_eq!(tracker.live_bytes(MemoryTag::Unknown), 8);
        unsafe { tracker.free(block, 8, MemoryTag::Unknown) };
        assert_eq!(tracker.live_bytes(MemoryTag::Unknown), 0);
    }

    #[test]
    fn test_double_free_is_caught() {
        let tracker = checked();
        let block = tracker.allocate(32, MemoryTag::Dict).unwrap();

        unsafe {
            assert_eq!(tracker.try_free(block, 32, MemoryTag::Dict), Ok(()));
            assert_eq!(
                tracker.try_free(block, 32, MemoryTag::Dict),
                Err(ContractViolation::UntrackedPointer {
                    address: block.as_ptr() as usize
                })
            );
        }

        assert_eq!(tracker.backend().frees.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.stats().tag(MemoryTag::Dict).free_count, 1);
    }

    #[test]
    fn test_foreign_pointer_is_caught() {
        let tracker = checked();
        let mut local = 0u8;
        let foreign = NonNull::from(&mut local);

        let result = unsafe { tracker.try_free(foreign, 1, MemoryTag::Array) };
        assert!(matches!(result, Err(ContractViolation::UntrackedPointer { .. })));
        assert_eq!(tracker.backend().frees.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_mismatched_free_uses_recorded_values() {
        let tracker = checked();
        let block = tracker.allocate(100, MemoryTag::Texture).unwrap();

        let result = unsafe { tracker.try_free(block, 40, MemoryTag::String) };
        assert!(matches!(
            result,
            Err(ContractViolation::SizeMismatch {
                allocated: 100,
                freed: 40,
                ..
            })
        ));

        let stats = tracker.stats();
        assert_eq!(stats.live_bytes(MemoryTag::Texture), 0);
        assert_eq!(stats.live_bytes(MemoryTag::String), 0);
        assert_eq!(stats.tag(MemoryTag::String).free_count, 0);
        assert!(tracker.leak_report().is_empty());
    }

    #[test]
    fn test_alignment_mismatch_is_caught() {
        let tracker = checked();
        let block = tracker.allocate_aligned(48, MemoryTag::Renderer).unwrap();
        assert_eq!(block.as_ptr() as usize % crate::platform::CACHE_LINE_ALIGN, 0);

        let result = unsafe { tracker.try_free(block, 48, MemoryTag::Renderer) };
        assert!(matches!(
            result,
            Err(ContractViolation::AlignmentMismatch {
                allocated_aligned: true,
                ..
            })
        ));
        assert_eq!(tracker.live_bytes(MemoryTag::Renderer), 0);
    }

    #[test]
    fn test_unchecked_underflow_is_reported() {
        let tracker = unchecked();
        let small = tracker.allocate(16, MemoryTag::Scene).unwrap();
        let large = tracker.allocate(64, MemoryTag::Game).unwrap();

        // Wrong tag: Scene only has 16 live bytes.
        let result = unsafe { tracker.try_free(large, 64, MemoryTag::Scene) };
        assert_eq!(
            result,
            Err(ContractViolation::Underflow {
                tag: MemoryTag::Scene,
                live: 16,
                freed: 64
            })
        );
        assert_eq!(tracker.live_bytes(MemoryTag::Scene), 0);

        unsafe { tracker.free(small, 16, MemoryTag::Scene) };
        assert_eq!(tracker.live_bytes(MemoryTag::Scene), 0);
    }

    #[test]
    fn test_freed_memory_is_poisoned() {
        let tracker = checked();
        tracker.backend().expect_poison.store(true, Ordering::Relaxed);

        let block = tracker.allocate(256, MemoryTag::Resource).unwrap();
        unsafe {
            tracker.set_memory(block.as_ptr(), 0x11, 256);
            tracker.free(block, 256, MemoryTag::Resource);
        }
        assert_eq!(tracker.backend().frees.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_hard_limit_denies() {
        suppress_diagnostics(true);
        let config = TrackerConfig::checked().with_tag_limit(MemoryTag::Texture, 512, 1024);
        let tracker = MemoryTracker::with_backend(TestBackend::default(), config);

        let a = tracker.allocate(600, MemoryTag::Texture).unwrap();
        assert!(tracker.allocate(500, MemoryTag::Texture).is_none());
        let b = tracker.allocate(424, MemoryTag::Texture).unwrap();
        assert_eq!(tracker.live_bytes(MemoryTag::Texture), 1024);

        // Other tags are unaffected.
        let c = tracker.allocate(4096, MemoryTag::String).unwrap();

        unsafe {
            tracker.free(a, 600, MemoryTag::Texture);
            tracker.free(b, 424, MemoryTag::Texture);
            tracker.free(c, 4096, MemoryTag::String);
        }
        assert_eq!(tracker.stats().tag(MemoryTag::Texture).allocation_count, 2);
    }

    #[test]
    fn test_soft_limit_with_huge_request() {
        suppress_diagnostics(true);
        let config = TrackerConfig::checked().with_tag_limit(MemoryTag::Texture, 100, 0);
        let tracker = MemoryTracker::with_backend(TestBackend::default(), config);

        let block = tracker.allocate(10, MemoryTag::Texture).unwrap();
        assert!(tracker.allocate(usize::MAX, MemoryTag::Texture).is_none());

        let usage = *tracker.stats().tag(MemoryTag::Texture);
        assert_eq!(usage.live_bytes, 10);
        assert_eq!(usage.allocation_count, 1);

        unsafe { tracker.free(block, 10, MemoryTag::Texture) };
    }

    #[test]
    fn test_leak_report() {
        let tracker = checked();
        let a = tracker.allocate(10, MemoryTag::Entity).unwrap();
        let b = tracker.allocate_aligned(20, MemoryTag::EntityNode).unwrap();

        let leaks = tracker.leak_report();
        assert_eq!(leaks.len(), 2);
        assert_eq!(tracker.check_leaks(), 2);
        assert!(leaks.iter().any(|l| l.tag == MemoryTag::EntityNode && l.aligned && l.size == 20));

        unsafe {
            tracker.free(a, 10, MemoryTag::Entity);
            tracker.free_aligned(b, 20, MemoryTag::EntityNode);
        }
        assert_eq!(tracker.check_leaks(), 0);
    }

    #[test]
    fn test_unchecked_leak_check_uses_counters() {
        let tracker = unchecked();
        let block = tracker.allocate(10, MemoryTag::Transform).unwrap();
        assert!(tracker.leak_report().is_empty());
        assert_eq!(tracker.check_leaks(), 1);
        unsafe { tracker.free(block, 10, MemoryTag::Transform) };
        assert_eq!(tracker.check_leaks(), 0);
    }

    #[test]
    fn test_pass_through_ops() {
        let tracker = unchecked();
        let block = tracker.allocate(32, MemoryTag::Array).unwrap();
        let src: Vec<u8> = (0..32).collect();

        unsafe {
            let p = block.as_ptr();
            assert_eq!(tracker.copy_memory(p, src.as_ptr(), 32), p);
            assert_eq!(std::slice::from_raw_parts(p, 32), &src[..]);

            assert_eq!(tracker.set_memory(p, 0x1FF, 32), p);
            assert!(std::slice::from_raw_parts(p, 32).iter().all(|&b| b == 0xFF));

            assert_eq!(tracker.zero_memory(p, 32), p);
            assert!(std::slice::from_raw_parts(p, 32).iter().all(|&b| b == 0));

            tracker.free(block, 32, MemoryTag::Array);
        }
    }
}
