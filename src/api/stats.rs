//! Per-tag memory statistics.

use crate::api::tag::MemoryTag;
use crate::util::size::format_bytes;

/// Counters for one tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagUsage {
    /// Bytes currently allocated under the tag.
    pub live_bytes: usize,

    /// Highest `live_bytes` ever observed (high water mark).
    pub peak_bytes: usize,

    /// Total number of allocations performed.
    pub allocation_count: u64,

    /// Total number of frees performed.
    pub free_count: u64,
}

impl TagUsage {
    /// Number of blocks currently live.
    pub fn live_allocations(&self) -> u64 {
        self.allocation_count.saturating_sub(self.free_count)
    }

    pub(crate) fn record_alloc(&mut self, size: usize) {
        self.live_bytes += size;
        self.allocation_count += 1;
        if self.live_bytes > self.peak_bytes {
            self.peak_bytes = self.live_bytes;
        }
    }

    /// Returns the live byte count before the free if it was smaller than `size`.
    pub(crate) fn record_free(&mut self, size: usize) -> Result<(), usize> {
        self.free_count += 1;
        match self.live_bytes.checked_sub(size) {
            Some(live) => {
                self.live_bytes = live;
                Ok(())
            }
            None => {
                let live = self.live_bytes;
                self.live_bytes = 0;
                Err(live)
            }
        }
    }
}

/// A consistent snapshot of every tag's counters.
///
/// Taken under the table lock, so no tag is ever seen half updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    tags: [TagUsage; MemoryTag::COUNT],

    /// Highest total live bytes across all tags.
    pub peak_total: usize,
}

impl MemoryStats {
    pub(crate) fn new(tags: [TagUsage; MemoryTag::COUNT], peak_total: usize) -> Self {
        Self { tags, peak_total }
    }

    /// Counters for a tag.
    pub fn tag(&self, tag: MemoryTag) -> &TagUsage {
        &self.tags[tag.index()]
    }

    /// Live bytes for a tag.
    pub fn live_bytes(&self, tag: MemoryTag) -> usize {
        self.tag(tag).live_bytes
    }

    /// Live bytes summed over all tags.
    pub fn total_live_bytes(&self) -> usize {
        self.tags.iter().map(|t| t.live_bytes).sum()
    }

    /// Live blocks summed over all tags.
    pub fn total_live_allocations(&self) -> u64 {
        self.tags.iter().map(TagUsage::live_allocations).sum()
    }

    /// Iterate tags with their counters, in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (MemoryTag, &TagUsage)> + '_ {
        MemoryTag::ALL.iter().copied().zip(self.tags.iter())
    }

    /// Multi-line usage summary, one line per tag.
    pub fn usage_report(&self) -> String {
        self.to_string()
    }
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self::new([TagUsage::default(); MemoryTag::COUNT], 0)
    }
}

impl std::fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "System memory use (tagged):")?;
        for (tag, usage) in self.iter() {
            writeln!(
                f,
                "  {:<12}: {:>10}  ({} live, peak {})",
                tag.name(),
                format_bytes(usage.live_bytes),
                usage.live_allocations(),
                format_bytes(usage.peak_bytes)
            )?;
        }
        writeln!(
            f,
            "  {:<12}: {:>10}  ({} live, peak {})",
            "TOTAL",
            format_bytes(self.total_live_bytes()),
            self.total_live_allocations(),
            format_bytes(self.peak_total)
        )?;
        Ok(())
    }
}
