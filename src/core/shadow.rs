//! Shadow table for checked mode.
//!
//! Records every live block keyed by address so a free can be validated
//! against the allocation it claims to match.

use std::collections::HashMap;
use std::ptr::NonNull;

use crate::api::error::ContractViolation;
use crate::api::tag::MemoryTag;
use crate::sync::mutex::Mutex;

/// What the tracker knew about a block when it was allocated.
#[derive(Debug, Clone)]
pub struct AllocRecord {
    pub size: usize,
    pub tag: MemoryTag,
    pub aligned: bool,
    #[cfg(feature = "debug")]
    pub trace: backtrace::Backtrace,
}

impl AllocRecord {
    pub fn new(size: usize, tag: MemoryTag, aligned: bool) -> Self {
        Self {
            size,
            tag,
            aligned,
            #[cfg(feature = "debug")]
            trace: crate::debug::backtrace::capture(),
        }
    }

    /// Compare the arguments of a free against this record.
    pub fn mismatches(
        &self,
        address: usize,
        size: usize,
        tag: MemoryTag,
        aligned: bool,
    ) -> Vec<ContractViolation> {
        let mut found = Vec::new();
        if self.size != size {
            found.push(ContractViolation::SizeMismatch {
                address,
                allocated: self.size,
                freed: size,
            });
        }
        if self.tag != tag {
            found.push(ContractViolation::TagMismatch {
                address,
                allocated: self.tag,
                freed: tag,
            });
        }
        if self.aligned != aligned {
            found.push(ContractViolation::AlignmentMismatch {
                address,
                allocated_aligned: self.aligned,
            });
        }
        found
    }
}

/// A block still live at the time of a leak report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakRecord {
    /// Address returned by allocate.
    pub address: usize,

    /// Size in bytes.
    pub size: usize,

    /// Tag the block is accounted under.
    pub tag: MemoryTag,

    /// Whether the block came from `allocate_aligned`.
    pub aligned: bool,

    /// Allocation backtrace (`debug` feature only).
    pub backtrace: Option<String>,
}

impl std::fmt::Display for LeakRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#x}: {} bytes tagged {}{}",
            self.address,
            self.size,
            self.tag,
            if self.aligned { " (aligned)" } else { "" }
        )?;
        if let Some(ref trace) = self.backtrace {
            write!(f, "\n{}", trace)?;
        }
        Ok(())
    }
}

/// Live blocks keyed by address.
#[derive(Default)]
pub struct ShadowTable {
    records: Mutex<HashMap<usize, AllocRecord>>,
}

impl ShadowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh block.
    pub fn insert(&self, block: NonNull<u8>, record: AllocRecord) {
        let previous = self.records.lock().insert(block.as_ptr() as usize, record);
        debug_assert!(
            previous.is_none(),
            "backend returned live block {:p} twice",
            block
        );
    }

    /// Remove and return the record of a block being freed.
    pub fn take(&self, block: NonNull<u8>) -> Option<AllocRecord> {
        self.records.lock().remove(&(block.as_ptr() as usize))
    }

    /// Number of live blocks.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Every live block, sorted by address.
    pub fn leaks(&self) -> Vec<LeakRecord> {
        let records = self.records.lock();
        let mut leaks: Vec<_> = records
            .iter()
            .map(|(&address, record)| LeakRecord {
                address,
                size: record.size,
                tag: record.tag,
                aligned: record.aligned,
                #[cfg(feature = "debug")]
                backtrace: Some(crate::debug::backtrace::render(&record.trace)),
                #[cfg(not(feature = "debug"))]
                backtrace: None,
            })
            .collect();
        leaks.sort_by_key(|leak| leak.address);
        leaks
    }
}
