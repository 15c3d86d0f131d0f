//! Error types.

use crate::api::tag::MemoryTag;

/// A broken allocate/free contract, detected in checked mode.
///
/// In unchecked mode these are undefined behavior and are never reported,
/// except [`Underflow`](Self::Underflow), which the table always detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolation {
    /// The pointer is not a live block of this tracker (foreign pointer or double free).
    UntrackedPointer {
        address: usize,
    },
    /// The size passed to free differs from the allocation size.
    SizeMismatch {
        address: usize,
        allocated: usize,
        freed: usize,
    },
    /// The tag passed to free differs from the allocation tag.
    TagMismatch {
        address: usize,
        allocated: MemoryTag,
        freed: MemoryTag,
    },
    /// An aligned block freed as unaligned, or the reverse.
    AlignmentMismatch {
        address: usize,
        allocated_aligned: bool,
    },
    /// More bytes freed under a tag than it had live.
    Underflow {
        tag: MemoryTag,
        live: usize,
        freed: usize,
    },
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::UntrackedPointer { address } => {
                write!(f, "free of untracked pointer {:#x}", address)
            }
            Self::SizeMismatch {
                address,
                allocated,
                freed,
            } => write!(
                f,
                "block {:#x} allocated with {} bytes but freed with {}",
                address, allocated, freed
            ),
            Self::TagMismatch {
                address,
                allocated,
                freed,
            } => write!(
                f,
                "block {:#x} allocated as {} but freed as {}",
                address, allocated, freed
            ),
            Self::AlignmentMismatch {
                address,
                allocated_aligned,
            } => write!(
                f,
                "block {:#x} allocated {} but freed {}",
                address,
                if allocated_aligned { "aligned" } else { "unaligned" },
                if allocated_aligned { "unaligned" } else { "aligned" }
            ),
            Self::Underflow { tag, live, freed } => write!(
                f,
                "tag {} underflow: freed {} bytes with {} live",
                tag, freed, live
            ),
        }
    }
}

impl std::error::Error for ContractViolation {}

/// Failure to install the process-wide tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The process-wide tracker already exists, either from an earlier
    /// `init` or from a lazy first use.
    AlreadyInitialized,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "memory tracker already initialized"),
        }
    }
}

impl std::error::Error for InitError {}
