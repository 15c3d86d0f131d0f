//! Public API for tagalloc.
//!
//! Most users only need [`MemoryTracker`](tracker::MemoryTracker),
//! [`MemoryTag`](tag::MemoryTag) and the process-wide functions in [`memory`].

pub mod buffer;
pub mod clock;
pub mod config;
pub mod error;
pub mod memory;
pub mod stats;
pub mod tag;
pub mod tracker;
