//! # tagalloc
//!
//! Tagged memory tracking over a platform backend.
//!
//! Every heap allocation goes through a [`MemoryTracker`] and is attributed to
//! a [`MemoryTag`] (textures, strings, jobs, ...). The tracker keeps live
//! bytes, peaks and counts per tag so a running program can report where its
//! memory goes.
//!
//! ## Features
//!
//! - Per-tag accounting with consistent snapshots
//! - Checked mode: frees validated against a shadow table, freed memory poisoned
//! - Optional per-tag soft/hard budgets
//! - Bulk memory primitives and a monotonic clock from the same backend
//! - rustc-style diagnostics with a strict mode for CI
//! - Optional C API (`ffi` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use tagalloc::{MemoryTag, MemoryTracker, TrackerConfig};
//!
//! let tracker = MemoryTracker::new(TrackerConfig::default());
//!
//! let texture = tracker.allocate(4096, MemoryTag::Texture).unwrap();
//! println!("{}", tracker.usage_report());
//!
//! unsafe { tracker.free(texture, 4096, MemoryTag::Texture) };
//! ```
//!
//! The process-wide tracker is reached through [`global`] or the free
//! functions in [`memory`]:
//!
//! ```rust,no_run
//! use tagalloc::{memory, MemoryTag, TrackerConfig};
//!
//! tagalloc::init(TrackerConfig::checked()).unwrap();
//!
//! let block = memory::allocate(256, MemoryTag::Job).unwrap();
//! unsafe { memory::free(block, 256, MemoryTag::Job) };
//! ```

pub mod api;
pub mod diagnostics;
pub mod platform;

mod core;
mod debug;
mod sync;
mod util;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export public API at crate root for convenience
pub use api::buffer::TaggedBuf;
pub use api::clock::Stopwatch;
pub use api::config::TrackerConfig;
pub use api::error::{ContractViolation, InitError};
pub use api::memory;
pub use api::stats::{MemoryStats, TagUsage};
pub use api::tag::MemoryTag;
pub use api::tracker::MemoryTracker;

pub use crate::core::budget::{BudgetStatus, TagBudgets, TagLimit};
pub use crate::core::global::{global, init, is_initialized};
pub use crate::core::shadow::LeakRecord;

pub use platform::{DefaultBackend, PlatformBackend, SystemBackend};

pub use util::size::{format_bytes, gib, kib, mib};
