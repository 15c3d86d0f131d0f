//! Accounting internals behind [`MemoryTracker`](crate::MemoryTracker).

pub mod budget;
pub mod global;
pub mod shadow;
pub mod table;
