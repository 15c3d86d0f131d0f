//! Process-wide tracker.
//!
//! Installed explicitly with [`init`], or lazily from the environment on
//! first use.

use std::sync::OnceLock;

use crate::api::config::TrackerConfig;
use crate::api::error::InitError;
use crate::api::tracker::MemoryTracker;

static GLOBAL: OnceLock<MemoryTracker> = OnceLock::new();

/// Install the process-wide tracker.
///
/// Must run before anything touches [`global`]; afterwards the tracker is
/// fixed for the life of the process.
pub fn init(config: TrackerConfig) -> Result<&'static MemoryTracker, InitError> {
    let mut installed = false;
    let tracker = GLOBAL.get_or_init(|| {
        installed = true;
        create(config)
    });
    if installed {
        Ok(tracker)
    } else {
        Err(InitError::AlreadyInitialized)
    }
}

/// The process-wide tracker, created from [`TrackerConfig::from_env`] if
/// [`init`] was never called.
pub fn global() -> &'static MemoryTracker {
    GLOBAL.get_or_init(|| create(TrackerConfig::from_env()))
}

/// Whether the process-wide tracker exists yet.
pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

fn create(config: TrackerConfig) -> MemoryTracker {
    log::info!(
        "memory tracker initialized (checked={}, poison={})",
        config.checked,
        config.poison_on_free
    );
    MemoryTracker::new(config)
}
