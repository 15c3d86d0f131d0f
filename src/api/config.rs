//! Tracker configuration.

use crate::api::tag::MemoryTag;
use crate::core::budget::{TagBudgets, TagLimit};

/// Configuration for a [`MemoryTracker`](crate::MemoryTracker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Validate every free against a shadow table of live blocks.
    ///
    /// Defaults to on in debug builds and with the `checked` feature.
    pub checked: bool,

    /// Fill freed blocks with `0xCD` before releasing them (checked mode only).
    pub poison_on_free: bool,

    /// Emit a `log::trace!` line for every tracked allocate and free.
    pub log_allocations: bool,

    /// Per-tag soft/hard limits.
    pub budgets: TagBudgets,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let checked = cfg!(any(debug_assertions, feature = "checked"));
        Self {
            checked,
            poison_on_free: checked,
            log_allocations: false,
            budgets: TagBudgets::unlimited(),
        }
    }
}

impl TrackerConfig {
    /// Shadow-table validation and poisoning on, regardless of build profile.
    pub fn checked() -> Self {
        Self {
            checked: true,
            poison_on_free: true,
            ..Self::default()
        }
    }

    /// Trust the caller's (pointer, size, tag) triple. No per-block bookkeeping.
    pub fn unchecked() -> Self {
        Self {
            checked: false,
            poison_on_free: false,
            ..Self::default()
        }
    }

    /// Defaults overridden from the environment.
    ///
    /// - `TAGALLOC_CHECKED` - "1"/"true"/"on" or "0"/"false"/"off"
    /// - `TAGALLOC_LOG_ALLOCS` - same values
    /// - `TAGALLOC_STRICT` - strict mode, see [`crate::diagnostics::strict::init_from_env`]
    pub fn from_env() -> Self {
        crate::diagnostics::strict::init_from_env();

        let mut config = Self::default();
        if let Some(checked) = env_flag("TAGALLOC_CHECKED") {
            config.checked = checked;
            config.poison_on_free = checked;
        }
        if let Some(log_allocations) = env_flag("TAGALLOC_LOG_ALLOCS") {
            config.log_allocations = log_allocations;
        }
        config
    }

    /// Builder pattern: enable checked mode.
    pub fn with_checked(mut self, enable: bool) -> Self {
        self.checked = enable;
        self
    }

    /// Builder pattern: enable poisoning of freed blocks.
    pub fn with_poison(mut self, enable: bool) -> Self {
        self.poison_on_free = enable;
        self
    }

    /// Builder pattern: enable per-allocation trace logging.
    pub fn with_allocation_logging(mut self, enable: bool) -> Self {
        self.log_allocations = enable;
        self
    }

    /// Builder pattern: set soft and hard byte limits for a tag (0 = unlimited).
    pub fn with_tag_limit(mut self, tag: MemoryTag, soft_limit: usize, hard_limit: usize) -> Self {
        self.budgets.set(tag, TagLimit::new(soft_limit, hard_limit));
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|val| parse_flag(&val))
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
