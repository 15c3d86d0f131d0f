//! Per-tag memory budgets.

use crate::api::tag::MemoryTag;

/// Soft and hard byte limits for one tag. `0` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagLimit {
    /// Warning threshold.
    pub soft_limit: usize,

    /// Allocations that would pass this are denied.
    pub hard_limit: usize,
}

impl TagLimit {
    /// Create a limit pair.
    pub const fn new(soft_limit: usize, hard_limit: usize) -> Self {
        Self {
            soft_limit,
            hard_limit,
        }
    }

    /// A limit that never triggers.
    pub const UNLIMITED: Self = Self::new(0, 0);

    /// Check the budget status for an allocation of `additional` bytes on top of `live`.
    pub fn check_status(&self, live: usize, additional: usize) -> BudgetStatus {
        let projected = live.saturating_add(additional);

        if self.hard_limit > 0 && projected > self.hard_limit {
            BudgetStatus::Exceeded
        } else if self.soft_limit > 0 && projected > self.soft_limit {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Ok
        }
    }

    /// Whether `live` bytes are already past the soft limit.
    pub fn over_soft(&self, live: usize) -> bool {
        self.soft_limit > 0 && live > self.soft_limit
    }

    /// Calculate usage as a percentage of the hard limit.
    pub fn usage_percent(&self, live: usize) -> f64 {
        if self.hard_limit == 0 {
            0.0
        } else {
            (live as f64 / self.hard_limit as f64) * 100.0
        }
    }
}

/// Result of a budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Under budget, allocation allowed
    Ok,

    /// Over soft limit, warning issued
    Warning,

    /// Over hard limit, allocation denied
    Exceeded,
}

/// Limits for every tag, indexed by tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBudgets {
    limits: [TagLimit; MemoryTag::COUNT],
}

impl TagBudgets {
    /// Budgets with every tag unlimited.
    pub const fn unlimited() -> Self {
        Self {
            limits: [TagLimit::UNLIMITED; MemoryTag::COUNT],
        }
    }

    /// Set the limits for a tag.
    pub fn set(&mut self, tag: MemoryTag, limit: TagLimit) {
        self.limits[tag.index()] = limit;
    }

    /// Limits for a tag.
    pub fn get(&self, tag: MemoryTag) -> TagLimit {
        self.limits[tag.index()]
    }

    /// Check an allocation of `size` bytes under `tag` with `live` bytes already in use.
    pub fn check(&self, tag: MemoryTag, live: usize, size: usize) -> BudgetStatus {
        self.get(tag).check_status(live, size)
    }

    /// Whether any tag has a limit at all.
    pub fn is_limited(&self) -> bool {
        self.limits.iter().any(|l| *l != TagLimit::UNLIMITED)
    }
}

impl Default for TagBudgets {
    fn default() -> Self {
        Self::unlimited()
    }
}
