//! Diagnostic kinds and core types.
//!
//! Mirrors rustc's diagnostic levels for familiar UX.

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A hard error - a contract was broken.
    Error,
    /// A warning - probably wrong or over budget.
    Warning,
    /// Additional context, nothing is wrong yet.
    Note,
    /// Actionable suggestion to fix the issue.
    Help,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
            DiagnosticKind::Help => "help",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
///
/// Diagnostic codes follow the pattern:
/// - `TM0xx` - Free contract and accounting violations
/// - `TM1xx` - Allocation issues
/// - `TM2xx` - Leak checks
/// - `TM3xx` - Tag budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "TM001").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Create a new note diagnostic.
    pub const fn note(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Note,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

// =============================================================================
// Predefined diagnostics (TM0xx - Free contract)
// =============================================================================

/// TM001: Free of a pointer the tracker never handed out (or already freed).
pub const TM001: Diagnostic = Diagnostic::error(
    "TM001",
    "free of an untracked pointer"
).with_note("the pointer was never allocated by this tracker, or was already freed")
 .with_help("free each block exactly once, with the pointer returned by allocate()");

/// TM002: Free size differs from the allocation size.
pub const TM002: Diagnostic = Diagnostic::error(
    "TM002",
    "free size does not match the allocation size"
).with_note("the block was released and accounted with its recorded size")
 .with_help("pass the same size to free() that was passed to allocate()");

/// TM003: Free tag differs from the allocation tag.
pub const TM003: Diagnostic = Diagnostic::error(
    "TM003",
    "free tag does not match the allocation tag"
).with_note("the block was accounted against its recorded tag")
 .with_help("pass the same MemoryTag to free() that was passed to allocate()");

/// TM004: Aligned block freed as unaligned, or the reverse.
pub const TM004: Diagnostic = Diagnostic::error(
    "TM004",
    "free alignment does not match the allocation"
).with_help("release blocks from allocate_aligned() with free_aligned()");

/// TM005: Tag total would go negative.
pub const TM005: Diagnostic = Diagnostic::error(
    "TM005",
    "tag accounting underflow"
).with_note("more bytes were freed under this tag than were allocated; the total was clamped to zero")
 .with_help("enable checked mode (TAGALLOC_CHECKED=1) to find the mismatched free");

// =============================================================================
// Predefined diagnostics (TM1xx - Allocation)
// =============================================================================

/// TM101: The backend could not satisfy an allocation.
pub const TM101: Diagnostic = Diagnostic::warning(
    "TM101",
    "backend allocation failed"
).with_note("the platform allocator returned null; nothing was accounted");

/// TM102: Allocation under the uncategorized tag.
pub const TM102: Diagnostic = Diagnostic::note(
    "TM102",
    "allocation tagged MemoryTag::Unknown"
).with_help("assign a specific MemoryTag, or add a new one, so usage reports stay meaningful");

// =============================================================================
// Predefined diagnostics (TM2xx - Leaks)
// =============================================================================

/// TM201: Blocks still live at a leak check.
pub const TM201: Diagnostic = Diagnostic::warning(
    "TM201",
    "tracked allocations are still live"
).with_help("call leak_report() for addresses, sizes and tags");

// =============================================================================
// Predefined diagnostics (TM3xx - Budgets)
// =============================================================================

/// TM301: Tag hard limit exceeded.
pub const TM301: Diagnostic = Diagnostic::error(
    "TM301",
    "allocation exceeds tag hard limit"
).with_note("the allocation was denied and allocate() returned None")
 .with_help("check for leaks in this subsystem or raise the limit with TrackerConfig::with_tag_limit()");

/// TM302: Tag soft limit exceeded.
pub const TM302: Diagnostic = Diagnostic::warning(
    "TM302",
    "allocation exceeds tag soft limit"
).with_note("the allocation succeeded");
