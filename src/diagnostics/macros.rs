//! Diagnostic macros.

/// Emit a predefined diagnostic by code.
///
/// # Example
///
/// ```rust,ignore
/// tm_emit!(TM102);
/// ```
#[macro_export]
macro_rules! tm_emit {
    ($code:ident) => {{
        $crate::diagnostics::emit::emit(&$crate::diagnostics::$code);
    }};
}

/// Emit a predefined diagnostic with a formatted runtime context.
///
/// The context is only formatted when diagnostics are not suppressed.
///
/// # Example
///
/// ```rust,ignore
/// tm_emit_ctx!(TM002, "ptr={:p} allocated={} freed={}", ptr, expected, actual);
/// ```
#[macro_export]
macro_rules! tm_emit_ctx {
    ($code:ident, $($arg:tt)+) => {{
        if !$crate::diagnostics::emit::is_suppressed() {
            $crate::diagnostics::emit::emit_with_context(
                &$crate::diagnostics::$code,
                &format!($($arg)+),
            );
        }
    }};
}

pub use crate::{tm_emit, tm_emit_ctx};
