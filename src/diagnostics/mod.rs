//! Runtime diagnostics for the tracking boundary.
//!
//! This module provides:
//! - **Diagnostic codes**: rustc-style messages for contract violations
//! - **Emission**: to the `log` facade, and to stderr in debug builds
//! - **Strict mode**: optional panic-on-error for CI
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                        |
//! |-------|--------------------------------|
//! | TM0xx | Free contract / accounting     |
//! | TM1xx | Allocation issues              |
//! | TM2xx | Leak checks                    |
//! | TM3xx | Tag budgets                    |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagalloc::diagnostics::{set_strict_mode, StrictMode};
//!
//! // Make every contract violation fatal in CI.
//! set_strict_mode(StrictMode::PanicOnError);
//! ```

pub mod emit;
pub mod kind;
pub mod macros;
pub mod strict;

pub use emit::{emit, emit_with_context, suppress_diagnostics};
pub use kind::{Diagnostic, DiagnosticKind};
pub use strict::{init_from_env, set_strict_mode, strict_mode, StrictMode, StrictModeGuard};

pub use kind::{TM001, TM002, TM003, TM004, TM005, TM101, TM102, TM201, TM301, TM302};
