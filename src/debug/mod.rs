//! Debug helpers used by checked mode.
//!
//! Backtrace capture is only compiled with the `debug` feature.

#[cfg(feature = "debug")]
pub(crate) mod backtrace;
pub(crate) mod poison;
