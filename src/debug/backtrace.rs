//! Allocation backtrace capture.

use backtrace::Backtrace;

/// Capture the current stack without resolving symbols.
///
/// Resolution is deferred to [`render`], which only runs for leak reports.
pub fn capture() -> Backtrace {
    Backtrace::new_unresolved()
}

/// Resolve and format a captured backtrace.
pub fn render(trace: &Backtrace) -> String {
    let mut trace = trace.clone();
    trace.resolve();
    format!("{:?}", trace)
}
