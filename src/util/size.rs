//! Size helper functions.

/// Convert kibibytes to bytes.
#[inline]
pub const fn kib(n: usize) -> usize {
    n * 1024
}

/// Convert mebibytes to bytes.
#[inline]
pub const fn mib(n: usize) -> usize {
    n * 1024 * 1024
}

/// Convert gibibytes to bytes.
#[inline]
pub const fn gib(n: usize) -> usize {
    n * 1024 * 1024 * 1024
}

/// Format bytes with the largest binary unit that keeps the value >= 1.
pub fn format_bytes(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = KIB * 1024;
    const GIB: usize = MIB * 1024;

    if bytes >= GIB {
        format!("{:.2}GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2}MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2}KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{}B", bytes)
    }
}
