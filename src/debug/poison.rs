//! Memory poisoning for debugging.
//!
//! Freed blocks are filled with a known pattern before they go back to the
//! backend, so a stale read shows up as `0xCD` bytes instead of plausible data.

/// Pattern used to poison freed memory.
pub const FREED_PATTERN: u8 = 0xCD;

/// Check if a region is entirely filled with the freed pattern.
#[cfg(test)]
pub fn is_freed_poison(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == FREED_PATTERN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_freed_poison() {
        assert!(is_freed_poison(&[FREED_PATTERN; 8]));
        assert!(is_freed_poison(&[]));
        assert!(!is_freed_poison(&[FREED_PATTERN, 0, FREED_PATTERN]));
    }
}
