//! Debug assertion macros for ring buffer invariants.
//!
//! These macros check the cursor invariants in debug builds only
//! (`debug_assert!`), so there is zero overhead in release builds. The
//! caller-facing contract checks (push beyond `free()`, pull beyond
//! `available()`, capacity not a power of two) are hard `assert!`s in
//! `ring.rs` and stay on in release builds.

// =============================================================================
// Bounded Count
// =============================================================================

/// Assert that the buffered byte count does not exceed capacity.
///
/// **Invariant**: `0 ≤ write_cursor - read_cursor ≤ capacity` (wrapping)
///
/// Used in: `push()` after advancing the write cursor
macro_rules! debug_assert_bounded_count {
    ($write:expr, $read:expr, $capacity:expr) => {
        debug_assert!(
            $write.wrapping_sub($read) <= $capacity,
            "bounded count violated: write cursor {} read cursor {} hold {} bytes, capacity {}",
            $write,
            $read,
            $write.wrapping_sub($read),
            $capacity
        )
    };
}

/// Assert that the read cursor does not advance past the write cursor.
///
/// **Invariant**: after a pull, `write_cursor - read_cursor` is still a valid
/// count; a read cursor past the write cursor shows up as a huge wrapped count.
///
/// Used in: `pull()` after advancing the read cursor
macro_rules! debug_assert_read_not_past_write {
    ($new_read:expr, $write:expr, $capacity:expr) => {
        debug_assert!(
            $write.wrapping_sub($new_read) <= $capacity,
            "read cursor {} advanced beyond write cursor {}",
            $new_read,
            $write
        )
    };
}

// =============================================================================
// Address Mask
// =============================================================================

/// Assert that the address mask selects exactly the low bits of a capacity.
///
/// **Invariant**: `mask == capacity - 1` and `capacity & mask == 0`
///
/// Used in: `begin()`
macro_rules! debug_assert_mask_matches {
    ($mask:expr, $capacity:expr) => {
        debug_assert!(
            $mask == $capacity - 1 && $capacity & $mask == 0,
            "mask {:#x} does not match capacity {:#x}",
            $mask,
            $capacity
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_mask_matches;
pub(crate) use debug_assert_read_not_past_write;
