//! Capacity-growth formula for a writable byte region, and a symmetric
//! shrink-on-reset policy (spec.md §4.2).

use crate::config::{SHRINK_ABOVE, SHRINK_TARGET};

/// Computes the new capacity a buffer of `cap` bytes should grow to in
/// order to fit `extra` more bytes.
///
/// `cap` doubles below 8192 bytes and grows by 1.5x above it; if that
/// alone wouldn't fit `extra` more bytes, the extra is added on top.
/// This is the same formula as the Go source's `grow()`: amortized O(1)
/// per byte written.
#[inline]
pub fn grown_capacity(cap: usize, extra: usize) -> usize {
    let doubled = cap.saturating_mul(2);
    let new_cap = if cap <= 8192 {
        doubled
    } else {
        cap + cap / 2
    };
    if new_cap < cap + extra {
        new_cap + extra
    } else {
        new_cap
    }
}

/// Returns the capacity a buffer should be reallocated down to on reset,
/// if its current capacity exceeds the shrink threshold.
#[inline]
pub fn shrink_target(cap: usize) -> Option<usize> {
    if cap > SHRINK_ABOVE {
        Some(SHRINK_TARGET)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_below_8192() {
        assert_eq!(grown_capacity(1024, 10), 2048);
        assert_eq!(grown_capacity(8192, 1), 16384);
    }

    #[test]
    fn grows_by_1_5x_above_8192() {
        assert_eq!(grown_capacity(16384, 1), 16384 + 8192);
    }

    #[test]
    fn adds_extra_when_growth_formula_insufficient() {
        // requesting more than doubling can supply
        assert_eq!(grown_capacity(10, 1000), 1010);
    }

    #[test]
    fn shrink_only_above_threshold() {
        assert_eq!(shrink_target(2 * 1024 * 1024), None);
        assert_eq!(shrink_target(2 * 1024 * 1024 + 1), Some(1024 * 1024));
    }

    #[test]
    fn growth_is_monotonic_and_bounded() {
        // capacity after growth must be >= what was requested and fall
        // within the documented upper bound (1.5x/2x + extra).
        let mut cap = 64usize;
        for extra in [10, 100, 1000, 50_000, 1] {
            let new_cap = grown_capacity(cap, extra);
            assert!(new_cap >= cap + extra);
            cap = new_cap;
        }
    }
}
