//! Small numeric helpers shared by the planner, the CLI and the tests.

/// Returns true if `n` is a positive power of two (1 included).
#[inline]
pub fn is_power_of_two(n: i64) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Integer division rounding towards positive infinity.
///
/// # Panics
/// Panics if `denominator` is zero.
#[inline]
pub fn ceiling_divide(numerator: usize, denominator: usize) -> usize {
    numerator.div_ceil(denominator)
}

/// Returns the values `from_inclusive..=to_inclusive` in ascending order.
///
/// An inverted range yields an empty vector.
pub fn range(from_inclusive: i32, to_inclusive: i32) -> Vec<i32> {
    (from_inclusive..=to_inclusive).collect()
}
