//! Swap direction for compare-exchange steps.
//!
//! A [`SwapDecision`] looks at the two elements of a compare-exchange pair and says
//! whether they must trade places. [`Polarity`] is the decision used by the network:
//! `Ascending` leaves the higher value on the right, `Descending` on the left.

use std::fmt;

/// Decides whether the pair `(left, right)` is out of order.
pub trait SwapDecision {
    /// Returns true if `left` and `right` must be exchanged.
    fn should_swap(&self, left: i32, right: i32) -> bool;
}

/// Target order of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Polarity {
    /// Lower values first.
    #[default]
    Ascending,
    /// Higher values first.
    Descending,
}

impl Polarity {
    /// The other polarity.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Polarity::Ascending => Polarity::Descending,
            Polarity::Descending => Polarity::Ascending,
        }
    }

    /// Check if `data` is ordered according to this polarity.
    ///
    /// Ascending means non-decreasing, descending means non-increasing; equal
    /// neighbours are allowed either way.
    pub fn is_ordered(self, data: &[i32]) -> bool {
        match self {
            Polarity::Ascending => data.windows(2).all(|w| w[0] <= w[1]),
            Polarity::Descending => data.windows(2).all(|w| w[0] >= w[1]),
        }
    }
}

impl SwapDecision for Polarity {
    #[inline]
    fn should_swap(&self, left: i32, right: i32) -> bool {
        match self {
            Polarity::Ascending => left > right,
            Polarity::Descending => left < right,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Ascending => write!(f, "ascending"),
            Polarity::Descending => write!(f, "descending"),
        }
    }
}
