//! Compare-exchange passes over power-of-two windows.
//!
//! A [`SinglePassSwapper`] performs one layer of the bitonic network over a window:
//! element `i` of the first half is compared with element `i` of the second half.
//! A [`RecursiveSwapper`] runs that pass and then hands the two halves of its window
//! to whoever subscribed to its [`EventNotifier`], so the rest of the merge can be
//! scheduled as independent tasks. Children only exist once their parent has run,
//! so only the active frontier of the recursion is ever in memory.

use crate::errors::{CoordinationError, SortError};
use crate::event_notifier::EventNotifier;
use crate::polarity::{Polarity, SwapDecision};
use crate::sequence::SharedSequence;

fn check_window(sequence: &SharedSequence, start: usize, stop: usize) -> Result<(), SortError> {
    let len = sequence.len();
    if start >= stop || stop > len || !(stop - start).is_power_of_two() {
        return Err(SortError::InvalidWindow { start, stop, len });
    }
    Ok(())
}

/// One non-recursive compare-exchange pass over `[start, stop)`.
#[derive(Debug, Clone)]
pub struct SinglePassSwapper<D = Polarity> {
    sequence: SharedSequence,
    start: usize,
    comparisons: usize,
    decision: D,
}

impl<D: SwapDecision> SinglePassSwapper<D> {
    /// Create a pass over `[start, stop)`.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidWindow`] unless `start < stop <= len` and
    /// `stop - start` is a power of two.
    pub fn new(
        sequence: SharedSequence,
        start: usize,
        stop: usize,
        decision: D,
    ) -> Result<Self, SortError> {
        check_window(&sequence, start, stop)?;
        Ok(Self::from_window(sequence, start, stop, decision))
    }

    /// Create a pass over the whole sequence.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidWindow`] if the length is not a power of two.
    pub fn whole(sequence: SharedSequence, decision: D) -> Result<Self, SortError> {
        let len = sequence.len();
        Self::new(sequence, 0, len, decision)
    }

    fn from_window(sequence: SharedSequence, start: usize, stop: usize, decision: D) -> Self {
        Self {
            sequence,
            start,
            comparisons: (stop - start) / 2,
            decision,
        }
    }

    /// Number of compare-exchange pairs in this pass (half the window).
    #[inline]
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Run the pass.
    pub fn swap(&self) {
        for left in self.start..self.start + self.comparisons {
            let right = left + self.comparisons;
            if self.decision.should_swap(self.sequence.get(left), self.sequence.get(right)) {
                self.sequence.swap(left, right);
            }
        }
    }
}

/// A pass over a window that announces its two half-windows once it has run.
///
/// Windows of more than two elements expect two children; smaller windows are
/// fully resolved by their own pass and expect none.
pub struct RecursiveSwapper<D = Polarity> {
    pass: SinglePassSwapper<D>,
    notifier: EventNotifier<RecursiveSwapper<D>>,
    start: usize,
    stop: usize,
}

impl<D: SwapDecision + Clone> RecursiveSwapper<D> {
    /// Create a recursive swapper over `[start, stop)`.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidWindow`] under the same rules as [`SinglePassSwapper::new`].
    pub fn new(
        sequence: SharedSequence,
        start: usize,
        stop: usize,
        decision: D,
    ) -> Result<Self, SortError> {
        check_window(&sequence, start, stop)?;
        Ok(Self::from_window(sequence, start, stop, decision))
    }

    /// Create a recursive swapper over the whole sequence.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidWindow`] if the length is not a power of two.
    pub fn whole(sequence: SharedSequence, decision: D) -> Result<Self, SortError> {
        let len = sequence.len();
        Self::new(sequence, 0, len, decision)
    }

    /// Build a swapper for a window already known to be valid.
    pub(crate) fn from_window(
        sequence: SharedSequence,
        start: usize,
        stop: usize,
        decision: D,
    ) -> Self {
        // 1 is a valid power of two and needs no comparisons; 2 is settled by one pass.
        let expected = if stop - start > 2 { 2 } else { 0 };
        Self {
            pass: SinglePassSwapper::from_window(sequence, start, stop, decision),
            notifier: EventNotifier::new(expected),
            start,
            stop,
        }
    }

    /// Run this window's pass, then signal the left and right half-windows.
    ///
    /// # Errors
    /// Propagates the notifier's [`CoordinationError`] if the children cannot be
    /// delivered (no subscriber, or the subscriber rejects them).
    pub fn execute(&self) -> Result<(), CoordinationError> {
        self.pass.swap();

        if self.notifier.expected() != 0 {
            let mid = self.start + self.window_len() / 2;
            let sequence = &self.pass.sequence;
            let decision = &self.pass.decision;

            let first_half = Self::from_window(sequence.clone(), self.start, mid, decision.clone());
            self.notifier.signal(first_half)?;

            let second_half = Self::from_window(sequence.clone(), mid, self.stop, decision.clone());
            self.notifier.signal(second_half)?;
        }
        Ok(())
    }
}

impl<D> RecursiveSwapper<D> {
    /// The notifier that announces this swapper's children.
    ///
    /// Subscribe before calling [`execute`](Self::execute).
    pub fn event_notifier(&self) -> &EventNotifier<RecursiveSwapper<D>> {
        &self.notifier
    }

    /// Inclusive start of the window.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end of the window.
    #[inline]
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Number of elements in the window.
    #[inline]
    pub fn window_len(&self) -> usize {
        self.stop - self.start
    }
}

impl<D> std::fmt::Debug for RecursiveSwapper<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecursiveSwapper")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("notifier", &self.notifier)
            .finish()
    }
}
