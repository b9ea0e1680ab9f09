//! Round-by-round layout of the bitonic network.
//!
//! The network is a series of rounds. Round `k` splits the sequence into blocks of
//! `2^k` elements and runs one [`RecursiveSwapper`] per block; each swapper then
//! halves its block recursively down to single elements. Blocks alternate polarity so
//! that every pair of neighbouring blocks forms a bitonic sequence for the next
//! round, and the last round (a single block covering everything) merges into the
//! requested order.
//!
//! ```text
//! len = 8, target ascending
//! round 0 (size 2): [A ][D ][A ][D ]
//! round 1 (size 4): [A    ][D    ]
//! round 2 (size 8): [A          ]
//! ```

use log::debug;

use crate::errors::SortError;
use crate::math_utils::{ceiling_divide, is_power_of_two};
use crate::polarity::Polarity;
use crate::sequence::SharedSequence;
use crate::swapper::RecursiveSwapper;

/// The top-level swappers of one round.
pub type Round = Vec<RecursiveSwapper<Polarity>>;

/// Produces the rounds of the bitonic network for one sequence.
///
/// A single alternating polarity source runs across all windows of all rounds. It
/// starts opposite to the target and flips before every window; since the network
/// has `len - 1` windows in total (an odd number), the final window lands on the
/// target polarity.
#[derive(Debug)]
pub struct BitonicStagePlanner {
    sequence: SharedSequence,
    group_size: usize,
    last_polarity: Polarity,
}

impl BitonicStagePlanner {
    /// Plan the network that sorts `sequence` into `final_polarity`.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidLength`] unless the length is a power of two.
    pub fn new(sequence: SharedSequence, final_polarity: Polarity) -> Result<Self, SortError> {
        let len = sequence.len();
        if !is_power_of_two(len as i64) {
            return Err(SortError::InvalidLength { len });
        }
        Ok(Self {
            sequence,
            group_size: 2,
            last_polarity: final_polarity.opposite(),
        })
    }

    /// Window size of the next round, if any remain.
    pub fn next_group_size(&self) -> Option<usize> {
        (self.group_size <= self.sequence.len()).then_some(self.group_size)
    }

    fn next_polarity(&mut self) -> Polarity {
        self.last_polarity = self.last_polarity.opposite();
        self.last_polarity
    }
}

impl Iterator for BitonicStagePlanner {
    type Item = Round;

    fn next(&mut self) -> Option<Round> {
        let group = self.next_group_size()?;
        let len = self.sequence.len();

        let mut round = Vec::with_capacity(ceiling_divide(len, group));
        for start in (0..len).step_by(group) {
            let polarity = self.next_polarity();
            round.push(RecursiveSwapper::from_window(
                self.sequence.clone(),
                start,
                start + group,
                polarity,
            ));
        }
        debug!("planned round of {} windows of size {}", round.len(), group);

        self.group_size *= 2;
        Some(round)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.sequence.len();
        let remaining = if self.group_size > len {
            0
        } else {
            (len.trailing_zeros() - self.group_size.trailing_zeros() + 1) as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitonicStagePlanner {}
