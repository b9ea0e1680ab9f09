//! The sequence being sorted, shared between the coordinator and the workers.
//!
//! Every worker holds a cheap clone of the same [`SharedSequence`]. Elements are
//! plain relaxed atomics: the network never lets two concurrently running swappers
//! touch the same index, so no element needs a lock. Ordering between rounds comes
//! from the pool's completion handles, which every round joins before the next one
//! is submitted.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Fixed-length `i32` sequence shared across worker threads.
#[derive(Debug, Clone)]
pub struct SharedSequence {
    cells: Arc<[AtomicI32]>,
}

impl SharedSequence {
    /// Create a sequence holding a copy of `data`.
    pub fn from_slice(data: &[i32]) -> Self {
        let cells: Arc<[AtomicI32]> = data.iter().map(|&v| AtomicI32::new(v)).collect();
        Self { cells }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the sequence holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> i32 {
        self.cells[index].load(Ordering::Relaxed)
    }

    /// Overwrite the value at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&self, index: usize, value: i32) {
        self.cells[index].store(value, Ordering::Relaxed);
    }

    /// Exchange the values at `a` and `b`.
    ///
    /// Not atomic as a pair; callers must own both indices exclusively.
    #[inline]
    pub fn swap(&self, a: usize, b: usize) {
        let left = self.get(a);
        let right = self.get(b);
        self.set(a, right);
        self.set(b, left);
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<i32> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Write the current contents into `out`.
    ///
    /// # Panics
    /// Panics if `out.len() != self.len()`.
    pub fn copy_to(&self, out: &mut [i32]) {
        assert_eq!(out.len(), self.len(), "destination length must match the sequence");
        for (dst, cell) in out.iter_mut().zip(self.cells.iter()) {
            *dst = cell.load(Ordering::Relaxed);
        }
    }
}
