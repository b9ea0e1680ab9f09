//! Sort configuration.

use std::time::Duration;

use crate::polarity::Polarity;

/// Worker count used when none is given.
pub const DEFAULT_WORKERS: usize = 5;

/// How long the pool may take to wind down after the last round.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for one call to [`crate::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    /// Number of worker threads; must be at least 1.
    pub workers: usize,
    /// Target order of the result.
    pub polarity: Polarity,
    /// Bound on the final pool shutdown; exceeding it fails the sort.
    pub shutdown_timeout: Duration,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            polarity: Polarity::Ascending,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl SortConfig {
    /// Set the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the target order.
    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Set the shutdown bound.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
