//! Error types for the parallel bitonic sort.
//!
//! - [`SortError`] is what callers of the sort see.
//! - [`CoordinationError`] covers misuse of the event notifier/queue protocol.
//! - [`PoolError`] covers the worker pool itself.
//! - [`TaskFailure`] is how a single pooled task reports that it did not finish cleanly.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sort operations
pub type Result<T> = std::result::Result<T, SortError>;

/// Error type for sort operations
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SortError {
    /// The sequence length is not a power of two.
    #[error("sequence length must be a power of two, got {len}")]
    InvalidLength {
        /// The rejected length
        len: usize,
    },

    /// A window does not describe a power-of-two range inside the sequence.
    #[error("invalid window [{start}, {stop}) over a sequence of length {len}")]
    InvalidWindow {
        /// Inclusive start index
        start: usize,
        /// Exclusive stop index
        stop: usize,
        /// Length of the underlying sequence
        len: usize,
    },

    /// The notifier/queue protocol was violated.
    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    /// The worker pool refused or failed to run a task.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A swapper task failed; the sort was aborted once the round had drained.
    #[error("round {round} aborted: {failure}")]
    TaskFailed {
        /// Zero-based index of the failing round
        round: usize,
        /// The first failure observed in that round
        failure: TaskFailure,
    },

    /// The pool did not terminate within the shutdown window.
    #[error("sort did not finish within {timeout:?}")]
    ShutdownTimeout {
        /// The configured shutdown window
        timeout: Duration,
    },
}

impl SortError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SortError::InvalidLength { .. } => "sort_invalid_length",
            SortError::InvalidWindow { .. } => "sort_invalid_window",
            SortError::Coordination(e) => e.as_label(),
            SortError::Pool(e) => e.as_label(),
            SortError::TaskFailed { .. } => "sort_task_failed",
            SortError::ShutdownTimeout { .. } => "sort_shutdown_timeout",
        }
    }
}

/// Violations of the event notifier/queue protocol.
///
/// These always indicate a bug in whoever drives the notifiers; none of them are retryable.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    /// A notifier was asked to expect a negative number of events.
    #[error("expected event count must be non-negative, got {expected}")]
    NegativeExpected {
        /// The rejected count
        expected: i64,
    },

    /// A second consumer tried to attach to a notifier.
    #[error("output has already been registered")]
    OutputAlreadyRegistered,

    /// A notifier was signalled before anyone subscribed.
    #[error("output has not yet been registered")]
    OutputNotRegistered,

    /// A notifier was signalled more often than it declared.
    #[error("all {expected} expected events have already been signalled")]
    NotifierExhausted {
        /// The notifier's declared count
        expected: usize,
    },

    /// The queue received an event nobody registered an expectation for.
    #[error("no more events are expected")]
    NoMoreEventsExpected,

    /// The queue was read with nothing buffered or owed.
    #[error("there are no more events to read")]
    NoMoreEventsToRead,

    /// A producer finished without emitting everything it owed.
    #[error("a producer failed before emitting all expected events")]
    ProducerFailed,

    /// The queue's buffer lost its sending side.
    #[error("event buffer disconnected")]
    Disconnected,
}

impl CoordinationError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CoordinationError::NegativeExpected { .. } => "coordination_negative_expected",
            CoordinationError::OutputAlreadyRegistered => "coordination_output_already_registered",
            CoordinationError::OutputNotRegistered => "coordination_output_not_registered",
            CoordinationError::NotifierExhausted { .. } => "coordination_notifier_exhausted",
            CoordinationError::NoMoreEventsExpected => "coordination_no_more_events_expected",
            CoordinationError::NoMoreEventsToRead => "coordination_no_more_events_to_read",
            CoordinationError::ProducerFailed => "coordination_producer_failed",
            CoordinationError::Disconnected => "coordination_disconnected",
        }
    }
}

/// Errors produced by the bounded worker pool.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
    /// A pool needs at least one worker.
    #[error("worker pool needs at least one worker")]
    ZeroWorkers,

    /// The underlying thread pool could not be built.
    #[error("failed to build worker threads: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),

    /// The pool no longer accepts tasks.
    #[error("worker pool has been shut down")]
    ShutDown,
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::ZeroWorkers => "pool_zero_workers",
            PoolError::Build(_) => "pool_build",
            PoolError::ShutDown => "pool_shut_down",
        }
    }
}

/// Why a pooled task did not complete successfully.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// The task returned an error.
    #[error("task failed: {0}")]
    Failed(String),

    /// The task panicked.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was dropped without reporting an outcome.
    #[error("task outcome was lost")]
    Lost,
}
