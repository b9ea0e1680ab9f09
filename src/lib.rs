//! Parallel bitonic sort on a bounded worker pool.
//!
//! The bitonic network is run round by round. Each round's windows become
//! [`RecursiveSwapper`] tasks on a [`BoundedWorkerPool`]; every task performs one
//! compare-exchange pass and announces its two half-windows through an
//! [`EventNotifier`]. The coordinating thread collects those announcements from an
//! [`EventQueue`] and submits them in turn, then waits for the whole round before
//! starting the next one.
//!
//! - **Reference**: [`cpu_bitonic_sort`] runs the same network on one thread.
//! - **Requirements**: `i32` values, power-of-two lengths.
//!
//! ```
//! use bitonic_pool::{sort, SortConfig};
//!
//! let mut data = vec![8, 7, 6, 5, 4, 3, 2, 1];
//! let report = sort(&mut data, &SortConfig::default().with_workers(8)).unwrap();
//! assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
//! assert_eq!(report.rounds, 3);
//! ```

pub mod config;
pub mod cpu_bitonic_sort;
pub mod errors;
pub mod event_notifier;
pub mod event_queue;
pub mod math_utils;
pub mod orchestrator;
pub mod polarity;
pub mod sequence;
pub mod stage_planner;
pub mod swapper;
pub mod worker_pool;

pub use config::SortConfig;
pub use errors::{CoordinationError, PoolError, Result, SortError, TaskFailure};
pub use event_notifier::EventNotifier;
pub use event_queue::EventQueue;
pub use orchestrator::{sort, SortOrchestrator, SortReport};
pub use polarity::{Polarity, SwapDecision};
pub use sequence::SharedSequence;
pub use stage_planner::BitonicStagePlanner;
pub use swapper::{RecursiveSwapper, SinglePassSwapper};
pub use worker_pool::{BoundedWorkerPool, TaskHandle};
