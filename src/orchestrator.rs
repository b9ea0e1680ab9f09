//! Round-by-round execution of the bitonic network on a bounded pool.
//!
//! For every round the orchestrator:
//!
//! 1. registers each top-level swapper with a fresh [`EventQueue`] and submits it;
//! 2. drains the queue, registering and submitting every child a running swapper
//!    announces, until nothing is buffered or owed;
//! 3. joins every task of the round before moving on.
//!
//! Step 3 is the barrier between rounds: the last leaves of round N may still be
//! running on the pool when the queue runs dry, and round N+1 touches the same
//! elements.
//!
//! A failing task is only reported once every task of its round has been joined.
//! Each submitted task writes off whatever its notifier still owed when it exits, so
//! a crashed producer wakes the coordinator instead of leaving it blocked on the queue.

use std::time::{Duration, Instant};

use log::{debug, error, info, trace};

use crate::config::{SortConfig, DEFAULT_SHUTDOWN_TIMEOUT};
use crate::errors::{CoordinationError, Result, SortError, TaskFailure};
use crate::event_queue::{EventQueue, QueueHandle};
use crate::polarity::SwapDecision;
use crate::sequence::SharedSequence;
use crate::stage_planner::BitonicStagePlanner;
use crate::swapper::RecursiveSwapper;
use crate::worker_pool::{BoundedWorkerPool, TaskHandle};

/// Summary of a completed sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortReport {
    /// Rounds executed (`log2(len)` for the full network).
    pub rounds: usize,
    /// Swapper tasks submitted to the pool across all rounds.
    pub tasks: usize,
}

/// A swapper travelling to a worker together with the queue it reports to.
///
/// Dropping it (normally, on error, or while unwinding from a panic) writes off any
/// children the swapper never announced.
struct Producer<D> {
    swapper: RecursiveSwapper<D>,
    queue: QueueHandle<RecursiveSwapper<D>>,
}

impl<D: SwapDecision + Clone> Producer<D> {
    fn run(&self) -> std::result::Result<(), CoordinationError> {
        self.swapper.execute()
    }
}

impl<D> Drop for Producer<D> {
    fn drop(&mut self) {
        self.queue.forfeit(self.swapper.event_notifier().outstanding());
    }
}

/// Drives a planner's rounds through a [`BoundedWorkerPool`].
pub struct SortOrchestrator<P> {
    pool: BoundedWorkerPool,
    planner: P,
    shutdown_timeout: Duration,
}

impl<P, D> SortOrchestrator<P>
where
    P: Iterator<Item = Vec<RecursiveSwapper<D>>>,
    D: SwapDecision + Clone + Send + 'static,
{
    /// Pair a pool with the rounds it should run.
    pub fn new(pool: BoundedWorkerPool, planner: P) -> Self {
        Self {
            pool,
            planner,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Bound the final pool shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Run every round, then shut the pool down.
    ///
    /// # Errors
    /// - [`SortError::TaskFailed`] if any swapper failed or panicked; reported after
    ///   its whole round has finished.
    /// - [`SortError::Coordination`] / [`SortError::Pool`] for protocol or pool misuse.
    /// - [`SortError::ShutdownTimeout`] if the pool did not wind down in time.
    pub fn run(self) -> Result<SortReport> {
        let Self {
            pool,
            planner,
            shutdown_timeout,
        } = self;
        let started = Instant::now();
        let mut report = SortReport::default();
        info!(
            "starting sort: ~{} rounds on {} workers",
            planner.size_hint().0,
            pool.num_workers()
        );

        for (index, round) in planner.enumerate() {
            let window = round.first().map_or(0, RecursiveSwapper::window_len);
            debug!("round {index}: {} windows of size {window}", round.len());

            let queue = EventQueue::new();
            let mut handles = Vec::with_capacity(round.len());
            let drained = submit_round(&pool, &queue, round, &mut handles);
            report.tasks += handles.len();

            // A task failure explains any coordination error seen while draining.
            await_round(index, handles)?;
            drained?;
            report.rounds += 1;
        }

        pool.shutdown();
        if !pool.await_termination(shutdown_timeout) {
            error!("worker pool did not terminate within {shutdown_timeout:?}");
            return Err(SortError::ShutdownTimeout {
                timeout: shutdown_timeout,
            });
        }

        info!(
            "sort complete: {} rounds, {} tasks in {:.3} ms",
            report.rounds,
            report.tasks,
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(report)
    }
}

/// Submit a round's top-level swappers, then every child they announce.
fn submit_round<D>(
    pool: &BoundedWorkerPool,
    queue: &EventQueue<RecursiveSwapper<D>>,
    round: Vec<RecursiveSwapper<D>>,
    handles: &mut Vec<TaskHandle>,
) -> Result<()>
where
    D: SwapDecision + Clone + Send + 'static,
{
    for swapper in round {
        handles.push(dispatch(pool, queue, swapper)?);
    }
    while queue.has_remaining() {
        let swapper = queue.get()?;
        trace!("dispatching child window [{}, {})", swapper.start(), swapper.stop());
        handles.push(dispatch(pool, queue, swapper)?);
    }
    Ok(())
}

fn dispatch<D>(
    pool: &BoundedWorkerPool,
    queue: &EventQueue<RecursiveSwapper<D>>,
    swapper: RecursiveSwapper<D>,
) -> Result<TaskHandle>
where
    D: SwapDecision + Clone + Send + 'static,
{
    queue.register_notifier(swapper.event_notifier())?;
    let producer = Producer {
        swapper,
        queue: queue.handle(),
    };
    Ok(pool.submit(move || producer.run())?)
}

/// Join every handle, then report the first failure, if any.
fn await_round(round: usize, handles: Vec<TaskHandle>) -> Result<()> {
    let mut first_failure: Option<TaskFailure> = None;
    for handle in handles {
        if let Err(failure) = handle.join() {
            first_failure.get_or_insert(failure);
        }
    }
    match first_failure {
        Some(failure) => {
            error!("round {round} failed: {failure}");
            Err(SortError::TaskFailed { round, failure })
        }
        None => Ok(()),
    }
}

/// Sort `data` in place with the settings in `config`.
///
/// The values are staged in a [`SharedSequence`] that the pooled tasks share, and
/// written back to `data` only once every round has succeeded. That staging copy
/// costs O(n) extra memory; in exchange, on error `data` is left exactly as it was
/// passed in.
///
/// # Errors
/// - [`SortError::InvalidLength`] unless `data.len()` is a power of two.
/// - [`SortError::Pool`] if `config.workers` is zero or the pool cannot start.
/// - Anything [`SortOrchestrator::run`] reports.
///
/// # Example
///
/// ```
/// use bitonic_pool::{sort, Polarity, SortConfig};
///
/// let mut data = vec![4, 2, 1, 3];
/// sort(&mut data, &SortConfig::default()).unwrap();
/// assert_eq!(data, vec![1, 2, 3, 4]);
///
/// sort(&mut data, &SortConfig::default().with_polarity(Polarity::Descending)).unwrap();
/// assert_eq!(data, vec![4, 3, 2, 1]);
/// ```
pub fn sort(data: &mut [i32], config: &SortConfig) -> Result<SortReport> {
    let sequence = SharedSequence::from_slice(data);
    let planner = BitonicStagePlanner::new(sequence.clone(), config.polarity)?;
    let pool = BoundedWorkerPool::new(config.workers)?;

    let report = SortOrchestrator::new(pool, planner)
        .with_shutdown_timeout(config.shutdown_timeout)
        .run()?;
    sequence.copy_to(data);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PoolError;
    use crate::polarity::Polarity;
    use rand::Rng;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn random_data(len: usize) -> Vec<i32> {
        let mut rng = rand::thread_rng();
        (0..len).map(|_| rng.gen()).collect()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[case(8)]
    #[case(20)]
    fn test_sorts_for_any_pool_size(#[case] workers: usize) {
        for polarity in [Polarity::Ascending, Polarity::Descending] {
            for _ in 0..5 {
                let mut data = random_data(512);
                let mut expected = data.clone();
                expected.sort_unstable();
                if polarity == Polarity::Descending {
                    expected.reverse();
                }

                let config = SortConfig::default()
                    .with_workers(workers)
                    .with_polarity(polarity);
                let report = sort(&mut data, &config).unwrap();
                assert!(polarity.is_ordered(&data));
                assert_eq!(data, expected);
                assert_eq!(report.rounds, 9);
            }
        }
    }

    #[test]
    fn test_four_elements() {
        let mut data = vec![4, 2, 1, 3];
        sort(&mut data, &SortConfig::default()).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4]);

        let mut data = vec![4, 2, 1, 3];
        let descending = SortConfig::default().with_polarity(Polarity::Descending);
        sort(&mut data, &descending).unwrap();
        assert_eq!(data, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_single_element_is_noop() {
        let mut data = vec![42];
        let report = sort(&mut data, &SortConfig::default()).unwrap();
        assert_eq!(data, vec![42]);
        assert_eq!(
            report,
            SortReport {
                rounds: 0,
                tasks: 0,
            }
        );
    }

    #[test]
    fn test_invalid_input_left_untouched() {
        let mut data = vec![4, 2, 3];
        assert!(matches!(
            sort(&mut data, &SortConfig::default()),
            Err(SortError::InvalidLength { len: 3 })
        ));
        assert_eq!(data, vec![4, 2, 3]);

        let mut data = vec![2, 1];
        assert!(matches!(
            sort(&mut data, &SortConfig::default().with_workers(0)),
            Err(SortError::Pool(PoolError::ZeroWorkers))
        ));
        assert_eq!(data, vec![2, 1]);
    }

    #[test]
    fn test_task_count_of_network() {
        // Round with window g submits 1 + 2 + .. + g/2 = g - 1 tasks; there are n/g windows.
        let mut data = random_data(16);
        let report = sort(&mut data, &SortConfig::default().with_workers(3)).unwrap();
        let expected: usize = [2usize, 4, 8, 16].iter().map(|g| (16 / g) * (g - 1)).sum();
        assert_eq!(report.tasks, expected);
    }

    /// Counts comparisons and defers to ascending order.
    #[derive(Clone)]
    struct Counting(Arc<AtomicUsize>);

    impl SwapDecision for Counting {
        fn should_swap(&self, left: i32, right: i32) -> bool {
            self.0.fetch_add(1, Ordering::Relaxed);
            Polarity::Ascending.should_swap(left, right)
        }
    }

    #[test]
    fn test_every_comparison_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seq = SharedSequence::from_slice(&[0; 16]);
        let swapper = RecursiveSwapper::whole(seq, Counting(Arc::clone(&counter))).unwrap();
        let round = vec![swapper];

        let pool = BoundedWorkerPool::new(4).unwrap();
        let report = SortOrchestrator::new(pool, std::iter::once(round)).run().unwrap();

        // 4 layers of 8 comparisons; windows of 16, 8 (x2), 4 (x4) and 2 (x8).
        assert_eq!(counter.load(Ordering::Relaxed), 32);
        assert_eq!(
            report,
            SortReport {
                rounds: 1,
                tasks: 15,
            }
        );
    }

    /// Panics as soon as it sees the marker value.
    #[derive(Clone)]
    struct Exploding;

    impl SwapDecision for Exploding {
        fn should_swap(&self, left: i32, right: i32) -> bool {
            assert!(left != -1 && right != -1, "marker reached");
            left > right
        }
    }

    #[test]
    fn test_task_panic_aborts_sort() {
        let seq = SharedSequence::from_slice(&[0, 0, 0, 0, 0, 0, 0, -1]);
        let round = vec![RecursiveSwapper::whole(seq, Exploding).unwrap()];
        let pool = BoundedWorkerPool::new(2).unwrap();

        let err = SortOrchestrator::new(pool, std::iter::once(round)).run().unwrap_err();
        match err {
            SortError::TaskFailed {
                round,
                failure: TaskFailure::Panicked(msg),
            } => {
                assert_eq!(round, 0);
                assert!(msg.contains("marker reached"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failure_in_later_round_reports_round_index() {
        // The marker only meets a comparison once windows reach size 4.
        let seq = SharedSequence::from_slice(&[0, 0, -1, 0]);
        let rounds = vec![
            vec![
                RecursiveSwapper::new(seq.clone(), 0, 1, Exploding).unwrap(),
                RecursiveSwapper::new(seq.clone(), 1, 2, Exploding).unwrap(),
            ],
            vec![RecursiveSwapper::whole(seq, Exploding).unwrap()],
        ];
        let pool = BoundedWorkerPool::new(1).unwrap();
        let err = SortOrchestrator::new(pool, rounds.into_iter()).run().unwrap_err();
        assert!(matches!(err, SortError::TaskFailed { round: 1, .. }));
    }
}
