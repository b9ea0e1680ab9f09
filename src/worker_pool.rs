//! Fixed-size worker pool with blocking admission.
//!
//! [`BoundedWorkerPool`] runs tasks on a `rayon` thread pool, but only after taking
//! a permit from a counting gate sized to the number of workers. When every worker
//! is busy, [`submit`](BoundedWorkerPool::submit) blocks the caller until one frees
//! up. The in-flight task count can therefore never exceed the worker count,
//! however fast the caller submits.
//!
//! ```text
//! submit ──► acquire permit ──► rayon worker ──► task ──► release permit ──► TaskHandle
//!            (blocks at N)                                (exactly once)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use log::{trace, warn};
use parking_lot::{Condvar, Mutex};

use crate::errors::{PoolError, TaskFailure};

/// Counting semaphore over free worker slots.
struct AdmissionGate {
    capacity: usize,
    free: Mutex<usize>,
    changed: Condvar,
    shut_down: AtomicBool,
}

impl AdmissionGate {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: Mutex::new(capacity),
            changed: Condvar::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Take a slot, or fail once the gate is shut down, even while waiting.
    fn acquire(&self) -> Result<(), PoolError> {
        let mut free = self.free.lock();
        loop {
            if self.is_shut_down() {
                return Err(PoolError::ShutDown);
            }
            if *free > 0 {
                *free -= 1;
                return Ok(());
            }
            self.changed.wait(&mut free);
        }
    }

    fn release(&self) {
        let mut free = self.free.lock();
        *free += 1;
        self.changed.notify_all();
    }

    fn in_flight(&self) -> usize {
        self.capacity - *self.free.lock()
    }

    fn shut_down(&self) {
        // Take the lock so a waiter in `wait_idle` cannot miss the wake-up.
        let _free = self.free.lock();
        self.shut_down.store(true, Ordering::Release);
        self.changed.notify_all();
    }

    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Wait until shut down with every permit returned, or until `timeout` passes.
    fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut free = self.free.lock();
        while !(self.is_shut_down() && *free == self.capacity) {
            if self.changed.wait_until(&mut free, deadline).timed_out() {
                return self.is_shut_down() && *free == self.capacity;
            }
        }
        true
    }
}

/// Returns the permit when dropped, so it comes back even if the task panics.
struct Permit {
    gate: Arc<AdmissionGate>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// Completion handle for a submitted task.
#[derive(Debug)]
pub struct TaskHandle {
    outcome: Receiver<Result<(), TaskFailure>>,
}

impl TaskHandle {
    /// Block until the task has finished and report how it went.
    ///
    /// # Errors
    /// Returns the task's [`TaskFailure`]; [`TaskFailure::Lost`] if the task was
    /// dropped without running.
    pub fn join(self) -> Result<(), TaskFailure> {
        self.outcome.recv().unwrap_or(Err(TaskFailure::Lost))
    }
}

/// A worker pool whose `submit` blocks while all workers are busy.
pub struct BoundedWorkerPool {
    pool: rayon::ThreadPool,
    gate: Arc<AdmissionGate>,
}

impl BoundedWorkerPool {
    /// Create a pool with `num_workers` threads.
    ///
    /// # Errors
    /// Returns [`PoolError::ZeroWorkers`] for zero workers and [`PoolError::Build`] if
    /// the threads cannot be started.
    pub fn new(num_workers: usize) -> Result<Self, PoolError> {
        if num_workers == 0 {
            return Err(PoolError::ZeroWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("bitonic-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            gate: Arc::new(AdmissionGate::new(num_workers)),
        })
    }

    /// Number of worker threads (and admission permits).
    pub fn num_workers(&self) -> usize {
        self.gate.capacity
    }

    /// Tasks admitted and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.gate.in_flight()
    }

    /// True once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.gate.is_shut_down()
    }

    /// Run `task` on a worker, blocking first until a worker is free.
    ///
    /// The task's error or panic is captured and reported through the returned
    /// [`TaskHandle`]; it never takes the worker thread down.
    ///
    /// # Errors
    /// Returns [`PoolError::ShutDown`] after [`shutdown`](Self::shutdown), including
    /// for a caller that was still waiting for a free worker when it was called.
    pub fn submit<F, E>(&self, task: F) -> Result<TaskHandle, PoolError>
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: std::fmt::Display,
    {
        self.gate.acquire()?;
        let permit = Permit {
            gate: Arc::clone(&self.gate),
        };
        let (tx, rx) = bounded(1);

        self.pool.spawn(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(TaskFailure::Failed(e.to_string())),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!("pooled task panicked: {message}");
                    Err(TaskFailure::Panicked(message))
                }
            };
            // Free the slot before reporting, so a joined task is never still counted.
            drop(permit);
            let _ = tx.send(outcome);
        });
        trace!("admitted task ({} in flight)", self.in_flight());
        Ok(TaskHandle { outcome: rx })
    }

    /// Stop admitting tasks. Tasks already admitted keep running.
    pub fn shutdown(&self) {
        self.gate.shut_down();
    }

    /// Wait for every admitted task to finish after [`shutdown`](Self::shutdown).
    ///
    /// Returns `false` if that did not happen within `timeout` (including when the
    /// pool was never shut down).
    pub fn await_termination(&self, timeout: Duration) -> bool {
        self.gate.wait_idle(timeout)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
