//! Fan-in of many [`EventNotifier`]s into one blocking sequence.
//!
//! Every notifier registered with an [`EventQueue`] adds its expected count to the
//! queue's outstanding total. The queue therefore always knows whether more events
//! are still owed, and a single consumer can keep calling [`EventQueue::get`] while
//! [`EventQueue::has_remaining`] is true without ever waiting on an event that
//! cannot arrive.
//!
//! # Accounting
//!
//! ```text
//!   register_notifier(n)   pending += n.expected()
//!   delivery               pending -= 1, buffered += 1   (fails if pending == 0)
//!   get()                  buffered -= 1                 (fails if buffered + pending == 0)
//! ```
//!
//! `get` debits `buffered` before the event has necessarily arrived, so it may go
//! negative while the consumer waits on an owed event.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::errors::CoordinationError;
use crate::event_notifier::EventNotifier;

/// What travels through the buffer.
enum Delivery<T> {
    Event(T),
    /// A producer gave up on events it still owed.
    Forfeited,
}

#[derive(Debug, Default)]
struct Counters {
    pending_expected: usize,
    buffered: i64,
}

struct Shared<T> {
    counters: Mutex<Counters>,
    tx: Sender<Delivery<T>>,
}

impl<T> Shared<T> {
    fn accept(&self, event: T) -> Result<(), CoordinationError> {
        {
            let mut counters = self.counters.lock();
            if counters.pending_expected == 0 {
                return Err(CoordinationError::NoMoreEventsExpected);
            }
            counters.pending_expected -= 1;
            counters.buffered += 1;
        }
        self.tx.send(Delivery::Event(event)).map_err(|_| CoordinationError::Disconnected)
    }

    fn forfeit(&self, count: usize) {
        if count == 0 {
            return;
        }
        {
            let mut counters = self.counters.lock();
            counters.pending_expected = counters.pending_expected.saturating_sub(count);
            counters.buffered += 1;
        }
        // Only fails once the queue (and its receiver) is gone, when nobody is left to wake.
        let _ = self.tx.send(Delivery::Forfeited);
    }
}

/// Aggregates events from dynamically registered notifiers.
pub struct EventQueue<T> {
    shared: Arc<Shared<T>>,
    rx: Receiver<Delivery<T>>,
}

impl<T: Send + 'static> EventQueue<T> {
    /// Create an empty queue with nothing pending.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                counters: Mutex::new(Counters::default()),
                tx,
            }),
            rx,
        }
    }

    /// Subscribe to `notifier` and count its expected events as pending.
    ///
    /// This is the only way events enter the queue. If the notifier already has a
    /// consumer, its expectation is rolled back and the error returned.
    ///
    /// # Errors
    /// Returns [`CoordinationError::OutputAlreadyRegistered`] if `notifier` is already bound.
    pub fn register_notifier(&self, notifier: &EventNotifier<T>) -> Result<(), CoordinationError> {
        let expected = notifier.expected();
        self.shared.counters.lock().pending_expected += expected;

        let shared = Arc::clone(&self.shared);
        if let Err(e) = notifier.register_output(move |event| shared.accept(event)) {
            self.shared.counters.lock().pending_expected -= expected;
            return Err(e);
        }
        Ok(())
    }

    /// True while any registered notifier still owes events or events are buffered.
    ///
    /// Only meaningful to the single consumer deciding whether to call [`get`](Self::get).
    pub fn has_remaining(&self) -> bool {
        let counters = self.shared.counters.lock();
        counters.buffered > 0 || counters.pending_expected > 0
    }

    /// Take the next event, blocking until one arrives if it is still owed.
    ///
    /// # Errors
    /// Returns [`CoordinationError::NoMoreEventsToRead`] if nothing is buffered or owed,
    /// and [`CoordinationError::ProducerFailed`] if the next thing in the buffer is a
    /// producer giving up on events it owed.
    pub fn get(&self) -> Result<T, CoordinationError> {
        {
            let mut counters = self.shared.counters.lock();
            if counters.buffered + counters.pending_expected as i64 <= 0 {
                return Err(CoordinationError::NoMoreEventsToRead);
            }
            counters.buffered -= 1;
        }
        match self.rx.recv() {
            Ok(Delivery::Event(event)) => Ok(event),
            Ok(Delivery::Forfeited) => Err(CoordinationError::ProducerFailed),
            Err(_) => Err(CoordinationError::Disconnected),
        }
    }

    /// Drop `count` owed events from a producer that will never emit them.
    ///
    /// The owed events are replaced by a single marker, so a consumer blocked in
    /// [`get`](Self::get) wakes up with [`CoordinationError::ProducerFailed`]
    /// instead of waiting forever. A `count` of zero is a no-op.
    pub fn forfeit(&self, count: usize) {
        self.shared.forfeit(count);
    }

    /// A handle producers can use to [`forfeit`](QueueHandle::forfeit) from other threads.
    pub fn handle(&self) -> QueueHandle<T> {
        QueueHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Events owed by registered notifiers but not yet delivered.
    pub fn pending_expected(&self) -> usize {
        self.shared.counters.lock().pending_expected
    }

    /// Events delivered but not yet taken (negative while `get` waits on an owed event).
    pub fn buffered(&self) -> i64 {
        self.shared.counters.lock().buffered
    }
}

impl<T: Send + 'static> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer-side handle to an [`EventQueue`].
pub struct QueueHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> QueueHandle<T> {
    /// Same as [`EventQueue::forfeit`].
    pub fn forfeit(&self, count: usize) {
        self.shared.forfeit(count);
    }
}

impl<T> Clone for QueueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}
