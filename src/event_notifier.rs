//! Single-use, exact-count event source.
//!
//! An [`EventNotifier`] is created knowing how many events it will emit over its
//! lifetime. Exactly one consumer may subscribe, and every signal is delivered to
//! that consumer synchronously. Signalling with no subscriber, or more often than
//! declared, is a protocol error.

use parking_lot::Mutex;

use crate::errors::CoordinationError;

/// Callback that receives a notifier's events.
pub type EventConsumer<T> = Box<dyn Fn(T) -> Result<(), CoordinationError> + Send + Sync>;

struct NotifierState<T> {
    received: usize,
    consumer: Option<EventConsumer<T>>,
}

/// Emits exactly `expected` events to a single registered consumer.
pub struct EventNotifier<T> {
    expected: usize,
    state: Mutex<NotifierState<T>>,
}

impl<T> EventNotifier<T> {
    /// Create a notifier that will emit `expected` events.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(NotifierState {
                received: 0,
                consumer: None,
            }),
        }
    }

    /// Create a notifier from a signed count, rejecting negative values.
    ///
    /// # Errors
    /// Returns [`CoordinationError::NegativeExpected`] if `expected < 0`.
    pub fn try_new(expected: i64) -> Result<Self, CoordinationError> {
        let expected = usize::try_from(expected)
            .map_err(|_| CoordinationError::NegativeExpected { expected })?;
        Ok(Self::new(expected))
    }

    /// Total number of events this notifier will emit.
    #[inline]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of events delivered so far.
    pub fn received(&self) -> usize {
        self.state.lock().received
    }

    /// Number of events still owed to the consumer.
    pub fn outstanding(&self) -> usize {
        self.expected - self.received()
    }

    /// Bind the single consumer of this notifier.
    ///
    /// # Errors
    /// Returns [`CoordinationError::OutputAlreadyRegistered`] if a consumer is already bound.
    pub fn register_output<F>(&self, consumer: F) -> Result<(), CoordinationError>
    where
        F: Fn(T) -> Result<(), CoordinationError> + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        if state.consumer.is_some() {
            return Err(CoordinationError::OutputAlreadyRegistered);
        }
        state.consumer = Some(Box::new(consumer));
        Ok(())
    }

    /// Deliver `event` to the registered consumer.
    ///
    /// The exhaustion check, the delivery and the count update happen under one
    /// lock, so concurrent signallers can never over-deliver. If the consumer
    /// rejects the event the count is left unchanged.
    ///
    /// # Errors
    /// Returns [`CoordinationError::OutputNotRegistered`] with no consumer bound,
    /// [`CoordinationError::NotifierExhausted`] once `expected` events were delivered,
    /// or whatever error the consumer itself returns.
    pub fn signal(&self, event: T) -> Result<(), CoordinationError> {
        let mut state = self.state.lock();
        let Some(consumer) = state.consumer.as_ref() else {
            return Err(CoordinationError::OutputNotRegistered);
        };
        if state.received >= self.expected {
            return Err(CoordinationError::NotifierExhausted {
                expected: self.expected,
            });
        }
        consumer(event)?;
        state.received += 1;
        Ok(())
    }
}

impl<T> std::fmt::Debug for EventNotifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventNotifier")
            .field("expected", &self.expected)
            .field("received", &state.received)
            .field("registered", &state.consumer.is_some())
            .finish()
    }
}
