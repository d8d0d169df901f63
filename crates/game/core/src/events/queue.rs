use super::{Event, EventBus, EventError};

/// How a queued event must be delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Respect the bus mute gate.
    Emit,
    /// Deliver even while the bus is muted.
    Force,
}

/// Ordered buffer of events raised while an action hook runs.
///
/// Hooks hold `&mut World`, so they cannot reach the bus directly; the
/// action queue flushes this buffer right after each hook returns.
#[derive(Debug)]
pub struct EventQueue<E> {
    pending: Vec<(E, Delivery)>,
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: E) {
        self.pending.push((event, Delivery::Emit));
    }

    pub fn force(&mut self, event: E) {
        self.pending.push((event, Delivery::Force));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(E, Delivery)> {
        self.pending.iter()
    }
}

impl<E: Event> EventQueue<E> {
    /// Delivers every pending event in the order it was raised.
    ///
    /// All events are attempted even if one fails; the first error is
    /// returned. Returns the total number of handler invocations.
    pub fn flush(&mut self, bus: &mut EventBus<E>) -> Result<usize, EventError> {
        let mut invoked = 0;
        let mut first_error = None;

        for (event, delivery) in self.pending.drain(..) {
            let result = match delivery {
                Delivery::Emit => bus.emit(&event),
                Delivery::Force => bus.force(&event),
            };
            match result {
                Ok(count) => invoked += count,
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(invoked),
        }
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
