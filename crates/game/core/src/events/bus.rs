//! Topic-based event bus implementation.

use std::collections::HashMap;

use super::{Event, EventError};

/// What a handler wants to happen to itself after an invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Stay attached.
    #[default]
    Keep,
    /// Detach once the current dispatch pass is complete.
    Remove,
}

/// Boxed event handler.
pub type Handler<E> = Box<dyn FnMut(&E) -> HandlerResponse + Send>;

/// Topic-based event bus owned by one simulation instance.
///
/// Each topic must be [`register`](Self::register)ed before handlers can
/// attach. Handlers have no unsubscribe token: a handler detaches itself by
/// returning [`HandlerResponse::Remove`]. Removal is two-phase: every handler
/// attached when the pass starts is invoked exactly once, and detached
/// handlers are compacted out only after the pass completes.
///
/// The mute gate suppresses [`emit`](Self::emit) but never
/// [`force`](Self::force), which is reserved for events whose delivery is
/// needed to keep peers in step.
pub struct EventBus<E: Event> {
    channels: HashMap<E::Topic, Vec<Handler<E>>>,
    muted: bool,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            muted: false,
        }
    }

    /// Registers a topic. Returns `false` if it was already registered.
    pub fn register(&mut self, topic: E::Topic) -> bool {
        if self.channels.contains_key(&topic) {
            return false;
        }
        self.channels.insert(topic, Vec::new());
        true
    }

    pub fn is_registered(&self, topic: E::Topic) -> bool {
        self.channels.contains_key(&topic)
    }

    /// Attaches a handler to a registered topic.
    pub fn on<F>(&mut self, topic: E::Topic, handler: F) -> Result<(), EventError>
    where
        F: FnMut(&E) -> HandlerResponse + Send + 'static,
    {
        self.channel_mut(topic)?.push(Box::new(handler));
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Dispatches an event unless the bus is muted.
    ///
    /// Returns the number of handlers invoked (zero while muted).
    pub fn emit(&mut self, event: &E) -> Result<usize, EventError> {
        let muted = self.muted;
        let handlers = self.channel_mut(event.topic())?;
        if muted {
            return Ok(0);
        }
        Ok(dispatch(handlers, event))
    }

    /// Dispatches an event regardless of the mute gate.
    pub fn force(&mut self, event: &E) -> Result<usize, EventError> {
        let handlers = self.channel_mut(event.topic())?;
        Ok(dispatch(handlers, event))
    }

    /// Number of handlers currently attached to a topic.
    pub fn handler_count(&self, topic: E::Topic) -> usize {
        self.channels.get(&topic).map_or(0, Vec::len)
    }

    fn channel_mut(&mut self, topic: E::Topic) -> Result<&mut Vec<Handler<E>>, EventError> {
        self.channels
            .get_mut(&topic)
            .ok_or_else(|| EventError::unregistered(topic))
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Invokes every handler in registration order, then drops the ones that
/// asked to be removed.
fn dispatch<E>(handlers: &mut Vec<Handler<E>>, event: &E) -> usize {
    let responses: Vec<HandlerResponse> =
        handlers.iter_mut().map(|handler| handler(event)).collect();
    let invoked = responses.len();

    if responses.contains(&HandlerResponse::Remove) {
        let mut responses = responses.into_iter();
        handlers.retain(|_| responses.next() != Some(HandlerResponse::Remove));
    }

    invoked
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestEvent {
        Ping(u32),
        Pong,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestTopic {
        Ping,
        Pong,
    }

    impl Event for TestEvent {
        type Topic = TestTopic;

        fn topic(&self) -> TestTopic {
            match self {
                TestEvent::Ping(_) => TestTopic::Ping,
                TestEvent::Pong => TestTopic::Pong,
            }
        }
    }

    fn recorder(
        journal: &Arc<Mutex<Vec<String>>>,
        name: &'static str,
        response: HandlerResponse,
    ) -> impl FnMut(&TestEvent) -> HandlerResponse + Send + 'static {
        let journal = Arc::clone(journal);
        move |event| {
            journal.lock().unwrap().push(format!("{name}:{event:?}"));
            response
        }
    }

    #[test]
    fn muted_emit_invokes_nothing_but_force_delivers() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(TestTopic::Ping);
        bus.on(TestTopic::Ping, recorder(&journal, "a", HandlerResponse::Keep))
            .unwrap();

        bus.set_muted(true);
        assert_eq!(bus.emit(&TestEvent::Ping(1)).unwrap(), 0);
        assert!(journal.lock().unwrap().is_empty());

        assert_eq!(bus.force(&TestEvent::Ping(2)).unwrap(), 1);
        assert_eq!(*journal.lock().unwrap(), vec!["a:Ping(2)"]);

        bus.set_muted(false);
        assert_eq!(bus.emit(&TestEvent::Ping(3)).unwrap(), 1);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(TestTopic::Ping);
        for name in ["first", "second", "third"] {
            bus.on(TestTopic::Ping, recorder(&journal, name, HandlerResponse::Keep))
                .unwrap();
        }

        bus.emit(&TestEvent::Ping(0)).unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["first:Ping(0)", "second:Ping(0)", "third:Ping(0)"]
        );
    }

    #[test]
    fn removed_handler_runs_once_then_detaches_without_skipping_neighbours() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(TestTopic::Ping);
        bus.on(TestTopic::Ping, recorder(&journal, "a", HandlerResponse::Keep))
            .unwrap();
        bus.on(TestTopic::Ping, recorder(&journal, "once", HandlerResponse::Remove))
            .unwrap();
        bus.on(TestTopic::Ping, recorder(&journal, "also-once", HandlerResponse::Remove))
            .unwrap();
        bus.on(TestTopic::Ping, recorder(&journal, "b", HandlerResponse::Keep))
            .unwrap();

        assert_eq!(bus.emit(&TestEvent::Ping(1)).unwrap(), 4);
        assert_eq!(bus.handler_count(TestTopic::Ping), 2);

        assert_eq!(bus.emit(&TestEvent::Ping(2)).unwrap(), 2);
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "a:Ping(1)",
                "once:Ping(1)",
                "also-once:Ping(1)",
                "b:Ping(1)",
                "a:Ping(2)",
                "b:Ping(2)",
            ]
        );
    }

    #[test]
    fn unregistered_topics_are_configuration_faults() {
        let mut bus: EventBus<TestEvent> = EventBus::new();
        bus.register(TestTopic::Ping);

        let err = bus
            .on(TestTopic::Pong, |_| HandlerResponse::Keep)
            .unwrap_err();
        assert!(matches!(err, EventError::UnregisteredTopic { .. }));

        bus.set_muted(true);
        assert!(bus.emit(&TestEvent::Pong).is_err());
        assert!(bus.force(&TestEvent::Pong).is_err());
    }

    #[test]
    fn register_is_idempotent() {
        let mut bus: EventBus<TestEvent> = EventBus::new();
        assert!(bus.register(TestTopic::Pong));
        bus.on(TestTopic::Pong, |_| HandlerResponse::Keep).unwrap();
        assert!(!bus.register(TestTopic::Pong));
        assert_eq!(bus.handler_count(TestTopic::Pong), 1);
    }
}
