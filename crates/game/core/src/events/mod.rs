//! Topic-based event dispatch.
//!
//! Action effects say *what happened* by emitting events; reactions (rewards,
//! death handling, mission progress, UI refresh) subscribe to topics and are
//! added without touching action code.
//!
//! - [`EventBus`]: per-instance registry of handlers keyed by topic
//! - [`EventQueue`]: ordered buffer of events raised inside action hooks,
//!   flushed to the bus once the hook returns

mod bus;
mod queue;

use std::fmt;
use std::hash::Hash;

pub use bus::{EventBus, Handler, HandlerResponse};
pub use queue::{Delivery, EventQueue};

use crate::error::{ErrorSeverity, GameError};

/// An event routed by topic.
pub trait Event {
    type Topic: Copy + Eq + Hash + fmt::Debug + Send + 'static;

    fn topic(&self) -> Self::Topic;
}

/// Errors raised by event dispatch.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// Handlers were attached, or an event was sent, on a topic that was
    /// never registered.
    #[error("event topic {topic} was never registered")]
    UnregisteredTopic { topic: String },
}

impl EventError {
    pub(crate) fn unregistered<T: fmt::Debug>(topic: T) -> Self {
        Self::UnregisteredTopic {
            topic: format!("{topic:?}"),
        }
    }
}

impl GameError for EventError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnregisteredTopic { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnregisteredTopic { .. } => "EVENT_UNREGISTERED_TOPIC",
        }
    }
}
