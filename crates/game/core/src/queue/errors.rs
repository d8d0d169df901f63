//! Error types for the execution pipeline.

use crate::action::ActionError;
use crate::error::{ErrorSeverity, GameError};
use crate::events::EventError;
use crate::types::ActionTypeId;

/// Identifies which lifecycle hook of the head request produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionPhase {
    Start,
    Update,
    Finish,
    End,
}

impl ExecutionPhase {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Errors surfaced while driving the head of an [`ActionQueue`](super::ActionQueue).
///
/// The request that failed stays at the head of the queue.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("`{kind}` failed during {phase}: {source}")]
    Action {
        kind: ActionTypeId,
        phase: ExecutionPhase,
        #[source]
        source: ActionError,
    },

    #[error("events raised by `{kind}` during {phase} could not be delivered: {source}")]
    Dispatch {
        kind: ActionTypeId,
        phase: ExecutionPhase,
        #[source]
        source: EventError,
    },
}

impl ExecuteError {
    pub fn kind(&self) -> &ActionTypeId {
        match self {
            Self::Action { kind, .. } | Self::Dispatch { kind, .. } => kind,
        }
    }

    pub fn phase(&self) -> ExecutionPhase {
        match self {
            Self::Action { phase, .. } | Self::Dispatch { phase, .. } => *phase,
        }
    }

    pub(crate) fn action(
        kind: &ActionTypeId,
        phase: ExecutionPhase,
    ) -> impl FnOnce(ActionError) -> Self + '_ {
        move |source| Self::Action {
            kind: kind.clone(),
            phase,
            source,
        }
    }

    pub(crate) fn dispatch(
        kind: &ActionTypeId,
        phase: ExecutionPhase,
    ) -> impl FnOnce(EventError) -> Self + '_ {
        move |source| Self::Dispatch {
            kind: kind.clone(),
            phase,
            source,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action { source, .. } => source.severity(),
            Self::Dispatch { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action { source, .. } => source.error_code(),
            Self::Dispatch { source, .. } => source.error_code(),
        }
    }
}
