//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the core, inbound admission, and worker coordination
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{
    ActionError, ActionTypeId, ErrorSeverity, EventError, ExecuteError, GameError, TurnError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("inbound `{kind}` request rejected: {reason}")]
    RejectedRequest { kind: ActionTypeId, reason: String },

    #[error("simulation halted: {reason}")]
    Halted { reason: String },

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a simulation before building")]
    MissingSimulation,
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(error) => error.severity(),
            Self::Execute(error) => error.severity(),
            Self::Turn(error) => error.severity(),
            Self::Event(error) => error.severity(),
            Self::RejectedRequest { .. } => ErrorSeverity::Validation,
            Self::Halted { .. } | Self::MissingSimulation => ErrorSeverity::Fatal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action(error) => error.error_code(),
            Self::Execute(error) => error.error_code(),
            Self::Turn(error) => error.error_code(),
            Self::Event(error) => error.error_code(),
            Self::RejectedRequest { .. } => "RUNTIME_REJECTED_REQUEST",
            Self::Halted { .. } => "RUNTIME_HALTED",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingSimulation => "RUNTIME_MISSING_SIMULATION",
        }
    }
}
