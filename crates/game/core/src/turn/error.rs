use crate::action::ActionError;
use crate::error::{ErrorSeverity, GameError};
use crate::factory::FactoryError;
use crate::types::ControllerId;

/// Errors raised by the turn manager.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("controller `{id}` is not registered")]
    UnknownController { id: ControllerId },

    #[error("controller `{id}` already exists")]
    DuplicateController { id: ControllerId },

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownController { .. } | Self::DuplicateController { .. } => {
                ErrorSeverity::Validation
            }
            Self::Factory(error) => error.severity(),
            Self::Action(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownController { .. } => "TURN_UNKNOWN_CONTROLLER",
            Self::DuplicateController { .. } => "TURN_DUPLICATE_CONTROLLER",
            Self::Factory(error) => error.error_code(),
            Self::Action(error) => error.error_code(),
        }
    }
}
