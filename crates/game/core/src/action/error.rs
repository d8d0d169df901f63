//! Action error types.

use crate::error::{ErrorSeverity, GameError};
use crate::types::ActionTypeId;

/// Errors raised while registering, proposing or running actions.
///
/// Returning `None` from validation is *not* represented here; an illegal
/// proposal is simply not enqueued.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("action type `{kind}` is not registered")]
    UnknownAction { kind: ActionTypeId },

    #[error("action type `{kind}` is already registered")]
    DuplicateAction { kind: ActionTypeId },

    #[error("payload of `{kind}` could not be decoded: {reason}")]
    MalformedPayload { kind: ActionTypeId, reason: String },

    #[error("template of `{kind}` could not be decoded: {reason}")]
    MalformedTemplate { kind: ActionTypeId, reason: String },
}

impl ActionError {
    pub fn kind(&self) -> &ActionTypeId {
        match self {
            Self::UnknownAction { kind }
            | Self::DuplicateAction { kind }
            | Self::MalformedPayload { kind, .. }
            | Self::MalformedTemplate { kind, .. } => kind,
        }
    }

    pub(crate) fn malformed_payload(kind: &ActionTypeId, error: serde_json::Error) -> Self {
        Self::MalformedPayload {
            kind: kind.clone(),
            reason: error.to_string(),
        }
    }

    pub(crate) fn malformed_template(kind: &ActionTypeId, error: serde_json::Error) -> Self {
        Self::MalformedTemplate {
            kind: kind.clone(),
            reason: error.to_string(),
        }
    }
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // A bad template is an illegal proposal from outside.
            Self::MalformedTemplate { .. } => ErrorSeverity::Recoverable,
            Self::DuplicateAction { .. } => ErrorSeverity::Validation,
            Self::UnknownAction { .. } | Self::MalformedPayload { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAction { .. } => "ACTION_UNKNOWN",
            Self::DuplicateAction { .. } => "ACTION_DUPLICATE",
            Self::MalformedPayload { .. } => "ACTION_MALFORMED_PAYLOAD",
            Self::MalformedTemplate { .. } => "ACTION_MALFORMED_TEMPLATE",
        }
    }
}
