//! Common error infrastructure for game-core.
//!
//! Domain errors (`ActionError`, `TurnError`, `EventError`, ...) live next to
//! the module that raises them. This module provides the shared
//! classification used by callers to decide between "report and carry on"
//! and "halt before peers diverge".
//!
//! Rejecting an illegal proposal is not an error at all: validation returns
//! `None` and the proposal is dropped.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the offending input is dropped, nothing else changes
/// - **Validation**: an identity or transition was refused at the boundary
/// - **Internal**: unexpected state inconsistency inside one peer
/// - **Fatal**: configuration fault; continuing risks divergence between peers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Malformed or stale input that can simply be ignored.
    ///
    /// Examples: undecodable template sent by a client.
    Recoverable,

    /// Invalid identity or request refused at the boundary.
    ///
    /// Examples: duplicate controller id, unknown controller in actor order
    Validation,

    /// Unexpected state inconsistency.
    Internal,

    /// Configuration fault: an action type, factory or event topic was
    /// referenced but never registered.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    /// Returns true if execution must stop.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by what the caller must do, not by impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and assertions in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
