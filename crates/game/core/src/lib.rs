//! Deterministic action-execution core shared by every simulation peer.
//!
//! `game-core` turns a proposed intent into a validated, time-boxed,
//! replayable mutation of game state. The pieces, leaves first:
//!
//! - [`events`]: owned publish/subscribe bus with mute and forced delivery
//! - [`action`]: the [`Action`] contract, its registry, and [`ExecutionRequest`]
//! - [`queue`]: FIFO [`ActionQueue`] that drives one request at a time
//! - [`turn`]: [`TurnManager`] rotating control among [`Controller`]s
//! - [`factory`]: [`FactoryOwner`] used to construct controllers by id
//!
//! Everything is parameterised by a [`Game`] type family, so concrete worlds,
//! events and rules live outside this crate.
pub mod action;
pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod game;
pub mod queue;
pub mod replay;
pub mod turn;
pub mod types;

pub use action::{
    Action, ActionContext, ActionError, ActionRegistry, ExecutionRequest, RequestState,
    template_value,
};
pub use config::GameConfig;
pub use error::{ErrorSeverity, GameError};
pub use events::{Event, EventBus, EventError, EventQueue, HandlerResponse};
pub use factory::{FactoryError, FactoryOwner};
pub use game::Game;
pub use queue::{ActionQueue, Completed, ExecuteError, ExecutionPhase};
pub use replay::{ReplayEntry, ReplayLog, RequestDigest};
pub use turn::{ChoiceContext, Controller, ControllerBase, TurnError, TurnManager, TurnStep};
pub use types::{ActionTypeId, ControllerId, EntityId, FactoryId};
