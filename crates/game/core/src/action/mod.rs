//! Action domain: the validate/execute contract.
//!
//! # Lifecycle
//!
//! ```text
//! template ──validate──▶ payload ──▶ ExecutionRequest ──▶ ActionQueue
//!                                        on_start (once)
//!                                        on_update (every tick) ─▶ is_finished?
//!                                        on_end (once)
//! ```
//!
//! An [`Action`] is stateless: one instance per action *type*, shared by all
//! requests of that type. All per-invocation state lives in the request's
//! payload, which is produced exactly once by [`Action::validate`]. Any
//! randomness or derivation happens there, so replaying a payload on another
//! peer never re-rolls an outcome.
//!
//! # Module Structure
//!
//! - `error`: [`ActionError`]
//! - `request`: [`ExecutionRequest`] and [`RequestState`]
//! - `registry`: [`ActionRegistry`], the type-erased lookup keyed by
//!   [`ActionTypeId`](crate::ActionTypeId)

mod error;
mod registry;
mod request;

pub use error::ActionError;
pub use registry::ActionRegistry;
pub use request::{ExecutionRequest, RequestState};

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::events::EventQueue;
use crate::game::Game;
use crate::types::{ActionTypeId, ControllerId};

/// Encodes a typed template into the JSON form accepted by
/// [`ActionRegistry::propose`].
pub fn template_value<T: Serialize>(
    kind: &ActionTypeId,
    template: &T,
) -> Result<serde_json::Value, ActionError> {
    serde_json::to_value(template).map_err(|error| ActionError::malformed_template(kind, error))
}

/// Defines how one kind of intent is validated and executed.
///
/// Hooks never fail: a referent that disappeared between proposal and
/// execution (e.g. a dead entity) is a no-op for that hook. The only way to
/// reject an intent is to return `None` from [`validate`](Self::validate).
///
/// # Templates
///
/// Each concrete action provides an inherent `template(..)` constructor
/// building its minimal [`Template`](Self::Template) from plain arguments.
/// It must be pure. Callers pass the result to
/// [`ActionRegistry::propose_template`], or encode it with
/// [`template_value`] for transport.
///
/// ```rust,ignore
/// impl MoveAction {
///     pub fn template(entity: u64, to: i32) -> MoveTemplate {
///         MoveTemplate { entity: EntityId(entity), to }
///     }
/// }
///
/// registry.propose_template(&"move".into(), &world, &MoveAction::template(1, 4), &origin)?;
/// ```
pub trait Action<G: Game>: Send + 'static {
    /// Raw intent sent in by a caller.
    type Template: Serialize + DeserializeOwned;

    /// Fully-resolved, self-contained result of validation.
    type Payload: Serialize + DeserializeOwned;

    /// Checks a proposal against the current world.
    ///
    /// Must be read-only and idempotent: the same world and template always
    /// produce an equivalent payload. Returns `None` if the proposal is
    /// illegal right now.
    fn validate(
        &self,
        world: &G::World,
        template: &Self::Template,
        origin: &ControllerId,
    ) -> Option<Self::Payload>;

    /// Applies begin-of-action effects. Runs exactly once, on the tick the
    /// request becomes running.
    fn on_start(
        &self,
        _world: &mut G::World,
        _payload: &mut Self::Payload,
        _ctx: &mut ActionContext<'_, G::Event>,
    ) {
    }

    /// Advances the action by one fixed tick. Must not decide completion.
    fn on_update(
        &self,
        _world: &mut G::World,
        _payload: &mut Self::Payload,
        _ctx: &mut ActionContext<'_, G::Event>,
    ) {
    }

    /// Pure completion predicate, checked after every `on_update`.
    fn is_finished(
        &self,
        world: &G::World,
        payload: &Self::Payload,
        time_passed: Duration,
    ) -> bool;

    /// Applies terminal effects. Runs exactly once.
    fn on_end(
        &self,
        world: &mut G::World,
        payload: &mut Self::Payload,
        ctx: &mut ActionContext<'_, G::Event>,
    );
}

/// Per-hook view handed to action hooks.
///
/// Events raised here are buffered and delivered to the bus in order once
/// the hook returns.
pub struct ActionContext<'a, E> {
    events: &'a mut EventQueue<E>,
    delta: Duration,
    time_passed: Duration,
}

impl<'a, E> ActionContext<'a, E> {
    pub fn new(events: &'a mut EventQueue<E>, delta: Duration, time_passed: Duration) -> Self {
        Self {
            events,
            delta,
            time_passed,
        }
    }

    /// Length of the current fixed tick.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time accumulated by the request, including the current tick.
    pub fn time_passed(&self) -> Duration {
        self.time_passed
    }

    /// Queues an event that respects the bus mute gate.
    pub fn emit(&mut self, event: E) {
        self.events.emit(event);
    }

    /// Queues an event that is delivered even while the bus is muted.
    pub fn force(&mut self, event: E) {
        self.events.force(event);
    }
}
