//! Controllers: the agents that take turns proposing actions.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::action::{ActionError, ActionRegistry, template_value};
use crate::game::Game;
use crate::queue::ActionQueue;
use crate::types::{ActionTypeId, ControllerId, EntityId};

/// Identity and entity set shared by every controller implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerBase {
    id: ControllerId,
    entities: BTreeSet<EntityId>,
}

impl ControllerBase {
    pub fn new(id: impl Into<ControllerId>) -> Self {
        Self {
            id: id.into(),
            entities: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &ControllerId {
        &self.id
    }

    pub fn entities(&self) -> &BTreeSet<EntityId> {
        &self.entities
    }

    pub fn owns(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Returns `false` if the entity was already owned.
    pub fn add_entity(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    /// Returns `false` if the entity was not owned.
    pub fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity)
    }
}

/// An agent (human input, AI, remote peer) that owns entities and proposes
/// actions for them when it is the current actor.
///
/// Implementations embed a [`ControllerBase`]; factories must build it with
/// the id they are given.
pub trait Controller<G: Game>: Send {
    fn base(&self) -> &ControllerBase;

    fn base_mut(&mut self) -> &mut ControllerBase;

    fn id(&self) -> &ControllerId {
        self.base().id()
    }

    fn entities(&self) -> &BTreeSet<EntityId> {
        self.base().entities()
    }

    /// Whether this controller may still act in the current turn.
    fn has_actions_left(&self, world: &G::World) -> bool;

    /// Called every tick for every controller, before turn gating.
    fn update(&mut self, _world: &G::World) {}

    /// Called when this controller becomes the current actor.
    fn on_turn_start(&mut self, _world: &G::World) {}

    /// Proposes zero or more actions through `ctx`.
    ///
    /// Proposing nothing is allowed; the controller is asked again on the
    /// next tick the queue is idle.
    fn make_choice(&mut self, ctx: &mut ChoiceContext<'_, G>) -> Result<(), ActionError>;
}

/// View handed to the current actor while it chooses.
///
/// Accepted proposals are submitted to the action queue, which also records
/// them for replication.
pub struct ChoiceContext<'a, G: Game> {
    world: &'a G::World,
    registry: &'a ActionRegistry<G>,
    queue: &'a mut ActionQueue,
    origin: ControllerId,
    proposed: usize,
}

impl<'a, G: Game> ChoiceContext<'a, G> {
    pub fn new(
        world: &'a G::World,
        registry: &'a ActionRegistry<G>,
        queue: &'a mut ActionQueue,
        origin: ControllerId,
    ) -> Self {
        Self {
            world,
            registry,
            queue,
            origin,
            proposed: 0,
        }
    }

    pub fn world(&self) -> &G::World {
        self.world
    }

    pub fn registry(&self) -> &ActionRegistry<G> {
        self.registry
    }

    /// The controller on whose behalf proposals are validated.
    pub fn origin(&self) -> &ControllerId {
        &self.origin
    }

    /// Number of proposals accepted so far.
    pub fn proposed(&self) -> usize {
        self.proposed
    }

    /// Validates a typed template and submits the result.
    ///
    /// Returns `Ok(false)` if validation rejected the proposal.
    pub fn propose<T: Serialize>(
        &mut self,
        kind: impl Into<ActionTypeId>,
        template: &T,
    ) -> Result<bool, ActionError> {
        let kind = kind.into();
        let template = template_value(&kind, template)?;
        self.propose_value(kind, &template)
    }

    /// Same as [`propose`](Self::propose) for an already-encoded template.
    pub fn propose_value(
        &mut self,
        kind: impl Into<ActionTypeId>,
        template: &Value,
    ) -> Result<bool, ActionError> {
        let kind = kind.into();
        match self
            .registry
            .propose(&kind, self.world, template, &self.origin)?
        {
            Some(request) => {
                self.queue.submit(request);
                self.proposed += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
