//! Turn rotation among controllers.
//!
//! The [`TurnManager`] owns every controller of one simulation instance and a
//! circular actor order. Each tick it lets every controller observe the
//! world, then, only while the action queue is idle, either hands the turn
//! to the next actor or asks the current actor to choose.
//!
//! ```text
//! update ─▶ controllers.update (sorted by id)
//!        ─▶ queue running?          → Waiting
//!        ─▶ no actor order?         → Idle
//!        ─▶ current out of actions? → Advanced { from, to }
//!        ─▶ otherwise               → Chose { actor, proposed }
//! ```

mod controller;
mod error;

pub use controller::{ChoiceContext, Controller, ControllerBase};
pub use error::TurnError;

use std::collections::BTreeMap;

use crate::action::ActionRegistry;
use crate::factory::FactoryOwner;
use crate::game::Game;
use crate::queue::ActionQueue;
use crate::types::{ControllerId, EntityId, FactoryId};

/// Outcome of one [`TurnManager::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnStep {
    /// The action queue is busy; nobody was asked to act.
    Waiting,
    /// No actor order is configured.
    Idle,
    /// The current actor ran out of actions and the turn moved on.
    Advanced { from: ControllerId, to: ControllerId },
    /// The current actor was asked to choose.
    Chose { actor: ControllerId, proposed: usize },
}

type ControllerFactories<G> =
    FactoryOwner<Box<dyn Controller<G>>, <G as Game>::ControllerSetup>;

pub struct TurnManager<G: Game> {
    controllers: BTreeMap<ControllerId, Box<dyn Controller<G>>>,
    actor_order: Vec<ControllerId>,
    actor_index: usize,
    /// The current actor has not had `on_turn_start` yet.
    turn_pending: bool,
    factories: ControllerFactories<G>,
}

impl<G: Game> TurnManager<G> {
    pub fn new() -> Self {
        Self {
            controllers: BTreeMap::new(),
            actor_order: Vec::new(),
            actor_index: 0,
            turn_pending: false,
            factories: FactoryOwner::new(),
        }
    }

    /// Runs one tick of turn logic.
    ///
    /// At most one advance happens per call, and the actor that receives the
    /// turn is not asked to choose until the next call.
    pub fn update(
        &mut self,
        world: &G::World,
        registry: &ActionRegistry<G>,
        queue: &mut ActionQueue,
    ) -> Result<TurnStep, TurnError> {
        for controller in self.controllers.values_mut() {
            controller.update(world);
        }

        if queue.is_running() {
            return Ok(TurnStep::Waiting);
        }
        let Some(actor) = self.current_actor().cloned() else {
            return Ok(TurnStep::Idle);
        };

        let turn_pending = std::mem::take(&mut self.turn_pending);
        let controller = self.controller_entry(&actor)?;
        if turn_pending {
            controller.on_turn_start(world);
        }

        if !controller.has_actions_left(world) {
            self.actor_index = (self.actor_index + 1) % self.actor_order.len();
            let to = self.actor_order[self.actor_index].clone();
            self.controller_entry(&to)?.on_turn_start(world);
            return Ok(TurnStep::Advanced { from: actor, to });
        }

        let mut ctx = ChoiceContext::new(world, registry, queue, actor.clone());
        controller.make_choice(&mut ctx)?;
        Ok(TurnStep::Chose {
            actor,
            proposed: ctx.proposed(),
        })
    }

    /// Replaces the actor order and restarts it at its first entry.
    ///
    /// Every id must name a registered controller; otherwise the previous
    /// order and index are kept.
    pub fn set_actor_order<I>(&mut self, order: I) -> Result<(), TurnError>
    where
        I: IntoIterator,
        I::Item: Into<ControllerId>,
    {
        let order: Vec<ControllerId> = order.into_iter().map(Into::into).collect();
        if let Some(id) = order.iter().find(|id| !self.controllers.contains_key(*id)) {
            return Err(TurnError::UnknownController { id: id.clone() });
        }

        self.turn_pending = !order.is_empty();
        self.actor_order = order;
        self.actor_index = 0;
        Ok(())
    }

    /// Builds a controller with the selected factory and registers it.
    pub fn create_controller(
        &mut self,
        id: impl Into<ControllerId>,
        setup: &G::ControllerSetup,
    ) -> Result<(), TurnError> {
        let id = id.into();
        if self.controllers.contains_key(&id) {
            return Err(TurnError::DuplicateController { id });
        }
        let controller = self.factories.create(&id, setup)?;
        self.controllers.insert(id, controller);
        Ok(())
    }

    /// Registers an already-built controller under its own id.
    pub fn add_controller(&mut self, controller: Box<dyn Controller<G>>) -> Result<(), TurnError> {
        let id = controller.id().clone();
        if self.controllers.contains_key(&id) {
            return Err(TurnError::DuplicateController { id });
        }
        self.controllers.insert(id, controller);
        Ok(())
    }

    /// Removes a controller and drops it from the actor order.
    ///
    /// If it was the current actor, the turn passes to the actor that
    /// followed it.
    pub fn destroy_controller(
        &mut self,
        id: &ControllerId,
    ) -> Result<Box<dyn Controller<G>>, TurnError> {
        let controller = self
            .controllers
            .remove(id)
            .ok_or_else(|| TurnError::UnknownController { id: id.clone() })?;

        let mut index = 0;
        while index < self.actor_order.len() {
            if &self.actor_order[index] != id {
                index += 1;
                continue;
            }
            self.actor_order.remove(index);
            if index < self.actor_index {
                self.actor_index -= 1;
            } else if index == self.actor_index {
                self.turn_pending = true;
            }
        }

        if self.actor_order.is_empty() {
            self.actor_index = 0;
            self.turn_pending = false;
        } else if self.actor_index >= self.actor_order.len() {
            self.actor_index = 0;
        }
        Ok(controller)
    }

    pub fn register_factory<F>(
        &mut self,
        id: impl Into<FactoryId>,
        factory: F,
    ) -> Result<(), TurnError>
    where
        F: Fn(&ControllerId, &G::ControllerSetup) -> Box<dyn Controller<G>> + Send + 'static,
    {
        Ok(self.factories.register(id, factory)?)
    }

    pub fn select_factory(&mut self, id: impl Into<FactoryId>) -> Result<(), TurnError> {
        Ok(self.factories.select(id)?)
    }

    pub fn factories(&self) -> &ControllerFactories<G> {
        &self.factories
    }

    /// Gives `entity` to `controller`, taking it from any previous owner.
    ///
    /// Returns the previous owner, if it was another controller.
    pub fn assign_entity(
        &mut self,
        controller: &ControllerId,
        entity: EntityId,
    ) -> Result<Option<ControllerId>, TurnError> {
        if !self.controllers.contains_key(controller) {
            return Err(TurnError::UnknownController {
                id: controller.clone(),
            });
        }
        let previous = self.release_entity(entity);
        self.controller_entry(controller)?
            .base_mut()
            .add_entity(entity);
        Ok(previous.filter(|owner| owner != controller))
    }

    /// Removes `entity` from its owner, if any, and returns that owner.
    pub fn release_entity(&mut self, entity: EntityId) -> Option<ControllerId> {
        self.controllers
            .values_mut()
            .find(|controller| controller.base().owns(entity))
            .map(|controller| {
                controller.base_mut().remove_entity(entity);
                controller.id().clone()
            })
    }

    pub fn owner_of(&self, entity: EntityId) -> Option<&ControllerId> {
        self.controllers
            .iter()
            .find(|(_, controller)| controller.base().owns(entity))
            .map(|(id, _)| id)
    }

    pub fn current_actor(&self) -> Option<&ControllerId> {
        self.actor_order.get(self.actor_index)
    }

    pub fn actor_order(&self) -> &[ControllerId] {
        &self.actor_order
    }

    pub fn actor_index(&self) -> usize {
        self.actor_index
    }

    pub fn controller(&self, id: &ControllerId) -> Option<&dyn Controller<G>> {
        self.controllers.get(id).map(|controller| controller.as_ref())
    }

    pub fn controller_mut(
        &mut self,
        id: &ControllerId,
    ) -> Option<&mut (dyn Controller<G> + 'static)> {
        self.controllers
            .get_mut(id)
            .map(|controller| controller.as_mut())
    }

    /// Registered controller ids, sorted.
    pub fn controller_ids(&self) -> impl Iterator<Item = &ControllerId> {
        self.controllers.keys()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    fn controller_entry(
        &mut self,
        id: &ControllerId,
    ) -> Result<&mut Box<dyn Controller<G>>, TurnError> {
        self.controllers
            .get_mut(id)
            .ok_or_else(|| TurnError::UnknownController { id: id.clone() })
    }
}

impl<G: Game> Default for TurnManager<G> {
    fn default() -> Self {
        Self::new()
    }
}
