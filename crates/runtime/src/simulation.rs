//! One owned instance of the whole core.
//!
//! A [`Simulation`] bundles the world with the registry, queue, turn manager,
//! event bus and replay log that act on it. Each peer (client or host) owns
//! exactly one; peers stay in step by exchanging validated requests, never
//! by sharing memory.

use game_core::{
    ActionQueue, ActionRegistry, Completed, EventBus, ExecutionRequest, Game, GameConfig,
    ReplayLog, TurnManager, TurnStep,
};

use crate::api::{Result, RuntimeError};
use crate::config::{ReplicationTrust, RuntimeConfig};
use crate::net::{Inbound, InboundMessage, OutboundMessage};

/// What happened during one [`Simulation::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    pub turn: TurnStep,
    pub completed: Option<Completed>,
}

pub struct Simulation<G: Game> {
    world: G::World,
    registry: ActionRegistry<G>,
    queue: ActionQueue,
    turns: TurnManager<G>,
    bus: EventBus<G::Event>,
    replay: ReplayLog,
    game_config: GameConfig,
    trust: ReplicationTrust,
    tick: u64,
}

impl<G: Game> Simulation<G> {
    pub fn new(world: G::World, registry: ActionRegistry<G>) -> Self {
        Self {
            world,
            registry,
            queue: ActionQueue::new(),
            turns: TurnManager::new(),
            bus: EventBus::new(),
            replay: ReplayLog::new(),
            game_config: GameConfig::default(),
            trust: ReplicationTrust::default(),
            tick: 0,
        }
    }

    pub fn with_turns(mut self, turns: TurnManager<G>) -> Self {
        self.turns = turns;
        self
    }

    pub fn with_bus(mut self, bus: EventBus<G::Event>) -> Self {
        self.bus = bus;
        self
    }

    /// Applies the parts of the runtime configuration the simulation uses.
    pub fn configure(&mut self, config: &RuntimeConfig) {
        self.game_config = config.game_config.clone();
        self.trust = config.trust;
    }

    /// Runs one fixed tick: turn logic first, then the head of the queue.
    pub fn step(&mut self) -> Result<StepReport> {
        self.tick += 1;

        let turn = self
            .turns
            .update(&self.world, &self.registry, &mut self.queue)?;
        let completed = self.queue.update(
            &self.registry,
            &mut self.world,
            &mut self.bus,
            self.game_config.tick_delta,
        )?;
        if let Some(done) = &completed {
            self.replay.record(done);
        }

        Ok(StepReport {
            tick: self.tick,
            turn,
            completed,
        })
    }

    /// Applies a message from another peer.
    ///
    /// A rejected request enqueues nothing; for a batch, a single rejected
    /// request rejects the whole batch.
    pub fn handle_inbound(&mut self, message: Inbound<G>) -> Result<()> {
        match message {
            InboundMessage::QueueAction { execution_item } => {
                self.admit(&execution_item)?;
                self.queue.enqueue(execution_item);
            }
            InboundMessage::QueueActionBatch { batch } => {
                for request in &batch {
                    self.admit(request)?;
                }
                for request in batch {
                    self.queue.enqueue(request);
                }
            }
            InboundMessage::GameEvent(event) => {
                self.bus.force(&event)?;
            }
            InboundMessage::InstanceController {
                controller_id,
                controller_setup,
            } => {
                self.turns
                    .create_controller(controller_id, &controller_setup)?;
            }
        }
        Ok(())
    }

    /// Requests submitted locally since the last drain, ready to replicate.
    pub fn drain_outbound(&mut self) -> Vec<OutboundMessage> {
        self.queue
            .drain_outbound()
            .into_iter()
            .map(OutboundMessage::from)
            .collect()
    }

    fn admit(&self, request: &ExecutionRequest) -> Result<()> {
        match self.trust {
            ReplicationTrust::TrustSender => Ok(()),
            ReplicationTrust::Revalidate => {
                self.registry
                    .check_payload(request)
                    .map_err(|error| RuntimeError::RejectedRequest {
                        kind: request.kind().clone(),
                        reason: error.to_string(),
                    })
            }
        }
    }

    pub fn world(&self) -> &G::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut G::World {
        &mut self.world
    }

    pub fn registry(&self) -> &ActionRegistry<G> {
        &self.registry
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn turns(&self) -> &TurnManager<G> {
        &self.turns
    }

    pub fn turns_mut(&mut self) -> &mut TurnManager<G> {
        &mut self.turns
    }

    pub fn bus(&self) -> &EventBus<G::Event> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus<G::Event> {
        &mut self.bus
    }

    pub fn replay(&self) -> &ReplayLog {
        &self.replay
    }

    pub fn game_config(&self) -> &GameConfig {
        &self.game_config
    }

    pub fn trust(&self) -> ReplicationTrust {
        self.trust
    }

    /// Number of ticks stepped so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}
