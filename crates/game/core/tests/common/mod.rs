//! Toy arena game shared by the integration tests.
//!
//! - "move": timed action, 100ms per cell travelled
//! - "wait": instant action
//! - `Scripted` controllers replay a fixed list of proposals
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use game_core::{
    Action, ActionContext, ActionRegistry, ChoiceContext, Controller, ControllerBase,
    ControllerId, EntityId, Event, EventBus, Game, HandlerResponse, TurnManager,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const TICK: Duration = Duration::from_millis(50);
pub const STEP_TIME: Duration = Duration::from_millis(100);

pub struct Arena;

#[derive(Debug, Default)]
pub struct World {
    pub positions: BTreeMap<EntityId, i32>,
    pub log: Vec<String>,
}

impl World {
    pub fn with_entities(entities: &[(u64, i32)]) -> Self {
        Self {
            positions: entities
                .iter()
                .map(|(id, position)| (EntityId(*id), *position))
                .collect(),
            log: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ArenaEvent {
    Announced { text: String },
    Moved { entity: EntityId, to: i32 },
    Waited { entity: EntityId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArenaTopic {
    Announced,
    Moved,
    Waited,
}

impl Event for ArenaEvent {
    type Topic = ArenaTopic;

    fn topic(&self) -> ArenaTopic {
        match self {
            Self::Announced { .. } => ArenaTopic::Announced,
            Self::Moved { .. } => ArenaTopic::Moved,
            Self::Waited { .. } => ArenaTopic::Waited,
        }
    }
}

/// Setup payload for scripted controllers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SeatSetup {
    pub per_turn: u32,
    pub script: Vec<Planned>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Planned {
    pub kind: String,
    pub template: Value,
}

impl Game for Arena {
    type World = World;
    type Event = ArenaEvent;
    type ControllerSetup = SeatSetup;
}

// ---------------------------------------------------------------------------
// actions
// ---------------------------------------------------------------------------

pub struct MoveAction;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveTemplate {
    pub entity: EntityId,
    pub to: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovePayload {
    pub entity: EntityId,
    pub from: i32,
    pub to: i32,
    pub ticks: u32,
}

impl MoveAction {
    pub fn template(entity: u64, to: i32) -> MoveTemplate {
        MoveTemplate {
            entity: EntityId(entity),
            to,
        }
    }
}

impl Action<Arena> for MoveAction {
    type Template = MoveTemplate;
    type Payload = MovePayload;

    fn validate(
        &self,
        world: &World,
        template: &MoveTemplate,
        _origin: &ControllerId,
    ) -> Option<MovePayload> {
        let from = *world.positions.get(&template.entity)?;
        (from != template.to).then_some(MovePayload {
            entity: template.entity,
            from,
            to: template.to,
            ticks: 0,
        })
    }

    fn on_start(
        &self,
        world: &mut World,
        payload: &mut MovePayload,
        _ctx: &mut ActionContext<'_, ArenaEvent>,
    ) {
        world.log.push(format!("start move {}", payload.entity));
    }

    fn on_update(
        &self,
        _world: &mut World,
        payload: &mut MovePayload,
        _ctx: &mut ActionContext<'_, ArenaEvent>,
    ) {
        payload.ticks += 1;
    }

    fn is_finished(&self, _world: &World, payload: &MovePayload, time_passed: Duration) -> bool {
        let cells = payload.from.abs_diff(payload.to);
        time_passed >= STEP_TIME * cells
    }

    fn on_end(
        &self,
        world: &mut World,
        payload: &mut MovePayload,
        ctx: &mut ActionContext<'_, ArenaEvent>,
    ) {
        let Some(position) = world.positions.get_mut(&payload.entity) else {
            return;
        };
        *position = payload.to;
        world
            .log
            .push(format!("end move {} after {} ticks", payload.entity, payload.ticks));
        ctx.emit(ArenaEvent::Moved {
            entity: payload.entity,
            to: payload.to,
        });
    }
}

pub struct WaitAction;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaitTemplate {
    pub entity: EntityId,
}

impl WaitAction {
    pub fn template(entity: u64) -> WaitTemplate {
        WaitTemplate {
            entity: EntityId(entity),
        }
    }
}

impl Action<Arena> for WaitAction {
    type Template = WaitTemplate;
    type Payload = WaitTemplate;

    fn validate(
        &self,
        world: &World,
        template: &WaitTemplate,
        _origin: &ControllerId,
    ) -> Option<WaitTemplate> {
        world
            .positions
            .contains_key(&template.entity)
            .then(|| template.clone())
    }

    fn on_start(
        &self,
        world: &mut World,
        payload: &mut WaitTemplate,
        ctx: &mut ActionContext<'_, ArenaEvent>,
    ) {
        world.log.push(format!("start wait {}", payload.entity));
        ctx.force(ArenaEvent::Announced {
            text: format!("{} waits", payload.entity),
        });
    }

    fn is_finished(&self, _world: &World, _payload: &WaitTemplate, _time_passed: Duration) -> bool {
        true
    }

    fn on_end(
        &self,
        world: &mut World,
        payload: &mut WaitTemplate,
        ctx: &mut ActionContext<'_, ArenaEvent>,
    ) {
        world.log.push(format!("end wait {}", payload.entity));
        ctx.emit(ArenaEvent::Waited {
            entity: payload.entity,
        });
    }
}

pub fn registry() -> ActionRegistry<Arena> {
    ActionRegistry::new()
        .with("move", MoveAction)
        .and_then(|registry| registry.with("wait", WaitAction))
        .expect("arena actions register once")
}

pub fn bus() -> EventBus<ArenaEvent> {
    let mut bus = EventBus::new();
    for topic in [ArenaTopic::Announced, ArenaTopic::Moved, ArenaTopic::Waited] {
        bus.register(topic);
    }
    bus
}

/// Attaches a handler to every topic that records what it sees.
pub fn record_events(bus: &mut EventBus<ArenaEvent>) -> Arc<Mutex<Vec<ArenaEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for topic in [ArenaTopic::Announced, ArenaTopic::Moved, ArenaTopic::Waited] {
        let sink = Arc::clone(&seen);
        bus.on(topic, move |event: &ArenaEvent| {
            sink.lock().unwrap().push(event.clone());
            HandlerResponse::Keep
        })
        .expect("topic registered");
    }
    seen
}

pub fn planned_move(entity: u64, to: i32) -> Planned {
    Planned {
        kind: "move".into(),
        template: json!({ "entity": entity, "to": to }),
    }
}

pub fn planned_wait(entity: u64) -> Planned {
    Planned {
        kind: "wait".into(),
        template: json!({ "entity": entity }),
    }
}

// ---------------------------------------------------------------------------
// controllers
// ---------------------------------------------------------------------------

pub type Journal = Arc<Mutex<Vec<String>>>;

/// Proposes its script in order, `per_turn` accepted proposals per turn.
///
/// A rejected proposal is journaled and does not use up an action. An empty
/// script passes the turn.
pub struct Scripted {
    base: ControllerBase,
    per_turn: u32,
    left: u32,
    script: VecDeque<Planned>,
    journal: Journal,
}

impl Scripted {
    pub fn new(id: &ControllerId, setup: &SeatSetup, journal: Journal) -> Self {
        Self {
            base: ControllerBase::new(id),
            per_turn: setup.per_turn,
            left: 0,
            script: setup.script.iter().cloned().collect(),
            journal,
        }
    }

    fn note(&self, line: String) {
        self.journal.lock().unwrap().push(line);
    }
}

impl Controller<Arena> for Scripted {
    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }

    fn has_actions_left(&self, _world: &World) -> bool {
        self.left > 0
    }

    fn on_turn_start(&mut self, _world: &World) {
        self.left = self.per_turn;
        self.note(format!("turn {}", self.id()));
    }

    fn make_choice(
        &mut self,
        ctx: &mut ChoiceContext<'_, Arena>,
    ) -> Result<(), game_core::ActionError> {
        let Some(planned) = self.script.pop_front() else {
            self.left = 0;
            self.note(format!("{} passes", self.id()));
            return Ok(());
        };

        if ctx.propose_value(planned.kind.as_str(), &planned.template)? {
            self.left -= 1;
            self.note(format!("{} chose {}", self.id(), planned.kind));
        } else {
            self.note(format!("{} rejected {}", self.id(), planned.kind));
        }
        Ok(())
    }
}

/// Turn manager with a selected "scripted" factory writing to `journal`.
pub fn turn_manager(journal: &Journal) -> TurnManager<Arena> {
    let mut turns = TurnManager::new();
    let journal = Arc::clone(journal);
    turns
        .register_factory("scripted", move |id: &ControllerId, setup: &SeatSetup| {
            Box::new(Scripted::new(id, setup, Arc::clone(&journal))) as Box<dyn Controller<Arena>>
        })
        .expect("factory registers once");
    turns.select_factory("scripted").expect("factory exists");
    turns
}

pub fn seat(per_turn: u32, script: Vec<Planned>) -> SeatSetup {
    SeatSetup { per_turn, script }
}

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn lines(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}
