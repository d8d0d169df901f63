//! Tally game shared by the runtime tests.
//!
//! - "add": adds `amount` to the running total after 100ms
//! - "note": instant, forces a `Noted` event
//! - `Dealer` controllers propose one "add" per turn from a fixed list
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use game_core::{
    Action, ActionContext, ActionError, ActionRegistry, ChoiceContext, Controller,
    ControllerBase, ControllerId, Event, EventBus, Game, HandlerResponse, TurnManager,
};
use runtime::Simulation;
use serde::{Deserialize, Serialize};

pub const ADD_TIME: Duration = Duration::from_millis(100);

pub struct Tally;

#[derive(Debug, Default, PartialEq)]
pub struct Ledger {
    pub total: i64,
    pub log: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum TallyEvent {
    Added { amount: i64, total: i64 },
    Noted { text: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TallyTopic {
    Added,
    Noted,
}

impl Event for TallyEvent {
    type Topic = TallyTopic;

    fn topic(&self) -> TallyTopic {
        match self {
            Self::Added { .. } => TallyTopic::Added,
            Self::Noted { .. } => TallyTopic::Noted,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DealerSetup {
    pub amounts: Vec<i64>,
}

impl Game for Tally {
    type World = Ledger;
    type Event = TallyEvent;
    type ControllerSetup = DealerSetup;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub amount: i64,
}

pub struct AddAction;

impl AddAction {
    pub fn template(amount: i64) -> Amount {
        Amount { amount }
    }
}

impl Action<Tally> for AddAction {
    type Template = Amount;
    type Payload = Amount;

    fn validate(
        &self,
        _world: &Ledger,
        template: &Amount,
        _origin: &ControllerId,
    ) -> Option<Amount> {
        (template.amount != 0).then(|| template.clone())
    }

    fn is_finished(&self, _world: &Ledger, _payload: &Amount, time_passed: Duration) -> bool {
        time_passed >= ADD_TIME
    }

    fn on_end(
        &self,
        world: &mut Ledger,
        payload: &mut Amount,
        ctx: &mut ActionContext<'_, TallyEvent>,
    ) {
        world.total += payload.amount;
        world.log.push(format!("add {}", payload.amount));
        ctx.emit(TallyEvent::Added {
            amount: payload.amount,
            total: world.total,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
}

pub struct NoteAction;

impl NoteAction {
    pub fn template(text: impl Into<String>) -> Note {
        Note { text: text.into() }
    }
}

impl Action<Tally> for NoteAction {
    type Template = Note;
    type Payload = Note;

    fn validate(&self, _world: &Ledger, template: &Note, _origin: &ControllerId) -> Option<Note> {
        Some(template.clone())
    }

    fn is_finished(&self, _world: &Ledger, _payload: &Note, _time_passed: Duration) -> bool {
        true
    }

    fn on_end(
        &self,
        world: &mut Ledger,
        payload: &mut Note,
        ctx: &mut ActionContext<'_, TallyEvent>,
    ) {
        world.log.push(format!("note {}", payload.text));
        ctx.force(TallyEvent::Noted {
            text: payload.text.clone(),
        });
    }
}

pub fn registry() -> ActionRegistry<Tally> {
    ActionRegistry::new()
        .with("add", AddAction)
        .and_then(|registry| registry.with("note", NoteAction))
        .expect("tally actions register once")
}

pub fn bus() -> EventBus<TallyEvent> {
    let mut bus = EventBus::new();
    bus.register(TallyTopic::Added);
    bus.register(TallyTopic::Noted);
    bus
}

/// Records every event delivered on either topic.
pub fn record_events(bus: &mut EventBus<TallyEvent>) -> Arc<Mutex<Vec<TallyEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for topic in [TallyTopic::Added, TallyTopic::Noted] {
        let sink = Arc::clone(&seen);
        bus.on(topic, move |event: &TallyEvent| {
            sink.lock().unwrap().push(event.clone());
            HandlerResponse::Keep
        })
        .expect("topic registered");
    }
    seen
}

/// Proposes one amount per turn; passes once the list runs out.
pub struct Dealer {
    base: ControllerBase,
    amounts: VecDeque<i64>,
    acting: bool,
}

impl Controller<Tally> for Dealer {
    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }

    fn has_actions_left(&self, _world: &Ledger) -> bool {
        self.acting
    }

    fn on_turn_start(&mut self, _world: &Ledger) {
        self.acting = true;
    }

    fn make_choice(&mut self, ctx: &mut ChoiceContext<'_, Tally>) -> Result<(), ActionError> {
        self.acting = false;
        if let Some(amount) = self.amounts.pop_front() {
            ctx.propose("add", &AddAction::template(amount))?;
        }
        Ok(())
    }
}

pub fn turn_manager() -> TurnManager<Tally> {
    let mut turns = TurnManager::new();
    turns
        .register_factory("dealer", |id: &ControllerId, setup: &DealerSetup| {
            Box::new(Dealer {
                base: ControllerBase::new(id),
                amounts: setup.amounts.iter().copied().collect(),
                acting: false,
            }) as Box<dyn Controller<Tally>>
        })
        .expect("factory registers once");
    turns.select_factory("dealer").expect("factory exists");
    turns
}

/// A peer with the dealer factory selected and no controllers yet.
pub fn simulation() -> Simulation<Tally> {
    Simulation::new(Ledger::default(), registry())
        .with_bus(bus())
        .with_turns(turn_manager())
}

/// A peer whose single controller `P1` deals `amounts`.
pub fn dealing(amounts: &[i64]) -> Simulation<Tally> {
    let mut simulation = simulation();
    let turns = simulation.turns_mut();
    turns
        .create_controller(
            "P1",
            &DealerSetup {
                amounts: amounts.to_vec(),
            },
        )
        .expect("P1 is new");
    turns.set_actor_order(["P1"]).expect("P1 registered");
    simulation
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
