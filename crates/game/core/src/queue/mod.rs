//! FIFO execution of validated requests.
//!
//! The [`ActionQueue`] is the single gate between "validated" and
//! "applied". Only its head advances; everything behind it waits, so at most
//! one request is running at any time and requests complete in the order
//! they were enqueued.

mod errors;

pub use errors::{ExecuteError, ExecutionPhase};

use std::collections::VecDeque;
use std::time::Duration;

use crate::action::{ActionContext, ActionRegistry, ExecutionRequest, RequestState};
use crate::events::{EventBus, EventQueue};
use crate::game::Game;
use crate::replay::RequestDigest;

/// A request that left the queue after `on_end`.
#[derive(Clone, Debug, PartialEq)]
pub struct Completed {
    pub request: ExecutionRequest,
    pub digest: RequestDigest,
}

/// Ordered queue of execution requests with single-active-item semantics.
#[derive(Debug, Default)]
pub struct ActionQueue {
    requests: VecDeque<ExecutionRequest>,
    outbound: Vec<ExecutionRequest>,
    completed: u64,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request. The request is trusted as-is.
    pub fn enqueue(&mut self, request: ExecutionRequest) {
        self.requests.push_back(request);
    }

    /// Appends a locally originated request and records it for replication.
    pub fn submit(&mut self, request: ExecutionRequest) {
        self.outbound.push(request.clone());
        self.enqueue(request);
    }

    /// Takes the requests submitted since the last drain, in submission order.
    pub fn drain_outbound(&mut self) -> Vec<ExecutionRequest> {
        std::mem::take(&mut self.outbound)
    }

    /// True while any request is pending or running.
    pub fn is_running(&self) -> bool {
        !self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn head(&self) -> Option<&ExecutionRequest> {
        self.requests.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRequest> {
        self.requests.iter()
    }

    /// Number of requests dequeued so far.
    pub fn completed_count(&self) -> u64 {
        self.completed
    }

    /// Advances the head request by one fixed tick.
    ///
    /// A fresh head is started and updated in the same tick, so an action
    /// that is finished right away completes on the tick it starts. Returns
    /// the request once it has been ended and dequeued.
    ///
    /// On error the failing request stays at the head. A request whose
    /// `on_end` already ran is not ended again; the next update only
    /// dequeues it.
    pub fn update<G: Game>(
        &mut self,
        registry: &ActionRegistry<G>,
        world: &mut G::World,
        bus: &mut EventBus<G::Event>,
        delta: Duration,
    ) -> Result<Option<Completed>, ExecuteError> {
        let Some(mut head) = self.requests.pop_front() else {
            return Ok(None);
        };

        match drive(registry, &mut head, world, bus, delta) {
            Ok(true) => {
                self.completed += 1;
                let digest = head.digest();
                Ok(Some(Completed {
                    request: head,
                    digest,
                }))
            }
            Ok(false) => {
                self.requests.push_front(head);
                Ok(None)
            }
            Err(error) => {
                self.requests.push_front(head);
                Err(error)
            }
        }
    }
}

/// Runs the hooks due this tick. Returns whether the request finished.
fn drive<G: Game>(
    registry: &ActionRegistry<G>,
    request: &mut ExecutionRequest,
    world: &mut G::World,
    bus: &mut EventBus<G::Event>,
    delta: Duration,
) -> Result<bool, ExecuteError> {
    // Ended on an earlier tick whose event dispatch failed; only dequeue.
    if request.is_finished() {
        return Ok(true);
    }

    let kind = request.kind().clone();
    let phase = match request.state() {
        RequestState::None => ExecutionPhase::Start,
        _ => ExecutionPhase::Update,
    };
    let action = registry
        .get(&kind)
        .map_err(ExecuteError::action(&kind, phase))?;
    let mut events = EventQueue::new();

    if request.set_state(RequestState::Running) {
        let phase = ExecutionPhase::Start;
        let mut ctx = ActionContext::new(&mut events, delta, request.time_passed());
        action
            .on_start(&kind, world, request.data_mut(), &mut ctx)
            .map_err(ExecuteError::action(&kind, phase))?;
        events
            .flush(bus)
            .map_err(ExecuteError::dispatch(&kind, phase))?;
    }

    request.advance(delta);
    let phase = ExecutionPhase::Update;
    let mut ctx = ActionContext::new(&mut events, delta, request.time_passed());
    action
        .on_update(&kind, world, request.data_mut(), &mut ctx)
        .map_err(ExecuteError::action(&kind, phase))?;
    events
        .flush(bus)
        .map_err(ExecuteError::dispatch(&kind, phase))?;

    let finished = action
        .is_finished(&kind, world, request.data(), request.time_passed())
        .map_err(ExecuteError::action(&kind, ExecutionPhase::Finish))?;
    if !finished {
        return Ok(false);
    }

    let phase = ExecutionPhase::End;
    let mut ctx = ActionContext::new(&mut events, delta, request.time_passed());
    action
        .on_end(&kind, world, request.data_mut(), &mut ctx)
        .map_err(ExecuteError::action(&kind, phase))?;
    request.set_state(RequestState::Finished);
    events
        .flush(bus)
        .map_err(ExecuteError::dispatch(&kind, phase))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn submit_records_outbound_in_order() {
        let mut queue = ActionQueue::new();
        queue.enqueue(ExecutionRequest::new("remote", json!(0)));
        queue.submit(ExecutionRequest::new("local", json!(1)));
        queue.submit(ExecutionRequest::new("local", json!(2)));

        assert_eq!(queue.len(), 3);
        assert!(queue.is_running());

        let outbound = queue.drain_outbound();
        let data: Vec<_> = outbound.iter().map(|r| r.data().clone()).collect();
        assert_eq!(data, vec![json!(1), json!(2)]);
        assert!(queue.drain_outbound().is_empty());
        assert_eq!(queue.head().map(|r| r.kind().as_str()), Some("remote"));
    }

    #[test]
    fn phase_names_are_snake_case() {
        assert_eq!(ExecutionPhase::Start.as_str(), "start");
        assert_eq!(ExecutionPhase::Finish.to_string(), "finish");
    }
}
