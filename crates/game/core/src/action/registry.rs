//! Registry of action types keyed by [`ActionTypeId`].
//!
//! Concrete actions are typed ([`Action`] has associated template and
//! payload types); the registry stores them behind an object-safe adapter
//! that decodes the JSON payload carried by an [`ExecutionRequest`], runs the
//! typed hook, and writes the payload back.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Action, ActionContext, ActionError, ExecutionRequest};
use crate::game::Game;
use crate::types::{ActionTypeId, ControllerId};

/// Object-safe view of an [`Action`] operating on JSON payloads.
pub(crate) trait ErasedAction<G: Game>: Send {
    fn validate(
        &self,
        kind: &ActionTypeId,
        world: &G::World,
        template: &Value,
        origin: &ControllerId,
    ) -> Result<Option<Value>, ActionError>;

    fn check_payload(&self, kind: &ActionTypeId, data: &Value) -> Result<(), ActionError>;

    fn on_start(
        &self,
        kind: &ActionTypeId,
        world: &mut G::World,
        data: &mut Value,
        ctx: &mut ActionContext<'_, G::Event>,
    ) -> Result<(), ActionError>;

    fn on_update(
        &self,
        kind: &ActionTypeId,
        world: &mut G::World,
        data: &mut Value,
        ctx: &mut ActionContext<'_, G::Event>,
    ) -> Result<(), ActionError>;

    fn is_finished(
        &self,
        kind: &ActionTypeId,
        world: &G::World,
        data: &Value,
        time_passed: Duration,
    ) -> Result<bool, ActionError>;

    fn on_end(
        &self,
        kind: &ActionTypeId,
        world: &mut G::World,
        data: &mut Value,
        ctx: &mut ActionContext<'_, G::Event>,
    ) -> Result<(), ActionError>;
}

struct Erased<A>(A);

fn decode_payload<P>(kind: &ActionTypeId, data: &Value) -> Result<P, ActionError>
where
    P: DeserializeOwned,
{
    P::deserialize(data).map_err(|error| ActionError::malformed_payload(kind, error))
}

fn decode_template<T>(kind: &ActionTypeId, template: &Value) -> Result<T, ActionError>
where
    T: DeserializeOwned,
{
    T::deserialize(template).map_err(|error| ActionError::malformed_template(kind, error))
}

fn encode_payload<P: Serialize>(kind: &ActionTypeId, payload: &P) -> Result<Value, ActionError> {
    serde_json::to_value(payload).map_err(|error| ActionError::malformed_payload(kind, error))
}

/// Decodes the payload, hands it to `hook`, and stores the result back.
fn with_payload<P, F>(kind: &ActionTypeId, data: &mut Value, hook: F) -> Result<(), ActionError>
where
    P: Serialize + DeserializeOwned,
    F: FnOnce(&mut P),
{
    let mut payload: P = decode_payload(kind, data)?;
    hook(&mut payload);
    *data = encode_payload(kind, &payload)?;
    Ok(())
}

impl<G, A> ErasedAction<G> for Erased<A>
where
    G: Game,
    A: Action<G>,
{
    fn validate(
        &self,
        kind: &ActionTypeId,
        world: &G::World,
        template: &Value,
        origin: &ControllerId,
    ) -> Result<Option<Value>, ActionError> {
        let template: A::Template = decode_template(kind, template)?;

        self.0
            .validate(world, &template, origin)
            .map(|payload| encode_payload(kind, &payload))
            .transpose()
    }

    fn check_payload(&self, kind: &ActionTypeId, data: &Value) -> Result<(), ActionError> {
        decode_payload::<A::Payload>(kind, data).map(|_| ())
    }

    fn on_start(
        &self,
        kind: &ActionTypeId,
        world: &mut G::World,
        data: &mut Value,
        ctx: &mut ActionContext<'_, G::Event>,
    ) -> Result<(), ActionError> {
        with_payload(kind, data, |payload| self.0.on_start(world, payload, ctx))
    }

    fn on_update(
        &self,
        kind: &ActionTypeId,
        world: &mut G::World,
        data: &mut Value,
        ctx: &mut ActionContext<'_, G::Event>,
    ) -> Result<(), ActionError> {
        with_payload(kind, data, |payload| self.0.on_update(world, payload, ctx))
    }

    fn is_finished(
        &self,
        kind: &ActionTypeId,
        world: &G::World,
        data: &Value,
        time_passed: Duration,
    ) -> Result<bool, ActionError> {
        let payload: A::Payload = decode_payload(kind, data)?;
        Ok(self.0.is_finished(world, &payload, time_passed))
    }

    fn on_end(
        &self,
        kind: &ActionTypeId,
        world: &mut G::World,
        data: &mut Value,
        ctx: &mut ActionContext<'_, G::Event>,
    ) -> Result<(), ActionError> {
        with_payload(kind, data, |payload| self.0.on_end(world, payload, ctx))
    }
}

/// Action types available to one simulation instance.
///
/// Every peer must register the same actions under the same ids; a request
/// naming an unregistered type is a configuration fault.
pub struct ActionRegistry<G: Game> {
    actions: HashMap<ActionTypeId, Box<dyn ErasedAction<G>>>,
}

impl<G: Game> ActionRegistry<G> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Registers an action under `kind`.
    pub fn register<A>(
        &mut self,
        kind: impl Into<ActionTypeId>,
        action: A,
    ) -> Result<(), ActionError>
    where
        A: Action<G>,
    {
        let kind = kind.into();
        if self.actions.contains_key(&kind) {
            return Err(ActionError::DuplicateAction { kind });
        }
        self.actions.insert(kind, Box::new(Erased(action)));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<A>(mut self, kind: impl Into<ActionTypeId>, action: A) -> Result<Self, ActionError>
    where
        A: Action<G>,
    {
        self.register(kind, action)?;
        Ok(self)
    }

    pub fn contains(&self, kind: &ActionTypeId) -> bool {
        self.actions.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered action ids, sorted.
    pub fn kinds(&self) -> Vec<&ActionTypeId> {
        let mut kinds: Vec<_> = self.actions.keys().collect();
        kinds.sort();
        kinds
    }

    /// Validates a proposal and wraps the payload in a fresh request.
    ///
    /// `Ok(None)` means the proposal is illegal right now and must be
    /// dropped. Errors are reserved for unknown action types and templates
    /// that do not decode.
    pub fn propose(
        &self,
        kind: &ActionTypeId,
        world: &G::World,
        template: &Value,
        origin: &ControllerId,
    ) -> Result<Option<ExecutionRequest>, ActionError> {
        let data = self.get(kind)?.validate(kind, world, template, origin)?;
        Ok(data.map(|data| ExecutionRequest::new(kind.clone(), data)))
    }

    /// Typed form of [`propose`](Self::propose).
    pub fn propose_template<T: Serialize>(
        &self,
        kind: &ActionTypeId,
        world: &G::World,
        template: &T,
        origin: &ControllerId,
    ) -> Result<Option<ExecutionRequest>, ActionError> {
        let template = super::template_value(kind, template)?;
        self.propose(kind, world, &template, origin)
    }

    /// Checks that a request names a registered action and that its payload
    /// decodes. Outcomes are not re-derived.
    pub fn check_payload(&self, request: &ExecutionRequest) -> Result<(), ActionError> {
        self.get(request.kind())?
            .check_payload(request.kind(), request.data())
    }

    pub(crate) fn get(&self, kind: &ActionTypeId) -> Result<&dyn ErasedAction<G>, ActionError> {
        self.actions
            .get(kind)
            .map(|action| action.as_ref())
            .ok_or_else(|| ActionError::UnknownAction { kind: kind.clone() })
    }
}

impl<G: Game> Default for ActionRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}
