//! Execution request envelope.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ActionError;
use crate::replay::RequestDigest;
use crate::types::ActionTypeId;

/// Lifecycle of an [`ExecutionRequest`].
///
/// Transitions are strictly `None → Running → Finished`. Wire names are
/// `NONE`, `RUNNING` and `FINISHED`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    #[default]
    None,
    Running,
    Finished,
}

impl RequestState {
    /// The only state this one may move to.
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Running),
            Self::Running => Some(Self::Finished),
            Self::Finished => None,
        }
    }
}

/// One in-flight invocation of an action.
///
/// Created once, when a proposal passes validation. Only `{type, data}` is
/// serialized: `state` and `time_passed` are local execution bookkeeping and
/// come back as `NONE`/zero on the receiving peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    #[serde(rename = "type")]
    kind: ActionTypeId,
    data: serde_json::Value,
    #[serde(skip)]
    state: RequestState,
    #[serde(skip)]
    time_passed: Duration,
}

impl ExecutionRequest {
    pub fn new(kind: impl Into<ActionTypeId>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            data,
            state: RequestState::None,
            time_passed: Duration::ZERO,
        }
    }

    /// Wraps a typed payload.
    pub fn from_payload<P: Serialize>(
        kind: impl Into<ActionTypeId>,
        payload: &P,
    ) -> Result<Self, ActionError> {
        let kind = kind.into();
        let data = serde_json::to_value(payload)
            .map_err(|error| ActionError::malformed_payload(&kind, error))?;
        Ok(Self::new(kind, data))
    }

    pub fn kind(&self) -> &ActionTypeId {
        &self.kind
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut serde_json::Value {
        &mut self.data
    }

    /// Decodes the payload into its typed form.
    pub fn payload<P: DeserializeOwned>(&self) -> Result<P, ActionError> {
        P::deserialize(&self.data)
            .map_err(|error| ActionError::malformed_payload(&self.kind, error))
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == RequestState::Finished
    }

    pub fn time_passed(&self) -> Duration {
        self.time_passed
    }

    /// Adds one tick's worth of time. Pure bookkeeping.
    pub fn advance(&mut self, delta: Duration) {
        self.time_passed += delta;
    }

    /// Moves to `next` if it is the successor of the current state.
    ///
    /// Any other value is ignored and `false` is returned.
    pub fn set_state(&mut self, next: RequestState) -> bool {
        if self.state.successor() != Some(next) {
            return false;
        }
        self.state = next;
        true
    }

    /// Like [`set_state`](Self::set_state) for a wire name; unknown names
    /// are ignored.
    pub fn set_state_named(&mut self, name: &str) -> bool {
        name.parse::<RequestState>()
            .is_ok_and(|next| self.set_state(next))
    }

    /// SHA-256 of the replicated part of the request (`type` and `data`).
    ///
    /// JSON objects are key-ordered, so equal requests hash equally on
    /// every peer.
    pub fn digest(&self) -> RequestDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.data.to_string().as_bytes());
        hasher.finalize().into()
    }
}
