//! Messages exchanged between peers.
//!
//! Only already-validated data crosses the wire: requests as `{type, data}`,
//! forced events, and controller instantiation. Framing and transport are the
//! embedder's concern; this module only defines the JSON shape of a single
//! message.
//!
//! ```text
//! {"kind":"queueAction","executionItem":{"type":"move","data":{..}}}
//! {"kind":"queueActionBatch","batch":[{"type":..,"data":..}, ..]}
//! {"kind":"gameEvent","type":"moved","data":{..}}
//! {"kind":"instanceController","controllerID":"P2","controllerSetup":{..}}
//! ```

use serde::{Deserialize, Serialize};

use game_core::{ControllerId, ExecutionRequest, Game};

/// A message received from another peer.
///
/// `E` is the game's event type and must be adjacently tagged as
/// `{"type", "data"}` so a `gameEvent` message decodes straight into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InboundMessage<E, S> {
    #[serde(rename_all = "camelCase")]
    QueueAction { execution_item: ExecutionRequest },

    QueueActionBatch { batch: Vec<ExecutionRequest> },

    GameEvent(E),

    #[serde(rename_all = "camelCase")]
    InstanceController {
        #[serde(rename = "controllerID")]
        controller_id: ControllerId,
        controller_setup: S,
    },
}

/// Inbound message type for a given game.
pub type Inbound<G> = InboundMessage<<G as Game>::Event, <G as Game>::ControllerSetup>;

impl<E, S> InboundMessage<E, S>
where
    Self: for<'de> Deserialize<'de>,
{
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A message produced for other peers: one per locally submitted request,
/// in submission order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundMessage {
    #[serde(rename_all = "camelCase")]
    QueueAction { execution_item: ExecutionRequest },
}

impl OutboundMessage {
    pub fn request(&self) -> &ExecutionRequest {
        match self {
            Self::QueueAction { execution_item } => execution_item,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ExecutionRequest> for OutboundMessage {
    fn from(execution_item: ExecutionRequest) -> Self {
        Self::QueueAction { execution_item }
    }
}

/// Relays an outbound message as the receiving peer's inbound message.
impl<E, S> From<OutboundMessage> for InboundMessage<E, S> {
    fn from(message: OutboundMessage) -> Self {
        match message {
            OutboundMessage::QueueAction { execution_item } => {
                InboundMessage::QueueAction { execution_item }
            }
        }
    }
}
