use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::events::Event;

/// Type family binding the core to one concrete game.
///
/// The core never looks inside `World`; it only threads it through action
/// hooks and controllers. Everything a simulation instance owns must be
/// `Send` so the runtime can move the instance into its worker task.
pub trait Game: 'static {
    /// World state handed to actions and controllers.
    type World: Send;

    /// Events emitted by actions and forced in from the network.
    type Event: Event + Clone + Serialize + DeserializeOwned + Send;

    /// Setup payload passed to controller factories.
    type ControllerSetup: DeserializeOwned + Send;
}
