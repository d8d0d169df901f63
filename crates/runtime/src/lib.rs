//! Runtime orchestration for the deterministic action core.
//!
//! This crate wraps one [`Simulation`] (world, action queue, turn manager and
//! event bus from `game-core`) in a tokio worker and exposes it through a
//! cloneable [`RuntimeHandle`]. Peers stay in lockstep by exchanging the
//! JSON messages defined in [`net`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`simulation`] owns one instance of the core and steps it
//! - [`net`] defines inbound and outbound peer messages
//! - [`config`] loads runtime settings from the environment
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod net;
pub mod runtime;
pub mod simulation;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use config::{ReplicationTrust, RuntimeConfig};
pub use net::{Inbound, InboundMessage, OutboundMessage};
pub use runtime::{Runtime, RuntimeBuilder};
pub use simulation::{Simulation, StepReport};
