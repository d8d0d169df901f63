//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the [`Simulation`](crate::Simulation) and is
//! the only task that ever touches it.

mod simulation;

pub use simulation::{Command, SimulationWorker};
