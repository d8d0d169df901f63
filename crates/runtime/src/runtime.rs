//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up the command and outbound
//! channels, and exposes a builder-based API for embedding a peer.

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use game_core::Game;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::simulation::Simulation;
use crate::workers::SimulationWorker;

/// Main runtime that drives one peer's simulation
///
/// Runtime owns the worker task. [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime<G: Game> {
    handle: RuntimeHandle<G>,
    sim_worker_handle: JoinHandle<()>,
}

impl<G: Game> Runtime<G> {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder<G> {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle<G> {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every handle, including clones given out
    /// earlier, has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder<G: Game> {
    config: RuntimeConfig,
    simulation: Option<Simulation<G>>,
}

impl<G: Game> RuntimeBuilder<G> {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            simulation: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the simulation the worker will own (required)
    pub fn simulation(mut self, simulation: Simulation<G>) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Spawn the worker and return the running runtime.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<Runtime<G>> {
        let mut simulation = self.simulation.ok_or(RuntimeError::MissingSimulation)?;
        simulation.configure(&self.config);

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (outbound_tx, _) = broadcast::channel(self.config.outbound_buffer_size);

        let autotick = self
            .config
            .autotick
            .then_some(self.config.game_config.tick_delta);
        let worker = SimulationWorker::new(simulation, command_rx, outbound_tx.clone(), autotick);
        let sim_worker_handle = tokio::spawn(worker.run());

        info!(
            target: "runtime",
            trust = %self.config.trust,
            tick_ms = self.config.game_config.tick_delta.as_millis() as u64,
            autotick = self.config.autotick,
            "runtime started"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, outbound_tx),
            sim_worker_handle,
        })
    }
}
