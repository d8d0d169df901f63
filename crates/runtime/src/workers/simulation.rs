//! Simulation worker that owns one [`Simulation`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), steps the
//! simulation, and publishes locally submitted requests as
//! [`OutboundMessage`]s.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, warn};

use game_core::{Game, GameError};

use crate::api::{Result, RuntimeError};
use crate::net::{Inbound, OutboundMessage};
use crate::simulation::{Simulation, StepReport};

/// Closure run against the simulation inside the worker.
pub type Job<G> = Box<dyn FnOnce(&mut Simulation<G>) + Send>;

/// Commands that can be sent to the simulation worker
pub enum Command<G: Game> {
    /// Run one fixed tick.
    Step {
        reply: oneshot::Sender<Result<StepReport>>,
    },
    /// Apply a message received from another peer.
    Inbound {
        message: Inbound<G>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Run a closure with access to the simulation. Allowed after a halt.
    Exec(Job<G>),
}

/// Background task that processes simulation commands.
///
/// A fatal error halts the worker: it keeps answering queries, but every
/// later step or inbound message fails with [`RuntimeError::Halted`].
pub struct SimulationWorker<G: Game> {
    simulation: Simulation<G>,
    command_rx: mpsc::Receiver<Command<G>>,
    outbound_tx: broadcast::Sender<OutboundMessage>,
    autotick: Option<Duration>,
    halted: Option<String>,
}

impl<G: Game> SimulationWorker<G> {
    pub fn new(
        simulation: Simulation<G>,
        command_rx: mpsc::Receiver<Command<G>>,
        outbound_tx: broadcast::Sender<OutboundMessage>,
        autotick: Option<Duration>,
    ) -> Self {
        Self {
            simulation,
            command_rx,
            outbound_tx,
            autotick,
            halted: None,
        }
    }

    /// Main worker loop. Returns once every command sender is dropped.
    pub async fn run(mut self) {
        let mut ticker = self.autotick.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_tick(&mut ticker), if ticker.is_some() && self.halted.is_none() => {
                    // Errors are logged by `step`; nobody is waiting for them.
                    let _ = self.step();
                }
            }
        }

        debug!(
            target: "runtime::worker",
            tick = self.simulation.tick(),
            "simulation worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command<G>) {
        match cmd {
            Command::Step { reply } => {
                let result = self.step();
                if reply.send(result).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "Step reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Inbound { message, reply } => {
                let result = self.inbound(message);
                if reply.send(result).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "Inbound reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Exec(job) => job(&mut self.simulation),
        }
    }

    fn step(&mut self) -> Result<StepReport> {
        self.ensure_running()?;

        let result = self.simulation.step();
        self.publish_outbound();

        match result {
            Ok(report) => {
                if let Some(done) = &report.completed {
                    debug!(
                        target: "runtime::worker",
                        tick = report.tick,
                        kind = %done.request.kind(),
                        digest = %hex::encode(done.digest),
                        "request completed"
                    );
                }
                Ok(report)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn inbound(&mut self, message: Inbound<G>) -> Result<()> {
        self.ensure_running()?;

        self.simulation
            .handle_inbound(message)
            .map_err(|error| self.fail(error))
    }

    fn ensure_running(&self) -> Result<()> {
        match &self.halted {
            Some(reason) => Err(RuntimeError::Halted {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Logs an error by severity, halting on configuration faults.
    fn fail(&mut self, error: RuntimeError) -> RuntimeError {
        let severity = error.severity();
        if severity.is_fatal() {
            error!(
                target: "runtime::worker",
                tick = self.simulation.tick(),
                code = error.error_code(),
                error = %error,
                "configuration fault, halting simulation"
            );
            self.halted = Some(error.to_string());
        } else {
            warn!(
                target: "runtime::worker",
                tick = self.simulation.tick(),
                severity = severity.as_str(),
                code = error.error_code(),
                error = %error,
                "simulation refused input"
            );
        }
        error
    }

    fn publish_outbound(&mut self) {
        for message in self.simulation.drain_outbound() {
            debug!(
                target: "runtime::worker",
                kind = %message.request().kind(),
                "publishing outbound request"
            );
            // No subscribers is not an error.
            let _ = self.outbound_tx.send(message);
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
