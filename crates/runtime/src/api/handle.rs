//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the simulation, feeding it messages from other peers, and
//! streaming the requests it produces for them.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::Game;

use super::errors::{Result, RuntimeError};
use crate::net::{Inbound, OutboundMessage};
use crate::simulation::{Simulation, StepReport};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
pub struct RuntimeHandle<G: Game> {
    command_tx: mpsc::Sender<Command<G>>,
    outbound_tx: broadcast::Sender<OutboundMessage>,
}

impl<G: Game> Clone for RuntimeHandle<G> {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            outbound_tx: self.outbound_tx.clone(),
        }
    }
}

impl<G: Game> RuntimeHandle<G> {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command<G>>,
        outbound_tx: broadcast::Sender<OutboundMessage>,
    ) -> Self {
        Self {
            command_tx,
            outbound_tx,
        }
    }

    /// Run one fixed tick of the simulation
    pub async fn step(&self) -> Result<StepReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Step { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Apply a message received from another peer
    pub async fn send(&self, message: Inbound<G>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Inbound {
                message,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Read from the simulation inside the worker.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let tick = handle.query(|sim| sim.tick()).await?;
    /// ```
    pub async fn query<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&Simulation<G>) -> R + Send + 'static,
    {
        self.modify(move |sim| f(sim)).await
    }

    /// Mutate the simulation inside the worker, e.g. to register controllers
    /// or set the actor order before the first step.
    pub async fn modify<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Simulation<G>) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job = Box::new(move |sim: &mut Simulation<G>| {
            // The caller may have given up waiting.
            let _ = reply_tx.send(f(sim));
        });
        self.command_tx
            .send(Command::Exec(job))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to requests submitted locally, ready to forward to peers.
    ///
    /// Only messages published after subscribing are received.
    pub fn subscribe_outbound(&self) -> broadcast::Receiver<OutboundMessage> {
        self.outbound_tx.subscribe()
    }
}
