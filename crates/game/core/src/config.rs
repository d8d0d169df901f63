use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Simulation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed simulation step. Every `ActionQueue::update` advances the head
    /// request by exactly this much, on every peer.
    pub tick_delta: Duration,
}

impl GameConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TICK_MILLIS: u64 = 50;

    pub fn new() -> Self {
        Self {
            tick_delta: Duration::from_millis(Self::DEFAULT_TICK_MILLIS),
        }
    }

    pub fn with_tick_delta(tick_delta: Duration) -> Self {
        Self { tick_delta }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
