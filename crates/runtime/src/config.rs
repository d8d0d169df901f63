//! Runtime configuration.

use std::env;
use std::time::Duration;

use game_core::GameConfig;

/// How inbound requests from other peers are admitted.
///
/// Neither mode re-runs validation: the sender's payload already carries
/// every derived outcome, and re-deriving it could disagree and diverge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ReplicationTrust {
    /// Enqueue remote requests exactly as received.
    #[default]
    #[strum(to_string = "trust", serialize = "trust_sender")]
    TrustSender,
    /// Check that the action type is registered and the payload decodes for
    /// it before enqueueing.
    #[strum(to_string = "revalidate")]
    Revalidate,
}

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub command_buffer_size: usize,
    pub outbound_buffer_size: usize,
    pub trust: ReplicationTrust,
    /// Step on a timer of `game_config.tick_delta` in addition to explicit
    /// step commands.
    pub autotick: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            command_buffer_size: 32,
            outbound_buffer_size: 100,
            trust: ReplicationTrust::default(),
            autotick: false,
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `SIM_TICK_MILLIS`: fixed tick length in milliseconds
    /// - `SIM_COMMAND_BUFFER`: worker command channel capacity
    /// - `SIM_OUTBOUND_BUFFER`: outbound broadcast capacity
    /// - `SIM_TRUST`: `trust` or `revalidate`
    /// - `SIM_AUTOTICK`: `true`/`false`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(millis) = parse::<u64>(&lookup, "SIM_TICK_MILLIS") {
            config.game_config = GameConfig::with_tick_delta(Duration::from_millis(millis.max(1)));
        }
        if let Some(capacity) = parse::<usize>(&lookup, "SIM_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = parse::<usize>(&lookup, "SIM_OUTBOUND_BUFFER") {
            config.outbound_buffer_size = capacity.max(1);
        }
        if let Some(trust) = parse::<ReplicationTrust>(&lookup, "SIM_TRUST") {
            config.trust = trust;
        }
        if let Some(autotick) = lookup("SIM_AUTOTICK").as_deref().and_then(parse_bool) {
            config.autotick = autotick;
        }

        config
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
