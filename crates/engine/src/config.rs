//! Engine and match configuration
//!
//! `EngineConfig` holds process-wide knobs (gravity policy, seeding, paired start delay)
//! and can be read from the environment. `MatchConfig` describes one match request and is
//! immutable once the match exists.

use std::time::Duration;

use tetromatch_core::scoring::get_drop_interval_ms;
use tetromatch_core::types::{MatchMode, DEFAULT_GRAVITY_MS, PAIRED_START_DELAY_MS};

use crate::error::EngineError;

/// How long a piece waits between gravity steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityPolicy {
    /// Same interval for the whole match
    Constant(Duration),
    /// Classic level curve, faster every 10 lines
    Leveled,
}

impl Default for GravityPolicy {
    fn default() -> Self {
        Self::Constant(Duration::from_millis(DEFAULT_GRAVITY_MS as u64))
    }
}

impl GravityPolicy {
    pub fn interval(&self, level: u32) -> Duration {
        match self {
            Self::Constant(interval) => *interval,
            Self::Leveled => Duration::from_millis(get_drop_interval_ms(level) as u64),
        }
    }

    /// Parse `leveled` or a positive millisecond count
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("leveled") {
            return Some(Self::Leveled);
        }
        match s.parse::<u64>() {
            Ok(ms) if ms > 0 => Some(Self::Constant(Duration::from_millis(ms))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub gravity: GravityPolicy,
    /// Fixed base seed; `None` seeds every match from the clock
    pub seed: Option<u32>,
    /// Start delay for paired matches that do not ask for one
    pub paired_start_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity: GravityPolicy::default(),
            seed: None,
            paired_start_delay: Duration::from_millis(PAIRED_START_DELAY_MS as u64),
        }
    }
}

impl EngineConfig {
    /// Create from `TETROMATCH_GRAVITY_MS` and `TETROMATCH_SEED`
    pub fn from_env() -> Self {
        use std::env;

        let mut config = Self::default();

        if let Ok(raw) = env::var("TETROMATCH_GRAVITY_MS") {
            match GravityPolicy::parse(&raw) {
                Some(gravity) => config.gravity = gravity,
                None => log::warn!("[config] ignoring TETROMATCH_GRAVITY_MS={:?}", raw),
            }
        }

        config.seed = env::var("TETROMATCH_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        config
    }

    /// How long a new match stays pending before its first piece spawns
    pub fn start_delay_for(&self, config: &MatchConfig) -> Duration {
        match (config.start_delay, config.mode) {
            (Some(delay), _) => delay,
            (None, MatchMode::Paired) => self.paired_start_delay,
            (None, _) => Duration::ZERO,
        }
    }
}

/// One match request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    pub channel: String,
    /// The owning player
    pub player: String,
    pub mode: MatchMode,
    pub start_delay: Option<Duration>,
    pub pair_id: Option<String>,
}

impl MatchConfig {
    pub fn solo(channel: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            player: player.into(),
            mode: MatchMode::Solo,
            start_delay: None,
            pair_id: None,
        }
    }

    pub fn open(channel: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            mode: MatchMode::Open,
            ..Self::solo(channel, player)
        }
    }

    pub fn paired(
        channel: impl Into<String>,
        player: impl Into<String>,
        pair_id: impl Into<String>,
    ) -> Self {
        Self {
            mode: MatchMode::Paired,
            pair_id: Some(pair_id.into()),
            ..Self::solo(channel, player)
        }
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.channel.trim().is_empty() {
            return Err(EngineError::InvalidConfig("channel is empty".to_string()));
        }
        if self.player.trim().is_empty() {
            return Err(EngineError::InvalidConfig("player is empty".to_string()));
        }

        let has_pair_id = self
            .pair_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        match (self.mode, has_pair_id) {
            (MatchMode::Paired, false) => Err(EngineError::InvalidConfig(
                "paired match needs a pair id".to_string(),
            )),
            (MatchMode::Solo | MatchMode::Open, _) if self.pair_id.is_some() => {
                Err(EngineError::InvalidConfig(
                    "only paired matches carry a pair id".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}
