use std::fmt;

use crate::registry::MatchId;

/// Errors returned to callers of the engine
///
/// Actions that are well-formed but not applicable (wrong state, wrong player) are not
/// errors; they resolve to [`ActionOutcome::Ignored`](crate::ActionOutcome::Ignored).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The action id is not one the engine knows
    InvalidAction(String),
    /// No live match has this handle (never created, or already removed)
    UnknownMatch(MatchId),
    InvalidConfig(String),
}

impl EngineError {
    /// Stable error code for wire surfaces
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAction(_) => "invalid_action",
            Self::UnknownMatch(_) => "unknown_match",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAction(action) => write!(f, "invalid action: {}", action),
            Self::UnknownMatch(id) => write!(f, "unknown match: {}", id),
            Self::InvalidConfig(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}
