//! Protocol module - JSON message types for the match adapter
//!
//! Line-delimited JSON. Every client message carries `type` and `seq`; replies echo the
//! `seq` of the request they answer. Events are pushed to subscribed clients without one.

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, MatchEvent, MatchId};

// ============== Client -> Server Messages ==============

/// Create a solo or open match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessage {
    pub seq: u64,
    pub channel: String,
    pub player: String,
    /// `solo`, `open` (also `1p`)
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_delay_ms: Option<u64>,
}

fn default_mode() -> String {
    "solo".to_string()
}

/// Create two matches coupled for head-to-head play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePairMessage {
    pub seq: u64,
    pub channel: String,
    pub players: [String; 2],
    pub pair_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub seq: u64,
    #[serde(rename = "match")]
    pub match_id: MatchId,
    pub player: String,
    pub action: String,
}

/// Start receiving match events on this connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeMessage {
    pub seq: u64,
}

/// Parsed incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Create(CreateMessage),
    CreatePair(CreatePairMessage),
    Action(ActionMessage),
    Subscribe(SubscribeMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

const KNOWN_TYPES: [&str; 4] = ["create", "create_pair", "action", "subscribe"];

/// Parse one line from a client
///
/// A well-formed object with an unrecognized `type` is not a parse error; it comes back
/// as [`ParsedMessage::Unknown`] so the server can answer with the right `seq`.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum InboundMessage {
        Create(CreateMessage),
        CreatePair(CreatePairMessage),
        Action(ActionMessage),
        Subscribe(SubscribeMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Create(m)) => Ok(ParsedMessage::Create(m)),
        Ok(InboundMessage::CreatePair(m)) => Ok(ParsedMessage::CreatePair(m)),
        Ok(InboundMessage::Action(m)) => Ok(ParsedMessage::Action(m)),
        Ok(InboundMessage::Subscribe(m)) => Ok(ParsedMessage::Subscribe(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            let msg_type = envelope.msg_type.unwrap_or("unknown");
            if KNOWN_TYPES.contains(&msg_type) {
                return Err(e);
            }
            Ok(ParsedMessage::Unknown(UnknownMessage {
                seq: envelope.seq.unwrap_or(0),
            }))
        }
    }
}

/// Pull `seq` out of a line that failed to parse, so the error can still be correlated
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidMessage,
    InvalidAction,
    UnknownMatch,
    InvalidConfig,
}

impl From<&EngineError> for ErrorCode {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::InvalidAction(_) => ErrorCode::InvalidAction,
            EngineError::UnknownMatch(_) => ErrorCode::UnknownMatch,
            EngineError::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Created {
        seq: u64,
        matches: Vec<MatchId>,
    },
    Ack {
        seq: u64,
        status: String,
        /// How an action resolved (absent for non-action requests)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<String>,
    },
    Error {
        seq: u64,
        code: ErrorCode,
        message: String,
    },
    Event {
        event: MatchEvent,
    },
}

impl ServerMessage {
    pub fn ok(seq: u64) -> Self {
        Self::Ack {
            seq,
            status: "ok".to_string(),
            outcome: None,
        }
    }

    pub fn outcome(seq: u64, outcome: &str) -> Self {
        Self::Ack {
            seq,
            status: "ok".to_string(),
            outcome: Some(outcome.to_string()),
        }
    }

    pub fn error(seq: u64, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            seq,
            code,
            message: message.into(),
        }
    }

    pub fn engine_error(seq: u64, err: &EngineError) -> Self {
        Self::error(seq, ErrorCode::from(err), err.to_string())
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
