//! Match engine - concurrent match lifecycles on top of the core playfield
//!
//! Every match runs in its own tokio task with its own gravity timer and inbound queue.
//! Two matches can be coupled by a [`PairingLink`] that relays garbage rows and decides
//! the head-to-head outcome. Callers create matches through [`Engine`], submit actions by
//! handle, and receive [`MatchEvent`]s through an [`EventSink`].
//!
//! # Module Structure
//!
//! - [`config`]: engine-wide settings, gravity policy, per-match requests
//! - [`session`]: the synchronous match state machine
//! - [`runtime`]: the per-match task and its command queue
//! - [`link`]: pairing link with the first-finisher decision
//! - [`registry`]: handle allocation and live match lookup
//! - [`dispatch`]: action parsing, outcomes and routing
//! - [`event`]: events and the sink trait
//!
//! # Example
//!
//! ```
//! use tetromatch_engine::{Engine, EngineConfig, MatchConfig, MatchEvent};
//! use tetromatch_engine::types::MatchAction;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tetromatch_engine::EngineError> {
//! let (events_tx, mut events) = tokio::sync::mpsc::unbounded_channel::<MatchEvent>();
//! let engine = Engine::new(EngineConfig::default(), events_tx);
//!
//! let id = engine.create_match(MatchConfig::solo("lobby", "alice")).await?;
//! assert!(matches!(events.recv().await, Some(MatchEvent::Started { .. })));
//!
//! engine.submit(id, "alice", MatchAction::HardDrop).await?;
//! engine.submit(id, "alice", MatchAction::Forfeit).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
mod engine;
pub mod error;
pub mod event;
pub mod link;
pub mod registry;
pub mod runtime;
pub mod session;

pub use tetromatch_core as core;
pub use tetromatch_types as types;

pub use config::{EngineConfig, GravityPolicy, MatchConfig};
pub use dispatch::{parse_action, ActionOutcome, Dispatcher, IgnoreReason};
pub use engine::Engine;
pub use error::EngineError;
pub use event::{EventSink, MatchEvent};
pub use link::{PairingLink, Side};
pub use registry::{MatchHandle, MatchId, Registry};
pub use runtime::{Command, MatchTask};
pub use session::{Effects, Match};
