//! Adapter module - external control of the match engine over TCP
//!
//! Lets a chat bot, a test harness or any other control surface create matches, submit
//! player actions and stream match events through a **line-delimited JSON protocol**.
//! The adapter holds no game rules; everything is forwarded to the [`Engine`](engine::Engine).
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **create**: start a solo or open match
//! - **create_pair**: start two matches coupled for head-to-head play
//! - **action**: submit a player action (`move-left`, `rotate`, `hard-drop`, ...)
//! - **subscribe**: receive match events on this connection
//!
//! ## Server → Client
//!
//! - **created**: handles of the new match(es)
//! - **ack**: request handled; for actions, how the action resolved
//! - **error**: `invalid_message`, `invalid_action`, `unknown_match` or `invalid_config`
//! - **event**: a match event (subscribers only)
//!
//! # Environment Variables
//!
//! - `TETROMATCH_HOST`: Bind address (default: "127.0.0.1")
//! - `TETROMATCH_PORT`: Port number (default: 7878)
//! - `TETROMATCH_GRAVITY_MS`: Gravity interval in ms, or `leveled` (default: 1000)
//! - `TETROMATCH_SEED`: Fixed base seed for piece sequences
//! - `TETROMATCH_LOG_DIR`: Also write logs to a file in this directory
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"subscribe","seq":1}
//! Server -> Client: {"type":"ack","seq":1,"status":"ok"}
//! Client -> Server: {"type":"create","seq":2,"channel":"lobby","player":"alice","mode":"solo"}
//! Server -> Client: {"type":"created","seq":2,"matches":[1]}
//! Server -> Client: {"type":"event","event":{"kind":"started","id":1,"player":"alice"}}
//! Client -> Server: {"type":"action","seq":3,"match":1,"player":"alice","action":"hard-drop"}
//! Server -> Client: {"type":"ack","seq":3,"status":"ok","outcome":"applied"}
//! ```

pub mod protocol;
pub mod server;

pub use tetromatch_engine as engine;
pub use tetromatch_types as types;

pub use protocol::*;
pub use server::{run_server, ServerConfig};
