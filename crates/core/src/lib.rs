//! Core game logic - pure, deterministic, and testable
//!
//! Everything a single playfield needs: the grid, piece geometry, the seeded piece and
//! garbage generators, scoring, and render snapshots. No timers, no I/O; the same seed
//! and the same sequence of calls always produce the same board.
//!
//! # Module Structure
//!
//! - [`board`]: 10x22 grid (20 visible rows plus a 2-row spawn buffer), line clears, garbage
//! - [`pieces`]: Tetromino shape tables and clockwise SRS rotation with wall kicks
//! - [`playfield`]: Active piece, hold slot, next queue and score for one player
//! - [`rng`]: 7-bag piece generation and garbage hole selection
//! - [`scoring`]: Line clear and drop points, level and gravity curve
//! - [`snapshot`]: Copyable view of a playfield for renderers and subscribers
//!
//! # Example
//!
//! ```
//! use tetromatch_core::{DropSource, Playfield};
//! use tetromatch_core::types::Direction;
//!
//! let mut field = Playfield::new(12345);
//! field.spawn_next().unwrap();
//!
//! field.try_move(Direction::Right);
//! field.try_rotate();
//! field.soft_drop(DropSource::Player);
//! let summary = field.hard_drop();
//!
//! assert!(!summary.topped_out);
//! assert!(field.score() > 0);
//! ```

pub mod board;
pub mod pieces;
pub mod playfield;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tetromatch_types as types;

pub use board::Board;
pub use pieces::{get_shape, try_rotate};
pub use playfield::{
    DropSource, GarbageReport, HoldOutcome, LockSummary, Playfield, Tetromino, TopOut,
};
pub use rng::{HoleGenerator, PieceQueue, SimpleRng};
pub use scoring::{calculate_drop_score, calculate_level, calculate_line_score};
pub use snapshot::{ActiveSnapshot, BoardSnapshot, Grid};
