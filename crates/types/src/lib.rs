//! Core types module - shared data structures and constants
//!
//! This crate defines the vocabulary shared by the playfield, the match engine and the
//! wire adapter. Everything here is plain data: no timers, no channels, no I/O.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Visible height**: 20 rows
//! - **Buffer**: 2 hidden rows above the visible area where pieces spawn
//! - **Total height**: 22 rows, row 0 is the top of the hidden buffer
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_GRAVITY_MS` | 1000 | Gravity tick interval for a fresh match |
//! | `PAIRED_START_DELAY_MS` | 5000 | Start delay for both sides of a paired match |
//! | `DROP_INTERVALS` | 1000..160 | Per-level intervals for the leveled gravity policy |
//!
//! # Examples
//!
//! ```
//! use tetromatch_types::{MatchAction, PieceKind, Rotation, BOARD_WIDTH, VISIBLE_HEIGHT};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
//! assert_eq!(MatchAction::from_str("stop"), Some(MatchAction::Forfeit));
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(VISIBLE_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Rows the players see (20 rows)
pub const VISIBLE_HEIGHT: u8 = 20;

/// Hidden rows above the visible area
pub const BUFFER_ROWS: u8 = 2;

/// Total rows stored by the board
pub const BOARD_HEIGHT: u8 = VISIBLE_HEIGHT + BUFFER_ROWS;

/// Number of upcoming pieces exposed in the preview
pub const NEXT_QUEUE_LEN: usize = 5;

/// Gravity interval for a fresh match (1 row per second)
pub const DEFAULT_GRAVITY_MS: u32 = 1000;

/// Start delay used by paired matches so both sides begin together
pub const PAIRED_START_DELAY_MS: u32 = 5000;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 0, Index 8 = Level 8
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Interval used past the end of `DROP_INTERVALS`
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Line clear scoring table
///
/// Base points per lock for clearing N lines:
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points
///
/// A four-line clear is worth more than four single clears (1200 > 160).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Points per row for a player-initiated soft drop
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per row for a hard drop
pub const HARD_DROP_POINTS: u32 = 2;


/// The seven tetromino piece kinds
///
/// - **I**: horizontal bar
/// - **O**: 2x2 square
/// - **T**: T-shaped
/// - **S** / **Z**: mirrored skew pieces
/// - **J** / **L**: mirrored hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in canonical bag order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// ```
    /// use tetromatch_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("I"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Color id used in snapshots (1-7, 0 is reserved for empty)
    pub fn color_id(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }
}

/// Rotation states, clockwise from the spawn orientation
///
/// North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use tetromatch_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotation index 0-3 (North = 0)
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// A cell on the board
///
/// Garbage cells render differently but collide exactly like blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Block(PieceKind),
    Garbage,
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        !matches!(self, Cell::Empty)
    }

    /// Compact code for snapshots: 0 empty, 1-7 piece color, 8 garbage
    pub fn code(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Block(kind) => kind.color_id(),
            Cell::Garbage => 8,
        }
    }
}

/// Horizontal shift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn dx(&self) -> i8 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// Player input accepted by a match
///
/// One variant per control on the external surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchAction {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Hold,
    Forfeit,
}

impl MatchAction {
    pub const ALL: [MatchAction; 7] = [
        MatchAction::MoveLeft,
        MatchAction::MoveRight,
        MatchAction::Rotate,
        MatchAction::SoftDrop,
        MatchAction::HardDrop,
        MatchAction::Hold,
        MatchAction::Forfeit,
    ];

    /// Parse an action id (case-insensitive)
    ///
    /// Accepts the kebab-case ids, the `drop`/`stop` aliases and the `btn_` prefixed
    /// button ids used by chat control surfaces.
    ///
    /// ```
    /// use tetromatch_types::MatchAction;
    ///
    /// assert_eq!(MatchAction::from_str("move-left"), Some(MatchAction::MoveLeft));
    /// assert_eq!(MatchAction::from_str("btn_rotate"), Some(MatchAction::Rotate));
    /// assert_eq!(MatchAction::from_str("warp"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lowered = s.trim().to_lowercase();
        let id = lowered.strip_prefix("btn_").unwrap_or(&lowered);
        match id {
            "move-left" | "left" => Some(MatchAction::MoveLeft),
            "move-right" | "right" => Some(MatchAction::MoveRight),
            "rotate" => Some(MatchAction::Rotate),
            "soft-drop" | "drop" | "down" => Some(MatchAction::SoftDrop),
            "hard-drop" => Some(MatchAction::HardDrop),
            "hold" => Some(MatchAction::Hold),
            "forfeit" | "stop" => Some(MatchAction::Forfeit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAction::MoveLeft => "move-left",
            MatchAction::MoveRight => "move-right",
            MatchAction::Rotate => "rotate",
            MatchAction::SoftDrop => "soft-drop",
            MatchAction::HardDrop => "hard-drop",
            MatchAction::Hold => "hold",
            MatchAction::Forfeit => "forfeit",
        }
    }
}

/// Who may drive a match
///
/// - **Solo**: only the owning player
/// - **Open**: anyone in the channel
/// - **Paired**: only the owning player, coupled to an opponent match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Solo,
    Open,
    Paired,
}

impl MatchMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "solo" | "1p" => Some(MatchMode::Solo),
            "open" => Some(MatchMode::Open),
            "paired" | "2p" => Some(MatchMode::Paired),
            _ => None,
        }
    }
}

/// Lifecycle status of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    PendingStart,
    Active,
    Ended,
}

/// Why a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationReason {
    TopOut,
    Forfeit,
    OpponentFinished,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::TopOut => "top-out",
            TerminationReason::Forfeit => "forfeit",
            TerminationReason::OpponentFinished => "opponent-finished",
        }
    }
}
