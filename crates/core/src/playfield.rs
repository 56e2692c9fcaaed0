//! Playfield module - one player's board plus the pieces in play
//!
//! Ties together the grid, the 7-bag queue, the hold slot and the score. Every operation
//! is synchronous and deterministic for a given seed; timing lives in the match engine.

use std::fmt;

use crate::pieces::{get_shape, try_rotate, PieceShape, SPAWN_POSITION};
use crate::rng::{HoleGenerator, PieceQueue};
use crate::scoring::{calculate_drop_score, calculate_level, calculate_line_score};
use crate::snapshot::{ActiveSnapshot, BoardSnapshot};
use crate::types::{Direction, PieceKind, Rotation, BOARD_HEIGHT, NEXT_QUEUE_LEN};
use crate::Board;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at the spawn anchor
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_POSITION.0,
            y: SPAWN_POSITION.1,
        }
    }

    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    pub fn fits(&self, board: &Board) -> bool {
        board.fits(&self.shape(), self.x, self.y)
    }

    fn shifted(self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// A new piece could not be placed: the match is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopOut;

impl fmt::Display for TopOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spawn position is blocked")
    }
}

impl std::error::Error for TopOut {}

/// Who moved the piece down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSource {
    Gravity,
    Player,
}

/// Result of committing a piece to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockSummary {
    pub lines_cleared: u32,
    /// Line clear points plus any hard drop points earned on the way down
    pub points: u32,
    /// The next piece could not spawn
    pub topped_out: bool,
}

/// Result of pushing garbage rows in from the bottom
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GarbageReport {
    /// Hole column of each injected row, the last one ends up at the bottom
    pub holes: Vec<u8>,
    /// Filled cells were pushed off the top of the buffer
    pub overflowed: bool,
    /// Rows the active piece moved up to clear the raised stack
    pub lifted: u8,
}

/// Result of a hold request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    Swapped,
    /// Already held since the last lock, nothing changed
    Unavailable,
    ToppedOut,
}

#[derive(Debug, Clone)]
pub struct Playfield {
    board: Board,
    active: Option<Tetromino>,
    hold: Option<PieceKind>,
    can_hold: bool,
    next_queue: [PieceKind; NEXT_QUEUE_LEN],
    piece_queue: PieceQueue,
    holes: HoleGenerator,
    /// Monotonic id of spawned pieces
    piece_id: u32,
    score: u32,
    lines: u32,
}

impl Playfield {
    pub fn new(seed: u32) -> Self {
        let piece_queue = PieceQueue::new(seed);
        let next_queue = piece_queue.peek_queue();

        Self {
            board: Board::new(),
            active: None,
            hold: None,
            can_hold: true,
            next_queue,
            piece_queue,
            holes: HoleGenerator::new(seed),
            piece_id: 0,
            score: 0,
            lines: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct grid access for scripted setups
    #[cfg(any(test, feature = "test-support"))]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Replace the active piece, keeping the old one if `piece` does not fit
    #[cfg(any(test, feature = "test-support"))]
    pub fn place_active(&mut self, piece: Tetromino) -> bool {
        if !piece.fits(&self.board) {
            return false;
        }
        self.active = Some(piece);
        true
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn next_queue(&self) -> &[PieceKind; NEXT_QUEUE_LEN] {
        &self.next_queue
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        calculate_level(self.lines)
    }

    /// Place `kind` at the spawn anchor in its canonical rotation
    pub fn spawn(&mut self, kind: PieceKind) -> Result<(), TopOut> {
        let piece = Tetromino::new(kind);
        if !piece.fits(&self.board) {
            self.active = None;
            return Err(TopOut);
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        Ok(())
    }

    /// Draw the next kind from the bag and spawn it
    pub fn spawn_next(&mut self) -> Result<(), TopOut> {
        let kind = self.piece_queue.draw();
        self.next_queue = self.piece_queue.peek_queue();
        self.spawn(kind)
    }

    /// Shift one column; blocked or missing piece is a no-op
    pub fn try_move(&mut self, direction: Direction) -> bool {
        self.try_shift(direction.dx(), 0)
    }

    fn try_shift(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let moved = active.shifted(dx, dy);
        if moved.fits(&self.board) {
            self.active = Some(moved);
            return true;
        }
        false
    }

    /// Rotate clockwise, trying wall kicks in table order
    pub fn try_rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        if active.kind == PieceKind::O {
            return false;
        }

        let result = try_rotate(active.kind, active.rotation, active.x, active.y, |x, y| {
            self.board.is_valid(x, y)
        });

        match result {
            Some((rotation, (dx, dy))) => {
                self.active = Some(Tetromino {
                    rotation,
                    ..active.shifted(dx, dy)
                });
                true
            }
            None => false,
        }
    }

    /// Move down one row. Player drops earn soft drop points.
    pub fn soft_drop(&mut self, source: DropSource) -> bool {
        let moved = self.try_shift(0, 1);
        if moved && source == DropSource::Player {
            self.add_points(calculate_drop_score(1, false));
        }
        moved
    }

    /// Rows the active piece can fall before it is blocked
    pub fn drop_distance(&self) -> u32 {
        let Some(active) = self.active else {
            return 0;
        };

        let mut distance = 0u32;
        while active
            .shifted(0, distance as i8 + 1)
            .fits(&self.board)
        {
            distance += 1;
        }
        distance
    }

    /// Where the active piece would land
    pub fn ghost_y(&self) -> Option<i8> {
        self.active.map(|a| a.y + self.drop_distance() as i8)
    }

    /// Drop to the floor and lock immediately
    pub fn hard_drop(&mut self) -> LockSummary {
        let distance = self.drop_distance();
        if let Some(active) = self.active {
            self.active = Some(active.shifted(0, distance as i8));
        }

        let drop_points = calculate_drop_score(distance, true);
        self.add_points(drop_points);

        let mut summary = self.lock();
        summary.points = summary.points.saturating_add(drop_points);
        summary
    }

    /// Commit the active piece, clear full rows, then spawn the next piece.
    ///
    /// Only the spawn can top out. A piece still buried in the stack (no room left above
    /// it after garbage) is discarded and play moves on to the next piece.
    pub fn lock(&mut self) -> LockSummary {
        let Some(active) = self.active.take() else {
            return LockSummary::default();
        };

        if !self
            .board
            .lock_piece(&active.shape(), active.x, active.y, active.kind)
        {
            self.can_hold = true;
            return LockSummary {
                topped_out: self.spawn_next().is_err(),
                ..LockSummary::default()
            };
        }

        let cleared = self.board.clear_full_rows().len();
        let points = calculate_line_score(cleared);
        self.lines += cleared as u32;
        self.add_points(points);
        self.can_hold = true;

        let topped_out = self.spawn_next().is_err();

        LockSummary {
            lines_cleared: cleared as u32,
            points,
            topped_out,
        }
    }

    /// Swap the active piece with the hold slot, once per piece
    pub fn hold(&mut self) -> HoldOutcome {
        if !self.can_hold {
            return HoldOutcome::Unavailable;
        }
        let Some(active) = self.active else {
            return HoldOutcome::Unavailable;
        };

        let spawned = match self.hold.replace(active.kind) {
            Some(held) => self.spawn(held),
            None => self.spawn_next(),
        };
        self.can_hold = false;

        match spawned {
            Ok(()) => HoldOutcome::Swapped,
            Err(TopOut) => HoldOutcome::ToppedOut,
        }
    }

    /// Push `rows` garbage rows in from the bottom.
    ///
    /// Injection never ends the game. An active piece the new rows push into is moved up
    /// until it fits again; if nothing above fits it stays put and the overlap is settled
    /// at lock.
    pub fn inject_garbage(&mut self, rows: u32) -> GarbageReport {
        let holes = self.holes.holes(rows as usize);
        let overflowed = self.board.inject_garbage(&holes);
        let lifted = self.lift_active();

        GarbageReport {
            holes,
            overflowed,
            lifted,
        }
    }

    /// Raise an overlapping active piece to the nearest row where it fits
    fn lift_active(&mut self) -> u8 {
        let Some(active) = self.active else {
            return 0;
        };
        if active.fits(&self.board) {
            return 0;
        }

        for lift in 1..=BOARD_HEIGHT as i8 {
            let raised = active.shifted(0, -lift);
            if raised.fits(&self.board) {
                self.active = Some(raised);
                return lift as u8;
            }
        }
        0
    }

    fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        self.board.write_u8_grid(&mut out.board);
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost_y();
        out.hold = self.hold;
        out.can_hold = self.can_hold;
        out.next_queue = self.next_queue;
        out.piece_id = self.piece_id;
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level();
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(1)
    }
}
