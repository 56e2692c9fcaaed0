use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pieces::get_shape;
use crate::playfield::Tetromino;
use crate::types::{
    PieceKind, Rotation, BOARD_WIDTH, BUFFER_ROWS, NEXT_QUEUE_LEN, VISIBLE_HEIGHT,
};

/// Visible grid, row 0 is the top visible row
pub type Grid = [[u8; BOARD_WIDTH as usize]; VISIBLE_HEIGHT as usize];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

/// Everything a renderer needs to draw one playfield
///
/// `board` holds locked cells only; [`BoardSnapshot::composite`] overlays the falling
/// piece. Cell codes: 0 empty, 1-7 piece color, 8 garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Grid,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub next_queue: [PieceKind; NEXT_QUEUE_LEN],
    pub piece_id: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

impl BoardSnapshot {
    /// Locked cells with the active piece drawn on top (buffer rows are cut off)
    pub fn composite(&self) -> Grid {
        let mut grid = self.board;
        if let Some(active) = self.active {
            for (dx, dy) in get_shape(active.kind, active.rotation) {
                let x = active.x + dx;
                let y = active.y + dy - BUFFER_ROWS as i8;
                if (0..BOARD_WIDTH as i8).contains(&x) && (0..VISIBLE_HEIGHT as i8).contains(&y) {
                    grid[y as usize][x as usize] = active.kind.color_id();
                }
            }
        }
        grid
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; BOARD_WIDTH as usize]; VISIBLE_HEIGHT as usize],
            active: None,
            ghost_y: None,
            hold: None,
            can_hold: true,
            next_queue: [PieceKind::I; NEXT_QUEUE_LEN],
            piece_id: 0,
            score: 0,
            lines: 0,
            level: 0,
        }
    }
}

fn glyph(code: u8) -> char {
    match code {
        0 => '.',
        8 => '#',
        1 => 'I',
        2 => 'O',
        3 => 'T',
        4 => 'S',
        5 => 'Z',
        6 => 'J',
        _ => 'L',
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.composite() {
            let line: String = row.iter().map(|&c| glyph(c)).collect();
            writeln!(f, "{}", line)?;
        }
        write!(f, "score {} lines {}", self.score, self.lines)
    }
}
