//! Board module - manages the game grid
//!
//! The board is a 10x22 grid: 20 visible rows plus a 2-row hidden buffer on top where
//! pieces spawn. Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..21 (top to bottom).
//! Rows 0 and 1 are the hidden buffer.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, BUFFER_ROWS, VISIBLE_HEIGHT};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// Rows removed by a single clear, bottom to top
pub type ClearedRows = ArrayVec<usize, HEIGHT>;

/// The game board - 10 columns x 22 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    /// Total rows including the hidden buffer
    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Rows shown to players
    pub fn visible_height(&self) -> u8 {
        VISIBLE_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Within bounds and empty
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Cell::Empty))
    }

    /// Within bounds and filled (blocks and garbage alike)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(cell) if cell.is_filled())
    }

    /// Whether every mino of `shape` anchored at (x, y) lands on an empty in-bounds cell
    pub fn fits(&self, shape: &[(i8, i8)], x: i8, y: i8) -> bool {
        shape
            .iter()
            .all(|&(dx, dy)| self.is_valid(x + dx, y + dy))
    }

    fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * WIDTH..(y + 1) * WIDTH]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_filled())
    }

    /// Check if a row has no filled cell
    pub fn is_row_empty(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return true;
        }
        self.row(y).iter().all(|cell| !cell.is_filled())
    }

    /// Number of rows holding at least one filled cell
    pub fn occupied_rows(&self) -> usize {
        (0..HEIGHT).filter(|&y| !self.is_row_empty(y)).count()
    }

    /// Clear all full rows at once and return their indices (bottom to top).
    ///
    /// Two-pointer compaction: every surviving row is copied straight to its final slot,
    /// so indices never shift mid-scan.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let mut write_y = HEIGHT;

        for read_y in (0..HEIGHT).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * WIDTH;
                    self.cells
                        .copy_within(src_start..src_start + WIDTH, write_y * WIDTH);
                }
            }
        }

        for cell in &mut self.cells[..write_y * WIDTH] {
            *cell = Cell::Empty;
        }

        cleared_rows
    }

    /// Push one garbage row per entry of `holes` in at the bottom.
    ///
    /// Each row is all garbage except the hole column. Existing rows move up and the top
    /// row is discarded. Returns true if any filled cell fell off the top.
    pub fn inject_garbage(&mut self, holes: &[u8]) -> bool {
        let mut overflowed = false;
        for &hole in holes {
            overflowed |= !self.is_row_empty(0);
            self.cells.copy_within(WIDTH.., 0);

            let bottom = (HEIGHT - 1) * WIDTH;
            for (x, cell) in self.cells[bottom..].iter_mut().enumerate() {
                *cell = if x == hole as usize % WIDTH {
                    Cell::Empty
                } else {
                    Cell::Garbage
                };
            }
        }
        overflowed
    }

    /// Lock a piece onto the board at given position with given shape
    /// Returns false (leaving the board untouched) if any cell is out of bounds or occupied
    pub fn lock_piece(&mut self, shape: &[(i8, i8)], x: i8, y: i8, kind: PieceKind) -> bool {
        if !self.fits(shape, x, y) {
            return false;
        }

        for &(dx, dy) in shape {
            self.set(x + dx, y + dy, Cell::Block(kind));
        }

        true
    }

    /// Whether any filled cell sits in the hidden buffer
    pub fn buffer_occupied(&self) -> bool {
        (0..BUFFER_ROWS as usize).any(|y| !self.is_row_empty(y))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write the visible rows as snapshot codes (see [`Cell::code`])
    pub fn write_u8_grid(&self, out: &mut [[u8; WIDTH]; VISIBLE_HEIGHT as usize]) {
        for (row_out, y) in out.iter_mut().zip(BUFFER_ROWS as usize..HEIGHT) {
            for (code, cell) in row_out.iter_mut().zip(self.row(y)) {
                *code = cell.code();
            }
        }
    }

    /// Create from a 2D vector for testing (rows top to bottom, all 22 of them)
    #[cfg(any(test, feature = "test-support"))]
    pub fn from_cells(cells_2d: Vec<Vec<Cell>>) -> Self {
        assert_eq!(cells_2d.len(), HEIGHT);
        assert!(cells_2d.iter().all(|row| row.len() == WIDTH));

        let mut board = Self::new();
        for (y, row) in cells_2d.iter().enumerate() {
            board.cells[y * WIDTH..(y + 1) * WIDTH].copy_from_slice(row);
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i8, skip: Option<i8>) {
        for x in 0..BOARD_WIDTH as i8 {
            if Some(x) != skip {
                board.set(x, y, Cell::Block(PieceKind::I));
            }
        }
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 21), Some(219));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 22), None);
    }

    #[test]
    fn test_garbage_blocks_like_a_piece() {
        let mut board = Board::new();
        board.set(4, 10, Cell::Garbage);
        assert!(board.is_occupied(4, 10));
        assert!(!board.is_valid(4, 10));
    }

    #[test]
    fn test_clear_full_rows_no_full_rows_is_noop() {
        let mut board = Board::new();
        fill_row(&mut board, 21, Some(3));
        board.set(0, 15, Cell::Garbage);
        let before = board.clone();

        let cleared = board.clear_full_rows();

        assert!(cleared.is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_full_rows_non_adjacent() {
        let mut board = Board::new();
        fill_row(&mut board, 21, None);
        fill_row(&mut board, 20, Some(0));
        fill_row(&mut board, 19, None);
        board.set(5, 18, Cell::Block(PieceKind::T));

        let cleared = board.clear_full_rows();

        assert_eq!(cleared.as_slice(), &[21, 19]);
        // Partial row settles to the bottom, marker follows it down by two rows.
        assert_eq!(board.get(0, 21), Some(Cell::Empty));
        assert_eq!(board.get(1, 21), Some(Cell::Block(PieceKind::I)));
        assert_eq!(board.get(5, 20), Some(Cell::Block(PieceKind::T)));
        assert_eq!(board.occupied_rows(), 2);
    }

    #[test]
    fn test_inject_garbage_pushes_rows_up() {
        let mut board = Board::new();
        board.set(2, 21, Cell::Block(PieceKind::S));

        let overflowed = board.inject_garbage(&[7, 1]);

        assert!(!overflowed);
        assert_eq!(board.get(2, 19), Some(Cell::Block(PieceKind::S)));
        assert_eq!(board.get(7, 20), Some(Cell::Empty));
        assert_eq!(board.get(1, 21), Some(Cell::Empty));
        assert_eq!(board.get(0, 21), Some(Cell::Garbage));
        assert_eq!(board.occupied_rows(), 3);
    }

    #[test]
    fn test_inject_garbage_discards_top_row() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Block(PieceKind::O));
        assert!(board.inject_garbage(&[0]));
        assert!(board.is_row_empty(0));
    }

    #[test]
    fn test_write_u8_grid_skips_buffer() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Block(PieceKind::I));
        board.set(3, 2, Cell::Block(PieceKind::L));
        board.set(9, 21, Cell::Garbage);

        let mut grid = [[0u8; WIDTH]; VISIBLE_HEIGHT as usize];
        board.write_u8_grid(&mut grid);

        assert_eq!(grid[0][3], PieceKind::L.color_id());
        assert_eq!(grid[19][9], 8);
        assert_eq!(grid.iter().flatten().filter(|&&c| c != 0).count(), 2);
    }
}
