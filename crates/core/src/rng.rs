//! RNG module - 7-bag piece generation and garbage hole selection
//!
//! Each bag holds one of each piece (I, O, T, S, Z, J, L), shuffled with a seeded LCG,
//! and is drawn empty before the next bag is shuffled. The same LCG picks garbage hole
//! columns so a match is fully repeatable from its seed.

use crate::types::{PieceKind, BOARD_WIDTH, NEXT_QUEUE_LEN};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero seed would stay zero forever.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        (self.next_u32() >> 16) % max.max(1)
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Picks the open column of each injected garbage row
#[derive(Debug, Clone)]
pub struct HoleGenerator {
    rng: SimpleRng,
}

impl HoleGenerator {
    pub fn new(seed: u32) -> Self {
        // Decorrelate from the piece bag seeded with the same value.
        Self {
            rng: SimpleRng::new(seed ^ 0x9e37_79b9),
        }
    }

    pub fn next_hole(&mut self) -> u8 {
        self.rng.next_range(BOARD_WIDTH as u32) as u8
    }

    /// One hole per row, in injection order
    pub fn holes(&mut self, rows: usize) -> Vec<u8> {
        (0..rows).map(|_| self.next_hole()).collect()
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceQueue {
    bag: [PieceKind; 7],
    bag_index: usize,
    rng: SimpleRng,
}

impl PieceQueue {
    pub fn new(seed: u32) -> Self {
        let mut queue = Self {
            bag: PieceKind::ALL,
            bag_index: 0,
            rng: SimpleRng::new(seed),
        };
        queue.refill_bag();
        queue
    }

    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// The bag that the next refill will produce, computed on a copy of the RNG
    fn preview_bag(&self) -> [PieceKind; 7] {
        let mut preview_rng = self.rng.clone();
        let mut next_bag = PieceKind::ALL;
        preview_rng.shuffle(&mut next_bag);
        next_bag
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> PieceKind {
        self.peek_queue()[0]
    }

    /// The next `NEXT_QUEUE_LEN` pieces, in draw order. Never allocates.
    pub fn peek_queue(&self) -> [PieceKind; NEXT_QUEUE_LEN] {
        let mut out = [PieceKind::I; NEXT_QUEUE_LEN];
        let remaining = &self.bag[self.bag_index.min(7)..];
        let next_bag = self.preview_bag();

        for (slot, kind) in out
            .iter_mut()
            .zip(remaining.iter().chain(next_bag.iter()))
        {
            *slot = *kind;
        }
        out
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        if self.bag_index >= 7 {
            self.refill_bag();
        }

        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }

    /// Pieces left in the current bag
    pub fn remaining_in_bag(&self) -> &[PieceKind] {
        &self.bag[self.bag_index.min(7)..]
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_piece_queue_draws_all_seven_per_bag() {
        let mut queue = PieceQueue::new(7);

        for _ in 0..3 {
            let mut drawn: Vec<PieceKind> = (0..7).map(|_| queue.draw()).collect();
            drawn.sort_by_key(|k| k.color_id());
            assert_eq!(drawn, PieceKind::ALL.to_vec());
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PieceQueue::new(99);
        let mut b = PieceQueue::new(99);
        for _ in 0..30 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_peek_queue_matches_draws_across_bag_boundary() {
        let mut queue = PieceQueue::new(3);
        for _ in 0..5 {
            queue.draw();
        }

        let preview = queue.peek_queue();
        let drawn: Vec<PieceKind> = (0..NEXT_QUEUE_LEN).map(|_| queue.draw()).collect();
        assert_eq!(preview.to_vec(), drawn);
    }

    #[test]
    fn test_peek_after_full_bag() {
        let mut queue = PieceQueue::new(1);
        for _ in 0..7 {
            queue.draw();
        }
        assert!(queue.remaining_in_bag().is_empty());

        let peeked = queue.peek();
        assert_eq!(queue.draw(), peeked);
    }

    #[test]
    fn test_holes_in_range_and_repeatable() {
        let mut a = HoleGenerator::new(42);
        let mut b = HoleGenerator::new(42);
        let holes = a.holes(50);
        assert!(holes.iter().all(|&h| h < BOARD_WIDTH));
        assert_eq!(holes, b.holes(50));
    }
}
