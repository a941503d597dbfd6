//! Bimodal branch predictor.
//!
//! One 2-bit saturating counter per BHT entry, indexed directly by the PC.
//! Captures per-branch bias (loops, error paths) with no history state.

use super::direction::{DirectionPredictor, train_counter};

/// Bimodal predictor: a PC-indexed table of 2-bit counters.
#[derive(Debug)]
pub struct BimodalPredictor {
    bht: Vec<u8>,
    mask: usize,
}

impl BimodalPredictor {
    /// Creates a bimodal predictor with `size` counters, all weakly
    /// not-taken. `size` must be a power of two.
    pub fn new(size: usize) -> Self {
        Self {
            bht: vec![1; size],
            mask: size - 1,
        }
    }

    fn index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & self.mask
    }
}

impl DirectionPredictor for BimodalPredictor {
    /// Taken when the counter is in one of the two taken states (2 or 3).
    fn predict(&self, pc: u64) -> bool {
        self.bht[self.index(pc)] >= 2
    }

    fn update(&mut self, pc: u64, taken: bool) {
        let idx = self.index(pc);
        train_counter(&mut self.bht[idx], taken);
    }
}
