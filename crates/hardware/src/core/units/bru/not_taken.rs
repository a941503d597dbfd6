//! Always-not-taken predictor.
//!
//! The degenerate baseline: every conditional branch is predicted to fall
//! through, and training is a no-op. Useful for measuring how much the real
//! predictors buy.

use super::DirectionPredictor;

/// Stateless always-not-taken predictor.
#[derive(Debug, Default)]
pub struct NotTakenPredictor;

impl DirectionPredictor for NotTakenPredictor {
    fn predict(&self, _pc: u64) -> bool {
        false
    }

    fn update(&mut self, _pc: u64, _taken: bool) {}
}
