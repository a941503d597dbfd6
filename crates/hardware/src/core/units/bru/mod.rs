//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the branch direction predictors (always-not-taken,
//! bimodal, gshare, tournament) and the branch target buffer. The pipeline
//! talks to a single [`BranchUnit`] that composes a direction predictor with
//! the BTB; variants are selected by configuration and dispatched statically.

pub use self::direction::DirectionPredictor;

/// Bimodal (PC-indexed BHT) predictor.
pub mod bimodal;
/// Branch Target Buffer for indirect-branch targets.
pub mod btb;
/// Direction predictor trait.
pub mod direction;
/// Global-history (gshare) predictor.
pub mod gshare;
/// Always-not-taken predictor.
pub mod not_taken;
/// Tournament predictor (global + local + chooser).
pub mod tournament;

use self::{
    bimodal::BimodalPredictor, btb::Btb, gshare::GsharePredictor, not_taken::NotTakenPredictor,
    tournament::TournamentPredictor,
};
use crate::common::SimError;
use crate::config::{PipelineConfig, PredictorKind};

/// Maximum supported global history length in bits.
pub const MAX_HISTORY_BITS: usize = 16;

/// Enum wrapper for static dispatch of direction predictors.
/// This avoids vtable lookups in the critical fetch loop.
#[derive(Debug)]
pub enum DirectionDispatch {
    /// Always-not-taken.
    NotTaken(NotTakenPredictor),
    /// Bimodal BHT.
    Bimodal(BimodalPredictor),
    /// Gshare (PC XOR global history).
    Gshare(GsharePredictor),
    /// Tournament (global + local + chooser).
    Tournament(TournamentPredictor),
}

impl DirectionPredictor for DirectionDispatch {
    #[inline(always)]
    fn predict(&self, pc: u64) -> bool {
        match self {
            Self::NotTaken(p) => p.predict(pc),
            Self::Bimodal(p) => p.predict(pc),
            Self::Gshare(p) => p.predict(pc),
            Self::Tournament(p) => p.predict(pc),
        }
    }

    #[inline(always)]
    fn update(&mut self, pc: u64, taken: bool) {
        match self {
            Self::NotTaken(p) => p.update(pc, taken),
            Self::Bimodal(p) => p.update(pc, taken),
            Self::Gshare(p) => p.update(pc, taken),
            Self::Tournament(p) => p.update(pc, taken),
        }
    }
}

/// The branch prediction unit seen by the pipeline: one direction predictor
/// plus one branch target buffer, shared by all issue slots.
#[derive(Debug)]
pub struct BranchUnit {
    dir: DirectionDispatch,
    btb: Btb,
}

impl BranchUnit {
    /// Builds a branch unit from the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTableSize`] if the BHT or BTB size is not a
    /// power of two, and [`SimError::InvalidHistoryLength`] if the global
    /// history length exceeds [`MAX_HISTORY_BITS`].
    pub fn new(config: &PipelineConfig) -> Result<Self, SimError> {
        for size in [config.bht_size, config.btb_size] {
            if size == 0 || !size.is_power_of_two() {
                return Err(SimError::InvalidTableSize(size));
            }
        }
        if config.global_history_bits > MAX_HISTORY_BITS {
            return Err(SimError::InvalidHistoryLength(config.global_history_bits));
        }

        let dir = match config.branch_predictor {
            PredictorKind::NotTaken => DirectionDispatch::NotTaken(NotTakenPredictor),
            PredictorKind::Bimodal => {
                DirectionDispatch::Bimodal(BimodalPredictor::new(config.bht_size))
            }
            PredictorKind::Gshare => DirectionDispatch::Gshare(GsharePredictor::new(
                config.bht_size,
                config.global_history_bits,
            )),
            PredictorKind::Tournament => DirectionDispatch::Tournament(TournamentPredictor::new(
                config.bht_size,
                config.global_history_bits,
            )),
        };

        Ok(Self {
            dir,
            btb: Btb::new(config.btb_size),
        })
    }

    /// Predicts the direction of a conditional branch at `pc`.
    #[inline]
    pub fn predict_conditional(&self, pc: u64) -> bool {
        self.dir.predict(pc)
    }

    /// Predicts the target of a branch at `pc` from the BTB.
    ///
    /// A miss means the target is unknown; fetch then falls through to
    /// `pc + 4` and pays a flush at resolution if the branch was taken.
    #[inline]
    pub fn predict_target(&self, pc: u64) -> Option<u64> {
        self.btb.lookup(pc)
    }

    /// Trains the unit with a resolved conditional branch outcome.
    ///
    /// Updates the direction predictor (and its global history) and writes
    /// the BTB entry when the branch was taken.
    pub fn update_conditional(&mut self, pc: u64, taken: bool, target: u64) {
        self.dir.update(pc, taken);
        if taken {
            self.btb.update(pc, target);
        }
    }

    /// Records the target of a resolved unconditional (direct or indirect)
    /// branch. These are always taken; only the BTB learns.
    pub fn update_unconditional(&mut self, pc: u64, target: u64) {
        self.btb.update(pc, target);
    }
}

/// True iff a prediction and a resolution disagree in direction or target.
#[inline]
pub fn mispredicted(
    predicted_taken: bool,
    predicted_target: u64,
    actual_taken: bool,
    actual_target: u64,
) -> bool {
    predicted_taken != actual_taken || (actual_taken && predicted_target != actual_target)
}
