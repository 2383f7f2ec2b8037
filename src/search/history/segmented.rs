use super::tables::{CaptureHistory, ContinuationHistory, CorrectionHistory, PawnHistory, QuietHistory};
use super::{offset_slot, MoveHistory, CONT_OFFSETS};
use crate::board::Position;
use crate::search::params::HistoryWeights;
use crate::search::stack::SearchStack;
use cozy_chess::{BitBoard, Move};

/// One independent table per heuristic. Clearing drops and reallocates them,
/// which is cheaper than zeroing for fresh zero pages.
pub struct Segmented {
    weights: HistoryWeights,
    quiet: QuietHistory,
    capture: CaptureHistory,
    continuation: [ContinuationHistory; 3],
    pawn: PawnHistory,
    correction: CorrectionHistory,
}

impl Segmented {
    pub fn new(weights: HistoryWeights) -> Self {
        Self {
            weights,
            quiet: QuietHistory::new(),
            capture: CaptureHistory::new(),
            continuation: [ContinuationHistory::new(), ContinuationHistory::new(), ContinuationHistory::new()],
            pawn: PawnHistory::new(),
            correction: CorrectionHistory::new(),
        }
    }
}

impl MoveHistory for Segmented {
    fn weights(&self) -> &HistoryWeights { &self.weights }

    fn quiet_score(&self, pos: &Position, mv: Move, threats: BitBoard) -> i32 {
        self.quiet.get(pos, mv, threats)
    }

    fn capture_score(&self, pos: &Position, mv: Move) -> i32 {
        self.capture.get(pos, mv)
    }

    fn continuation_score(&self, _pos: &Position, mv: Move, stack: &SearchStack, offset: usize) -> i32 {
        offset_slot(offset).map_or(0, |slot| self.continuation[slot].get(mv, stack, offset))
    }

    fn pawn_score(&self, pos: &Position, mv: Move) -> i32 {
        self.pawn.get(pos, mv)
    }

    fn correction(&self, pos: &Position) -> i32 {
        self.correction.get(pos)
    }

    fn update_quiet(&mut self, pos: &Position, mv: Move, threats: BitBoard, bonus: i32) {
        self.quiet.update(pos, mv, threats, bonus);
    }

    fn update_capture(&mut self, pos: &Position, mv: Move, bonus: i32) {
        self.capture.update(pos, mv, bonus);
    }

    fn update_continuation(&mut self, _pos: &Position, mv: Move, stack: &SearchStack, bonus: i32) {
        for (table, &offset) in self.continuation.iter_mut().zip(CONT_OFFSETS.iter()) {
            table.update(mv, stack, offset, bonus);
        }
    }

    fn update_pawn(&mut self, pos: &Position, mv: Move, bonus: i32) {
        self.pawn.update(pos, mv, bonus);
    }

    fn update_correction(&mut self, pos: &Position, bonus: i32) {
        self.correction.update(pos, bonus);
    }

    fn clear(&mut self) {
        *self = Self::new(self.weights);
    }
}
