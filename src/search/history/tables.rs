//! Stand-alone tables used by the segmented layout, one heap block each.

use super::{
    apply_clamped, apply_gravity, capture_index, continuation_index, correction_index, pawn_index,
    quiet_index, CAPTURE_LEN, CONT_LEN, CORRECTION_SIZE, PAWN_LEN, QUIET_LEN,
};
use crate::board::Position;
use crate::search::stack::SearchStack;
use cozy_chess::{BitBoard, Move};

fn zeroed(len: usize) -> Box<[i16]> {
    vec![0i16; len].into_boxed_slice()
}

/// `[color][from][to][from threatened][to threatened]`
pub struct QuietHistory {
    table: Box<[i16]>,
}

impl QuietHistory {
    pub fn new() -> Self { Self { table: zeroed(QUIET_LEN) } }

    pub fn get(&self, pos: &Position, mv: Move, threats: BitBoard) -> i32 {
        self.table[quiet_index(pos.side_to_move(), mv, threats)] as i32
    }

    pub fn update(&mut self, pos: &Position, mv: Move, threats: BitBoard, bonus: i32) {
        apply_gravity(&mut self.table[quiet_index(pos.side_to_move(), mv, threats)], bonus);
    }
}

/// `[color][attacker][to][victim]`
pub struct CaptureHistory {
    table: Box<[i16]>,
}

impl CaptureHistory {
    pub fn new() -> Self { Self { table: zeroed(CAPTURE_LEN) } }

    pub fn get(&self, pos: &Position, mv: Move) -> i32 {
        capture_index(pos, mv).map_or(0, |i| self.table[i] as i32)
    }

    pub fn update(&mut self, pos: &Position, mv: Move, bonus: i32) {
        if let Some(i) = capture_index(pos, mv) {
            apply_gravity(&mut self.table[i], bonus);
        }
    }
}

/// `[previous piece][previous to][to]` for one lookback distance.
pub struct ContinuationHistory {
    table: Box<[i16]>,
}

impl ContinuationHistory {
    pub fn new() -> Self { Self { table: zeroed(CONT_LEN) } }

    pub fn get(&self, mv: Move, stack: &SearchStack, offset: usize) -> i32 {
        continuation_index(stack, offset, mv.to).map_or(0, |i| self.table[i] as i32)
    }

    pub fn update(&mut self, mv: Move, stack: &SearchStack, offset: usize, bonus: i32) {
        if let Some(i) = continuation_index(stack, offset, mv.to) {
            apply_gravity(&mut self.table[i], bonus);
        }
    }
}

/// `[color][pawn key bucket][to]`
pub struct PawnHistory {
    table: Box<[i16]>,
}

impl PawnHistory {
    pub fn new() -> Self { Self { table: zeroed(PAWN_LEN) } }

    pub fn get(&self, pos: &Position, mv: Move) -> i32 {
        self.table[pawn_index(pos, mv.to)] as i32
    }

    pub fn update(&mut self, pos: &Position, mv: Move, bonus: i32) {
        apply_gravity(&mut self.table[pawn_index(pos, mv.to)], bonus);
    }
}

/// `[color][pawn key bucket]`, hard-clamped rather than gravity-damped.
pub struct CorrectionHistory {
    table: Box<[i16]>,
}

impl CorrectionHistory {
    pub fn new() -> Self { Self { table: zeroed(2 * CORRECTION_SIZE) } }

    pub fn get(&self, pos: &Position) -> i32 {
        self.table[correction_index(pos)] as i32
    }

    pub fn update(&mut self, pos: &Position, bonus: i32) {
        apply_clamped(&mut self.table[correction_index(pos)], bonus);
    }
}
