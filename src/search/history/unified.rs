use super::{
    apply_clamped, apply_gravity, capture_index, continuation_index, correction_index, offset_slot,
    pawn_index, quiet_index, MoveHistory, CAPTURE_LEN, CONT_LEN, CONT_OFFSETS, CORRECTION_SIZE,
    PAWN_LEN, QUIET_LEN,
};
use crate::board::Position;
use crate::search::params::HistoryWeights;
use crate::search::stack::SearchStack;
use cozy_chess::{BitBoard, Move};

// Sections of the arena, in order. The quiet section is the per-move table:
// one 8-byte cell per (color, from, to). The others are satellite sections
// with their own keys. Continuation cells hold the three lookbacks side by
// side, padded to four.
const QUIET_AT: usize = 0;
const CAPTURE_AT: usize = QUIET_AT + QUIET_LEN;
const CONT_AT: usize = CAPTURE_AT + CAPTURE_LEN;
const PAWN_AT: usize = CONT_AT + CONT_LEN * 4;
const CORRECTION_AT: usize = PAWN_AT + PAWN_LEN;
const ARENA_LEN: usize = CORRECTION_AT + 2 * CORRECTION_SIZE;

/// Every table in one contiguous allocation, split into sections.
///
/// Only the quiet scores are keyed by `(color, from, to)`: the four threat
/// variants of one move sit together in 8 bytes. Capture, continuation, pawn
/// and correction scores live in satellite sections of the same arena, and
/// the three continuation lookbacks of a `(piece, square, square)` key share
/// one cell. Clearing zero-fills in place.
pub struct Unified {
    weights: HistoryWeights,
    arena: Box<[i16]>,
}

impl Unified {
    pub fn new(weights: HistoryWeights) -> Self {
        Self { weights, arena: vec![0i16; ARENA_LEN].into_boxed_slice() }
    }

    #[inline]
    fn cont_cell(stack: &SearchStack, mv: Move, offset: usize) -> Option<usize> {
        let slot = offset_slot(offset)?;
        continuation_index(stack, offset, mv.to).map(|i| CONT_AT + i * 4 + slot)
    }
}

impl MoveHistory for Unified {
    fn weights(&self) -> &HistoryWeights { &self.weights }

    fn quiet_score(&self, pos: &Position, mv: Move, threats: BitBoard) -> i32 {
        self.arena[QUIET_AT + quiet_index(pos.side_to_move(), mv, threats)] as i32
    }

    fn capture_score(&self, pos: &Position, mv: Move) -> i32 {
        capture_index(pos, mv).map_or(0, |i| self.arena[CAPTURE_AT + i] as i32)
    }

    fn continuation_score(&self, _pos: &Position, mv: Move, stack: &SearchStack, offset: usize) -> i32 {
        Self::cont_cell(stack, mv, offset).map_or(0, |i| self.arena[i] as i32)
    }

    fn pawn_score(&self, pos: &Position, mv: Move) -> i32 {
        self.arena[PAWN_AT + pawn_index(pos, mv.to)] as i32
    }

    fn correction(&self, pos: &Position) -> i32 {
        self.arena[CORRECTION_AT + correction_index(pos)] as i32
    }

    fn update_quiet(&mut self, pos: &Position, mv: Move, threats: BitBoard, bonus: i32) {
        apply_gravity(&mut self.arena[QUIET_AT + quiet_index(pos.side_to_move(), mv, threats)], bonus);
    }

    fn update_capture(&mut self, pos: &Position, mv: Move, bonus: i32) {
        if let Some(i) = capture_index(pos, mv) {
            apply_gravity(&mut self.arena[CAPTURE_AT + i], bonus);
        }
    }

    fn update_continuation(&mut self, _pos: &Position, mv: Move, stack: &SearchStack, bonus: i32) {
        for offset in CONT_OFFSETS {
            if let Some(i) = Self::cont_cell(stack, mv, offset) {
                apply_gravity(&mut self.arena[i], bonus);
            }
        }
    }

    fn update_pawn(&mut self, pos: &Position, mv: Move, bonus: i32) {
        apply_gravity(&mut self.arena[PAWN_AT + pawn_index(pos, mv.to)], bonus);
    }

    fn update_correction(&mut self, pos: &Position, bonus: i32) {
        apply_clamped(&mut self.arena[CORRECTION_AT + correction_index(pos)], bonus);
    }

    fn clear(&mut self) {
        self.arena.fill(0);
    }
}
