//! Move-ordering history.
//!
//! Two layouts sit behind [`MoveHistory`]: [`Segmented`] keeps one heap table
//! per heuristic and rebuilds them on clear, [`Unified`] packs every table into
//! one arena and zero-fills it. Which one a worker uses is a runtime choice.

pub mod segmented;
pub mod tables;
pub mod unified;

pub use segmented::Segmented;
pub use unified::Unified;

use crate::board::Position;
use crate::search::eval::MATE_BOUND;
use crate::search::params::{BonusParams, HistoryWeights, HISTORY_WEIGHT_SCALE};
use crate::search::stack::SearchStack;
use cozy_chess::{BitBoard, Color, Move, Piece, Square};
use serde::{Deserialize, Serialize};

/// Practical bound of every gravity-updated entry.
pub const HISTORY_MAX: i32 = 16_384;
/// Hard clamp of correction entries.
pub const CORRECTION_LIMIT: i32 = 16_384;
/// Correction entries are stored this many times finer than centipawns.
pub const CORRECTION_GRAIN: i32 = 256;
pub const PAWN_HISTORY_SIZE: usize = 1024;
pub const CORRECTION_SIZE: usize = 16_384;
/// Continuation lookbacks, in plies.
pub const CONT_OFFSETS: [usize; 3] = [1, 2, 4];

pub(crate) const QUIET_LEN: usize = 2 * 64 * 64 * 4;
pub(crate) const CAPTURE_LEN: usize = 2 * 6 * 64 * 6;
pub(crate) const CONT_LEN: usize = 12 * 64 * 64;
pub(crate) const PAWN_LEN: usize = 2 * PAWN_HISTORY_SIZE * 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryLayout {
    #[default]
    Segmented,
    Unified,
}

pub fn build(layout: HistoryLayout, weights: HistoryWeights) -> Box<dyn MoveHistory> {
    match layout {
        HistoryLayout::Segmented => Box::new(Segmented::new(weights)),
        HistoryLayout::Unified => Box::new(Unified::new(weights)),
    }
}

/// Moves `entry` toward the sign of `bonus`, by less the closer it already is
/// to [`HISTORY_MAX`]. Never leaves `-HISTORY_MAX..=HISTORY_MAX`.
#[inline]
pub fn apply_gravity(entry: &mut i16, bonus: i32) {
    let b = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
    let e = *entry as i32;
    *entry = (e + b - e * b.abs() / HISTORY_MAX) as i16;
}

#[inline]
pub fn apply_clamped(entry: &mut i16, bonus: i32) {
    *entry = (*entry as i32).saturating_add(bonus).clamp(-CORRECTION_LIMIT, CORRECTION_LIMIT) as i16;
}

pub fn history_bonus(depth: i32, params: &BonusParams) -> i32 {
    (params.scale * depth - params.offset).clamp(0, params.max)
}

pub fn history_malus(depth: i32, params: &BonusParams) -> i32 {
    -history_bonus(depth, params)
}

#[inline]
pub(crate) fn quiet_index(color: Color, mv: Move, threats: BitBoard) -> usize {
    let from_threat = threats.has(mv.from) as usize;
    let to_threat = threats.has(mv.to) as usize;
    ((color as usize * 64 + mv.from as usize) * 64 + mv.to as usize) * 4 + from_threat * 2 + to_threat
}

#[inline]
pub(crate) fn capture_index(pos: &Position, mv: Move) -> Option<usize> {
    let attacker = pos.piece_on(mv.from)?;
    let victim = pos.captured_piece(mv).unwrap_or(Piece::Pawn);
    let color = pos.side_to_move() as usize;
    Some(((color * 6 + attacker as usize) * 64 + mv.to as usize) * 6 + victim as usize)
}

/// `(previous piece, previous destination, current destination)` for the
/// move `offset` plies back; `None` if the stack is too shallow or that ply
/// had no move.
#[inline]
pub(crate) fn continuation_index(stack: &SearchStack, offset: usize, to: Square) -> Option<usize> {
    let frame = stack.lookback(offset)?;
    let prev = frame.mv?;
    let (color, piece) = frame.moved?;
    let piece = color as usize * 6 + piece as usize;
    Some((piece * 64 + prev.to as usize) * 64 + to as usize)
}

#[inline]
pub(crate) fn pawn_index(pos: &Position, to: Square) -> usize {
    let color = pos.side_to_move() as usize;
    let bucket = pos.pawn_key() as usize & (PAWN_HISTORY_SIZE - 1);
    (color * PAWN_HISTORY_SIZE + bucket) * 64 + to as usize
}

#[inline]
pub(crate) fn correction_index(pos: &Position) -> usize {
    let color = pos.side_to_move() as usize;
    color * CORRECTION_SIZE + (pos.pawn_key() as usize & (CORRECTION_SIZE - 1))
}

#[inline]
pub(crate) fn offset_slot(offset: usize) -> Option<usize> {
    CONT_OFFSETS.iter().position(|&o| o == offset)
}

/// The per-worker learned move-ordering tables.
pub trait MoveHistory: Send {
    fn weights(&self) -> &HistoryWeights;

    fn quiet_score(&self, pos: &Position, mv: Move, threats: BitBoard) -> i32;
    fn capture_score(&self, pos: &Position, mv: Move) -> i32;
    /// Score of `mv` following the move `offset` plies back (1, 2 or 4).
    fn continuation_score(&self, pos: &Position, mv: Move, stack: &SearchStack, offset: usize) -> i32;
    fn pawn_score(&self, pos: &Position, mv: Move) -> i32;
    /// Raw correction entry for the position's pawn structure.
    fn correction(&self, pos: &Position) -> i32;

    fn update_quiet(&mut self, pos: &Position, mv: Move, threats: BitBoard, bonus: i32);
    fn update_capture(&mut self, pos: &Position, mv: Move, bonus: i32);
    /// Updates every lookback the stack reaches.
    fn update_continuation(&mut self, pos: &Position, mv: Move, stack: &SearchStack, bonus: i32);
    fn update_pawn(&mut self, pos: &Position, mv: Move, bonus: i32);
    fn update_correction(&mut self, pos: &Position, bonus: i32);

    fn clear(&mut self);

    /// Ordering score: capture history for captures, the weighted quiet sum
    /// otherwise.
    fn move_score(&self, pos: &Position, mv: Move, stack: &SearchStack) -> i32 {
        if pos.is_capture(mv) {
            self.capture_score(pos, mv)
        } else {
            self.quiet_move_score(pos, mv, stack)
        }
    }

    fn quiet_move_score(&self, pos: &Position, mv: Move, stack: &SearchStack) -> i32 {
        let w = self.weights();
        let threats = stack.current().threats;
        let mut score = self.quiet_score(pos, mv, threats) * w.quiet;
        score += self.continuation_score(pos, mv, stack, 1) * w.cont1;
        score += self.continuation_score(pos, mv, stack, 2) * w.cont2;
        score += self.continuation_score(pos, mv, stack, 4) * w.cont4;
        score += self.pawn_score(pos, mv) * w.pawn;
        score / HISTORY_WEIGHT_SCALE
    }

    /// Static eval nudged by the correction entry, kept out of mate range.
    fn corrected_eval(&self, pos: &Position, static_eval: i32) -> i32 {
        (static_eval + self.correction(pos) / CORRECTION_GRAIN).clamp(-MATE_BOUND + 1, MATE_BOUND - 1)
    }

    /// Rewards `best` and penalises the quiets tried before it.
    fn update_quiet_cutoff(&mut self, pos: &Position, stack: &SearchStack, best: Move, tried: &[Move], bonus: i32) {
        let threats = stack.current().threats;
        self.update_quiet(pos, best, threats, bonus);
        self.update_continuation(pos, best, stack, bonus);
        self.update_pawn(pos, best, bonus);
        for &mv in tried.iter().filter(|&&m| m != best) {
            self.update_quiet(pos, mv, threats, -bonus);
            self.update_continuation(pos, mv, stack, -bonus);
            self.update_pawn(pos, mv, -bonus);
        }
    }
}
