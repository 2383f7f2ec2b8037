pub mod cache;

pub use cache::EvalCache;

use crate::board::Position;
use crate::search::eval::{material_eval_cp, see_value};
use crate::search::params::{EvalParams, EVAL_NORMALIZATION};
use cozy_chess::Piece;
use serde::{Deserialize, Serialize};

/// The network (or any stand-in) that turns a position into a raw score from
/// the side to move's point of view.
pub trait NetworkOracle {
    fn evaluate(&self, pos: &Position) -> i32;
}

impl<F: Fn(&Position) -> i32> NetworkOracle for F {
    fn evaluate(&self, pos: &Position) -> i32 { self(pos) }
}

/// Plain material count, used when no network is loaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialOracle;

impl NetworkOracle for MaterialOracle {
    fn evaluate(&self, pos: &Position) -> i32 { material_eval_cp(pos.board()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalMode {
    /// Network output rescaled by the material phase.
    #[default]
    Scaled,
    /// Network output untouched, for generating training data.
    Raw,
}

/// Weighted count of minor and major pieces of both colors.
pub fn material_phase(pos: &Position) -> i32 {
    [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&p| see_value(p) * pos.pieces(p).len() as i32)
        .sum()
}

/// Cached evaluation of `pos`.
pub fn evaluate<O: NetworkOracle + ?Sized>(
    pos: &Position,
    cache: &mut EvalCache,
    oracle: &O,
    params: &EvalParams,
    mode: EvalMode,
) -> i32 {
    let key = pos.zobrist();
    if let Some(score) = cache.probe(key) {
        return score;
    }

    let raw = oracle.evaluate(pos);
    let score = match mode {
        EvalMode::Raw => raw,
        EvalMode::Scaled => {
            let scale = params.material_scale_base + material_phase(pos);
            (raw as i64 * scale as i64 / EVAL_NORMALIZATION as i64) as i32
        }
    };
    cache.store(key, score);
    score
}
