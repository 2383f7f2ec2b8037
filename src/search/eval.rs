use cozy_chess::{Board, Color, Piece};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;
// Large enough that a king is never the "cheap" side of an exchange.
const KING: i32 = 20_000;

/// Exchange value of a piece in centipawns. Shared by SEE and the material
/// phase of the evaluation scaler.
#[inline]
pub const fn see_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => KING,
    }
}

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    board.colored_pieces(color, piece).len() as i32
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material_eval_cp_side_agnostic(board: &Board) -> i32 {
    let w = Color::White;
    let b = Color::Black;
    [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&p| (count_piece(board, w, p) - count_piece(board, b, p)) * see_value(p))
        .sum()
}

// Material from side-to-move perspective (negamax-friendly)
pub fn material_eval_cp(board: &Board) -> i32 {
    let base = material_eval_cp_side_agnostic(board);
    if board.side_to_move() == Color::White { base } else { -base }
}

// Mate scoring helpers
pub const MATE_SCORE: i32 = 30_000;
pub const MAX_PLY: usize = 256;
/// Scores at or beyond this magnitude encode a forced mate.
pub const MATE_BOUND: i32 = MATE_SCORE - MAX_PLY as i32;
/// Sentinel for "no score stored"; outside every real score.
pub const SCORE_NONE: i32 = MATE_SCORE + 1;

/// Shifts a mate score by `ply`.
///
/// Read back with the probing ply to turn a position-relative mate distance
/// into a root-relative one; store with `-ply` for the inverse.
#[inline]
pub fn correct_score(score: i32, ply: i32) -> i32 {
    if score == SCORE_NONE {
        score
    } else if score >= MATE_BOUND {
        score - ply
    } else if score <= -MATE_BOUND {
        score + ply
    } else {
        score
    }
}
