use crate::board::{Position, SquareSet};
use crate::search::eval::see_value;
use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_line_rays, get_pawn_attacks,
    get_rook_moves, BitBoard, Color, Move, Piece, Square,
};

const ATTACKER_ORDER: [Piece; 6] = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];

fn attackers_to(pos: &Position, sq: Square, occupied: BitBoard) -> BitBoard {
    let pawns = get_pawn_attacks(sq, Color::White) & pos.colored(Color::Black, Piece::Pawn)
        | get_pawn_attacks(sq, Color::Black) & pos.colored(Color::White, Piece::Pawn);
    let diag = pos.pieces(Piece::Bishop) | pos.pieces(Piece::Queen);
    let orth = pos.pieces(Piece::Rook) | pos.pieces(Piece::Queen);
    (pawns
        | get_knight_moves(sq) & pos.pieces(Piece::Knight)
        | get_king_moves(sq) & pos.pieces(Piece::King)
        | get_bishop_moves(sq, occupied) & diag
        | get_rook_moves(sq, occupied) & orth)
        & occupied
}

/// Pieces of `color` allowed to capture on `to`: everything except pinned
/// pieces that would leave the line through their king.
fn movable(pos: &Position, color: Color, to: Square) -> BitBoard {
    let pinned = pos.pinned(color) & pos.colors(color);
    if pinned.is_empty() {
        return !BitBoard::EMPTY;
    }
    let aligned = get_line_rays(to, pos.king(color)) & pinned;
    !pinned | aligned
}

/// Static exchange evaluation: does the capture sequence started by `mv` win
/// at least `threshold` for the side to move?
///
/// Both sides recapture on `to` with their cheapest piece, x-ray sliders join
/// as the pieces in front of them leave, and either side may stop when
/// continuing no longer pays.
pub fn static_exchange(pos: &Position, mv: Move, threshold: i32) -> bool {
    let from = mv.from;
    let to = mv.to;

    if pos.is_en_passant(mv) || pos.is_castle(mv) {
        return threshold <= 0;
    }
    let Some(mover) = pos.piece_on(from) else { return threshold <= 0 };

    // What the opponent may still take back before we drop below the threshold.
    let mut score = pos.piece_on(to).map_or(0, see_value) - threshold;
    if score < 0 {
        return false;
    }

    // Even losing the capturing piece keeps us above the threshold.
    score = see_value(mover) - score;
    if score <= 0 {
        return true;
    }

    let diag = pos.pieces(Piece::Bishop) | pos.pieces(Piece::Queen);
    let orth = pos.pieces(Piece::Rook) | pos.pieces(Piece::Queen);

    let mut occupied = pos.occupied();
    occupied.clear(from);
    occupied.clear(to);
    let mut attackers = attackers_to(pos, to, occupied);

    let stm = pos.side_to_move();
    let allowed = [movable(pos, Color::White, to), movable(pos, Color::Black, to)];
    let mut turn = stm;
    let mut winner = stm;

    loop {
        turn = !turn;
        attackers &= occupied;

        let ours = attackers & pos.colors(turn) & allowed[turn as usize];
        if ours.is_empty() {
            break;
        }

        // With values aside, whoever still has an attacker wins the square.
        winner = !winner;

        let Some((piece, sq)) = ATTACKER_ORDER
            .iter()
            .find_map(|&p| (ours & pos.pieces(p)).lsb().map(|sq| (p, sq)))
        else {
            break;
        };

        if piece == Piece::King {
            // The king may only take if nothing of theirs still hits the square.
            let defended = !(attackers & pos.colors(!turn)).is_empty();
            return if defended { stm != winner } else { stm == winner };
        }

        occupied.clear(sq);
        match piece {
            Piece::Pawn | Piece::Bishop => attackers |= get_bishop_moves(to, occupied) & diag,
            Piece::Rook => attackers |= get_rook_moves(to, occupied) & orth,
            Piece::Queen => {
                attackers |= get_bishop_moves(to, occupied) & diag | get_rook_moves(to, occupied) & orth
            }
            _ => {}
        }

        score = -score + 1 + see_value(piece);
        if score <= 0 {
            break;
        }
    }

    stm == winner
}
