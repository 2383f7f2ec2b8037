use cozy_chess::{Board, Color, Piece};
use std::sync::OnceLock;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

static PAWN_TABLE: OnceLock<[u64; 2 * 64]> = OnceLock::new();

fn pawn_table() -> &'static [u64; 2 * 64] {
    PAWN_TABLE.get_or_init(|| {
        let mut t = [0u64; 2 * 64];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in &mut t {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

/// Hash of the pawn skeleton only. Positions with the same pawns share a key
/// regardless of pieces or side to move, which is what the pawn-structure and
/// correction histories are keyed on.
pub fn pawn_key(board: &Board) -> u64 {
    let table = pawn_table();
    let mut key = 0u64;
    for &color in &[Color::White, Color::Black] {
        for sq in board.colored_pieces(color, Piece::Pawn) {
            key ^= table[color as usize * 64 + sq as usize];
        }
    }
    key
}
