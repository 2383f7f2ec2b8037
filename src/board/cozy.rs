use crate::error::{CoreError, Result};
use crate::search::zobrist;
use cozy_chess::{
    get_between_rays, get_bishop_moves, get_bishop_rays, get_king_moves, get_knight_moves,
    get_pawn_attacks, get_rook_moves, get_rook_rays, BitBoard, Board as CozyBoard, Color, File,
    Move, Piece, Square,
};

/// Read-only view of a board as the search core consumes it.
///
/// Keys and pin masks are computed once when the snapshot is built so the hot
/// paths (SEE, history lookups) only read fields.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    pawn_key: u64,
    pinned: [BitBoard; 2],
    // keys of earlier positions, oldest first
    keys: Vec<u64>,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(CozyBoard::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        CozyBoard::from_fen(fen, false)
            .map(Self::from_board)
            .map_err(|e| CoreError::Fen(format!("{e:?}")))
    }

    pub fn from_board(board: CozyBoard) -> Self {
        let pawn_key = zobrist::pawn_key(&board);
        let pinned = [pins_of(&board, Color::White), pins_of(&board, Color::Black)];
        Self { board, pawn_key, pinned, keys: Vec::new() }
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn zobrist(&self) -> u64 { self.board.hash() }

    pub fn pawn_key(&self) -> u64 { self.pawn_key }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn pieces(&self, piece: Piece) -> BitBoard { self.board.pieces(piece) }

    pub fn colors(&self, color: Color) -> BitBoard { self.board.colors(color) }

    pub fn colored(&self, color: Color, piece: Piece) -> BitBoard { self.board.colored_pieces(color, piece) }

    pub fn occupied(&self) -> BitBoard { self.board.occupied() }

    pub fn king(&self, color: Color) -> Square { self.board.king(color) }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> { self.board.piece_on(sq) }

    pub fn color_on(&self, sq: Square) -> Option<Color> { self.board.color_on(sq) }

    /// Pieces of `color` pinned to their own king, by either slider type.
    pub fn pinned(&self, color: Color) -> BitBoard { self.pinned[color as usize] }

    pub fn halfmove_clock(&self) -> u8 { self.board.halfmove_clock() }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    /// True if the current position occurred before since the last
    /// irreversible move.
    pub fn is_repetition(&self) -> bool {
        let key = self.zobrist();
        let window = self.board.halfmove_clock() as usize;
        self.keys.iter().rev().take(window).skip(1).step_by(2).any(|&k| k == key)
    }

    /// Squares attacked by the opponent of the side to move.
    pub fn threats(&self) -> BitBoard {
        self.attacks_by(!self.side_to_move())
    }

    pub fn attacks_by(&self, color: Color) -> BitBoard {
        let b = &self.board;
        let occ = b.occupied();
        let mut att = BitBoard::EMPTY;
        for sq in b.colored_pieces(color, Piece::Pawn) { att |= get_pawn_attacks(sq, color); }
        for sq in b.colored_pieces(color, Piece::Knight) { att |= get_knight_moves(sq); }
        let diag = b.colored_pieces(color, Piece::Bishop) | b.colored_pieces(color, Piece::Queen);
        for sq in diag { att |= get_bishop_moves(sq, occ); }
        let orth = b.colored_pieces(color, Piece::Rook) | b.colored_pieces(color, Piece::Queen);
        for sq in orth { att |= get_rook_moves(sq, occ); }
        att | get_king_moves(b.king(color))
    }

    pub fn moved_piece(&self, mv: Move) -> Option<(Color, Piece)> {
        Some((self.board.color_on(mv.from)?, self.board.piece_on(mv.from)?))
    }

    pub fn is_en_passant(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
    }

    /// Castling is encoded as the king moving onto its own rook.
    pub fn is_castle(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.side_to_move())
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        self.board.color_on(mv.to) == Some(!self.side_to_move()) || self.is_en_passant(mv)
    }

    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        if self.is_en_passant(mv) { return Some(Piece::Pawn); }
        if self.board.color_on(mv.to) == Some(!self.side_to_move()) { self.board.piece_on(mv.to) } else { None }
    }

    pub fn play(&mut self, mv: Move) -> Result<()> {
        if !self.board.is_legal(mv) {
            return Err(CoreError::IllegalMove(format!("{mv}")));
        }
        self.keys.push(self.zobrist());
        self.board.play_unchecked(mv);
        self.pawn_key = zobrist::pawn_key(&self.board);
        self.pinned = [pins_of(&self.board, Color::White), pins_of(&self.board, Color::Black)];
        Ok(())
    }

    /// Accepts both `e1h1` (king takes rook) and the standard `e1g1` castling form.
    pub fn make_move_uci(&mut self, mv_uci: &str) -> Result<()> {
        let mut mv: Move = mv_uci.parse().map_err(|_| CoreError::IllegalMove(mv_uci.to_string()))?;
        let two_files = (mv.from.file() as i32 - mv.to.file() as i32).abs() == 2;
        if self.board.piece_on(mv.from) == Some(Piece::King) && two_files && !self.board.is_legal(mv) {
            let rook_file = if mv.to.file() as usize > mv.from.file() as usize { File::H } else { File::A };
            mv.to = Square::new(rook_file, mv.from.rank());
        }
        self.play(mv)
    }
}

fn pins_of(board: &CozyBoard, color: Color) -> BitBoard {
    let king = board.king(color);
    let them = board.colors(!color);
    let diag = (board.pieces(Piece::Bishop) | board.pieces(Piece::Queen)) & them;
    let orth = (board.pieces(Piece::Rook) | board.pieces(Piece::Queen)) & them;
    let snipers = (get_bishop_rays(king) & diag) | (get_rook_rays(king) & orth);
    let mut pinned = BitBoard::EMPTY;
    for sniper in snipers {
        let blockers = get_between_rays(sniper, king) & board.occupied();
        if blockers.len() == 1 {
            pinned |= blockers & board.colors(color);
        }
    }
    pinned
}
