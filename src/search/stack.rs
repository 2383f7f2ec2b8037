use crate::board::Position;
use crate::search::eval::{MAX_PLY, SCORE_NONE};
use cozy_chess::{BitBoard, Color, Move, Piece};

/// What the search recorded at one ply.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    /// Move played from this node, if any.
    pub mv: Option<Move>,
    /// Color and type of the piece that made `mv`.
    pub moved: Option<(Color, Piece)>,
    /// Squares the opponent attacked at this node.
    pub threats: BitBoard,
    pub static_eval: i32,
}

impl Default for Frame {
    fn default() -> Self {
        Self { mv: None, moved: None, threats: BitBoard::EMPTY, static_eval: SCORE_NONE }
    }
}

/// Per-worker stack of frames indexed by ply.
///
/// Lookbacks past the root come back as `None` rather than reading outside the
/// array.
pub struct SearchStack {
    frames: Box<[Frame]>,
    ply: usize,
}

impl SearchStack {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default(); MAX_PLY + 1].into_boxed_slice(), ply: 0 }
    }

    pub fn ply(&self) -> usize { self.ply }

    pub fn current(&self) -> &Frame { &self.frames[self.ply] }

    pub fn current_mut(&mut self) -> &mut Frame { &mut self.frames[self.ply] }

    /// Frame `offset` plies above the current one.
    pub fn lookback(&self, offset: usize) -> Option<&Frame> {
        self.ply.checked_sub(offset).map(|i| &self.frames[i])
    }

    /// Records `mv` as played from the current node and descends one ply.
    /// Returns false (and records nothing) at the maximum depth.
    pub fn push_move(&mut self, pos: &Position, mv: Move) -> bool {
        if self.ply + 1 >= self.frames.len() {
            return false;
        }
        let frame = &mut self.frames[self.ply];
        frame.mv = Some(mv);
        frame.moved = pos.moved_piece(mv);
        self.ply += 1;
        self.frames[self.ply] = Frame::default();
        true
    }

    /// Descends without a move (null move).
    pub fn push_null(&mut self) -> bool {
        if self.ply + 1 >= self.frames.len() {
            return false;
        }
        let frame = &mut self.frames[self.ply];
        frame.mv = None;
        frame.moved = None;
        self.ply += 1;
        self.frames[self.ply] = Frame::default();
        true
    }

    pub fn pop(&mut self) {
        self.ply = self.ply.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.ply = 0;
        self.frames.fill(Frame::default());
    }
}

impl Default for SearchStack {
    fn default() -> Self { Self::new() }
}
