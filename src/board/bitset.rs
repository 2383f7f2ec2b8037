use cozy_chess::{BitBoard, Square};

/// Named set operations over a 64-square occupancy set, used where the
/// exchange evaluator edits its scratch occupancy.
pub trait SquareSet: Copy {
    fn set(&mut self, sq: Square);
    fn clear(&mut self, sq: Square);
    fn test(self, sq: Square) -> bool;
    /// Lowest-indexed member, a1 first.
    fn lsb(self) -> Option<Square>;

    fn with(mut self, sq: Square) -> Self {
        self.set(sq);
        self
    }

    fn without(mut self, sq: Square) -> Self {
        self.clear(sq);
        self
    }
}

impl SquareSet for BitBoard {
    #[inline]
    fn set(&mut self, sq: Square) { self.0 |= 1u64 << sq as u32; }

    #[inline]
    fn clear(&mut self, sq: Square) { self.0 &= !(1u64 << sq as u32); }

    #[inline]
    fn test(self, sq: Square) -> bool { self.0 & (1u64 << sq as u32) != 0 }

    #[inline]
    fn lsb(self) -> Option<Square> {
        if self.0 == 0 { return None; }
        Some(Square::index(self.0.trailing_zeros() as usize))
    }
}
