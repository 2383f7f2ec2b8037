// Search-support core: shared transposition table, move-ordering history,
// static exchange evaluation and the per-worker evaluation cache.
pub mod board;
pub mod error;
pub mod eval;
pub mod search;

pub use board::Position;
pub use error::{CoreError, Result};
