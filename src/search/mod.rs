pub mod eval;
pub mod history;
pub mod params;
pub mod see;
pub mod stack;
pub mod tt;
pub mod worker;
pub mod zobrist;

pub use history::{HistoryLayout, MoveHistory};
pub use see::static_exchange;
pub use stack::{Frame, SearchStack};
pub use tt::{Bound, Entry, Tt};
pub use worker::{SearchCore, WorkerContext};
