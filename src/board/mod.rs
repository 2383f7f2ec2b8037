pub mod bitset;
pub mod cozy;

pub use bitset::SquareSet;
pub use cozy::Position;
