use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("FEN error: {0}")]
    Fen(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("parameter `{name}` = {value} outside {min}..={max}")]
    OutOfRange { name: &'static str, value: i64, min: i64, max: i64 },

    #[error("config parse error")]
    Config(#[from] serde_json::Error),

    #[error("config read error")]
    Io(#[from] std::io::Error),

    #[error("failed to build clear worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
