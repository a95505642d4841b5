use thiserror::Error;

/// Failures surfaced by the puzzle and session layer. All of these are soft:
/// the driver recovers locally (an invalid click is ignored, an exhausted
/// hint budget no-ops) and the session itself never dies on one.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("tile at position {position} is not adjacent to the blank")]
    InvalidMove { position: usize },

    #[error("no hints remaining")]
    NoHintsRemaining,

    #[error("board size {size} is below the 2x2 minimum")]
    InvalidConfiguration { size: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Persistent-store failures. Reads that fail are treated as absence by the
/// callers; writes that fail are logged and the game continues without
/// persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
