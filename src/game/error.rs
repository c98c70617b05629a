use super::levels::LevelKey;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("progress store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("progress store holds malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("no card with key {0} on the gametable")]
    UnknownCardKey(usize),
    #[error("the deck has no matching cards left")]
    DeckExhausted,
    #[error("no free location left after growing the gametable")]
    NoFreeLocation,
    #[error("unknown level {0}")]
    UnknownLevel(LevelKey),
    #[error("level state for {found} cannot replace the state of {expected}")]
    LevelKeyMismatch { expected: LevelKey, found: LevelKey },
    #[error("level {0} is still locked")]
    LevelLocked(LevelKey),
    #[error("level {0} does not let the player deal cards")]
    DealingNotAllowed(LevelKey),
    #[error(transparent)]
    Store(#[from] StoreError),
}
