use thiserror::Error;

/// Construction-time configuration mistakes. In-game misuse (out-of-bounds
/// coordinates, moves after the game ended) is not an error; those actions
/// are defined as no-ops and reported through the outcome enums.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("board must have at least one row and one column")]
    EmptyBoard,
    #[error("more mines requested than non-corner cells")]
    TooManyMines,
    #[error("board values are not a consistent minefield")]
    InvalidBoardValues,
    #[error("coordinates outside the board")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;
