use serde_json;
use thiserror::Error;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Turn error: {0}")]
    Turn(#[from] TurnError), // Errors from the turn requester.

    #[error("Game error: {0}")]
    Game(#[from] GameError), // Errors specific to game logic or state.

    #[error("Save error: {0}")]
    Save(#[from] SaveError), // Errors from the document store.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Errors related to data serialization.

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.
}

// Enum for game-specific errors. Submitting an action in the wrong phase is
// rejected with one of these; the session itself is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("A turn is already in flight")]
    TurnInFlight,

    #[error("The last turn failed; retry it or restart")]
    TurnFailed,

    #[error("The session is over; restart to play again")]
    SessionOver,

    #[error("No turn is currently streaming")]
    NoTurnInFlight,

    #[error("No failed turn to retry")]
    NoFailedTurn,
}

// Errors related to the completion service are separated into their own enum.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError), // Errors from the OpenAI API.

    #[error("Failed to parse turn content: {0}")]
    Parse(String), // The finished stream did not decode as TurnContent.
}

impl From<serde_json::Error> for TurnError {
    fn from(err: serde_json::Error) -> TurnError {
        TurnError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Save rejected with status {0}")]
    Rejected(u16),
}
