//! Error types for the session engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Rejections of player-initiated operations.
///
/// A rejected operation never mutates the session, so callers can show
/// the message to the player and let them retry.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum SessionError {
    #[error("player is already in the game")]
    AlreadyInGame,
    #[error("There is no room in the game.")]
    GameFull,
    #[error("player is not in the game")]
    NotInGame,
    #[error("player has already submitted cards")]
    AlreadySubmitted,
    #[error("the card czar cannot submit cards")]
    CzarCannotSubmit,
    #[error("cardIds contains a card that the user does not have")]
    InvalidCards,
    #[error("A card cannot be submitted currently.")]
    CannotSubmit,
    #[error("A winner cannot be picked currently.")]
    CannotPickWinner,
    #[error("A submitted set of cards does not exist with that id.")]
    UnknownSubmission,
    #[error("the game session has been destroyed")]
    SessionDestroyed,
    #[error("invalid game state: internal consistency error")]
    InternalState,
}

impl SessionError {
    /// Whether this is one of the two wrong-phase rejections.
    pub fn is_wrong_phase(&self) -> bool {
        matches!(self, Self::CannotSubmit | Self::CannotPickWinner)
    }
}

/// Fatal configuration errors. A session is never created when one of
/// these is returned.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    #[error("you must provide a non-empty black deck")]
    EmptyBlackDeck,

    #[error("there is not enough cards in the white deck to support {max_players} players ({available} available)")]
    InsufficientWhiteCards { max_players: usize, available: usize },

    #[error("invalid player bounds: min {min_players}, max {max_players}")]
    InvalidPlayerBounds {
        min_players: usize,
        max_players: usize,
    },
}
