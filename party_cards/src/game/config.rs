//! Session configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    constants::{
        DEFAULT_COUNTDOWN_TO_GAME_SECS, DEFAULT_CZAR_PICKING_SECS, DEFAULT_GAME_DURATION_SECS,
        DEFAULT_MIN_PLAYERS, DEFAULT_WINNER_PICKED_SECS, HAND_SIZE,
    },
    decks,
    errors::ConfigError,
};

/// Phase timer lengths, in seconds.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// partial override like `{"gameDuration": 90}` keeps the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Countdowns {
    /// Wait between enough players joining and the round starting
    pub countdown_to_game: u64,

    /// Time the judge gets to pick a winner
    pub czar_picking: u64,

    /// Time players get to submit cards
    pub game_duration: u64,

    /// Pause after a winner is picked before the next countdown
    pub winner_picked: u64,
}

impl Default for Countdowns {
    fn default() -> Self {
        Self {
            countdown_to_game: DEFAULT_COUNTDOWN_TO_GAME_SECS,
            czar_picking: DEFAULT_CZAR_PICKING_SECS,
            game_duration: DEFAULT_GAME_DURATION_SECS,
            winner_picked: DEFAULT_WINNER_PICKED_SECS,
        }
    }
}

impl Countdowns {
    pub fn countdown_to_game(&self) -> Duration {
        Duration::from_secs(self.countdown_to_game)
    }

    pub fn czar_picking(&self) -> Duration {
        Duration::from_secs(self.czar_picking)
    }

    pub fn game_duration(&self) -> Duration {
        Duration::from_secs(self.game_duration)
    }

    pub fn winner_picked(&self) -> Duration {
        Duration::from_secs(self.winner_picked)
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// White cards, in the order they were supplied
    pub white_deck: Vec<String>,

    /// Black cards, in the order they were supplied
    pub black_deck: Vec<String>,

    /// Phase timer lengths
    pub countdowns: Countdowns,

    /// Players needed before a round counts down (default: 2)
    pub min_players: usize,

    /// Player cap; `None` means as many as the white deck can deal hands to
    pub max_players: Option<usize>,

    /// Log every transition at info level instead of debug
    pub verbose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let (white_deck, black_deck) = decks::default_decks();
        Self {
            white_deck,
            black_deck,
            countdowns: Countdowns::default(),
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: None,
            verbose: false,
        }
    }
}

impl SessionConfig {
    /// Effective player cap
    pub fn max_players(&self) -> usize {
        self.max_players
            .unwrap_or(self.white_deck.len() / HAND_SIZE)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.black_deck.is_empty() {
            return Err(ConfigError::EmptyBlackDeck);
        }

        let max_players = self.max_players();
        if max_players * HAND_SIZE > self.white_deck.len() {
            return Err(ConfigError::InsufficientWhiteCards {
                max_players,
                available: self.white_deck.len(),
            });
        }

        if self.min_players == 0 || self.min_players > max_players {
            return Err(ConfigError::InvalidPlayerBounds {
                min_players: self.min_players,
                max_players,
            });
        }

        Ok(())
    }
}
