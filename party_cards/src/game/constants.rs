//! Game-wide constants.

/// Number of white cards each player holds.
pub const HAND_SIZE: usize = 10;

pub const DEFAULT_MIN_PLAYERS: usize = 2;

pub const DEFAULT_COUNTDOWN_TO_GAME_SECS: u64 = 15;
pub const DEFAULT_CZAR_PICKING_SECS: u64 = 60;
pub const DEFAULT_GAME_DURATION_SECS: u64 = 60;
pub const DEFAULT_WINNER_PICKED_SECS: u64 = 15;

pub const CZAR_LEFT: &str = "The card czar left the game";
pub const TOO_MANY_SKIPPED: &str = "Too many players were skipped.";
pub const CZAR_SKIPPED: &str = "The czar was skipped.";

// Event names as seen by transports.
pub const DECK_CHANGE: &str = "DECK_CHANGE";
pub const PLAYER_ADDED: &str = "PLAYER_ADDED";
pub const PLAYER_REMOVED: &str = "PLAYER_REMOVED";
pub const PLAYER_SCORED: &str = "PLAYER_SCORED";
pub const PLAYER_SKIPPED: &str = "PLAYER_SKIPPED";
pub const STATE_CHANGED: &str = "STATE_CHANGED";
