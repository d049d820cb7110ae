//! Simulation configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use party_cards::{Countdowns, SessionConfig};
use std::{fs, path::PathBuf};

/// Complete simulation configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of scripted bots joining the session
    pub bots: usize,
    /// Stop after this many rounds have a winner
    pub rounds: u32,
    /// Seed for the session and the bots; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Session configuration
    pub session: SessionConfig,
}

/// Command line values that take precedence over the environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub bots: Option<usize>,
    pub rounds: Option<u32>,
    pub seed: Option<u64>,
    pub white_deck: Option<PathBuf>,
    pub black_deck: Option<PathBuf>,
    pub verbose: bool,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a deck file cannot be read or the resulting
    /// configuration is invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = SessionConfig::default();
        let default_countdowns = Countdowns::default();

        let countdowns = Countdowns {
            countdown_to_game: parse_env_or(
                "PC_COUNTDOWN_TO_GAME",
                default_countdowns.countdown_to_game,
            ),
            czar_picking: parse_env_or("PC_CZAR_PICKING", default_countdowns.czar_picking),
            game_duration: parse_env_or("PC_GAME_DURATION", default_countdowns.game_duration),
            winner_picked: parse_env_or("PC_WINNER_PICKED", default_countdowns.winner_picked),
        };

        let white_deck = match overrides
            .white_deck
            .or_else(|| std::env::var("PC_WHITE_DECK").ok().map(PathBuf::from))
        {
            Some(path) => load_deck(path)?,
            None => defaults.white_deck,
        };
        let black_deck = match overrides
            .black_deck
            .or_else(|| std::env::var("PC_BLACK_DECK").ok().map(PathBuf::from))
        {
            Some(path) => load_deck(path)?,
            None => defaults.black_deck,
        };

        let session = SessionConfig {
            white_deck,
            black_deck,
            countdowns,
            min_players: parse_env_or("PC_MIN_PLAYERS", defaults.min_players),
            max_players: std::env::var("PC_MAX_PLAYERS")
                .ok()
                .and_then(|v| v.parse().ok()),
            verbose: overrides.verbose || parse_env_or("PC_VERBOSE", false),
        };

        let config = Self {
            bots: overrides.bots.unwrap_or_else(|| parse_env_or("PC_BOTS", 4)),
            rounds: overrides.rounds.unwrap_or_else(|| parse_env_or("PC_ROUNDS", 3)),
            seed: overrides
                .seed
                .or_else(|| std::env::var("PC_SEED").ok().and_then(|v| v.parse().ok())),
            session,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session
            .validate()
            .map_err(|e| ConfigError::Invalid {
                var: "session".to_string(),
                reason: e.to_string(),
            })?;

        if self.bots < self.session.min_players {
            return Err(ConfigError::Invalid {
                var: "PC_BOTS".to_string(),
                reason: format!(
                    "Must be at least min players ({})",
                    self.session.min_players
                ),
            });
        }

        if self.bots > self.session.max_players() {
            return Err(ConfigError::Invalid {
                var: "PC_BOTS".to_string(),
                reason: format!(
                    "Cannot exceed max players ({})",
                    self.session.max_players()
                ),
            });
        }

        if self.rounds == 0 {
            return Err(ConfigError::Invalid {
                var: "PC_ROUNDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Failed to read deck file {path:?}: {source}")]
    DeckFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One card per non-empty line
pub fn parse_deck(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_deck(path: PathBuf) -> Result<Vec<String>, ConfigError> {
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(parse_deck(&contents)),
        Err(source) => Err(ConfigError::DeckFile { path, source }),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bots: usize) -> SimConfig {
        SimConfig {
            bots,
            rounds: 3,
            seed: None,
            session: SessionConfig::default(),
        }
    }

    #[test]
    fn test_parse_deck_skips_blank_lines() {
        let deck = parse_deck("  A cat.\n\n\tA dog. \r\n   \nA duck.");
        assert_eq!(deck, vec!["A cat.", "A dog.", "A duck."]);
    }

    #[test]
    fn test_bot_count_bounds() {
        assert!(config(2).validate().is_ok());
        assert!(matches!(
            config(1).validate(),
            Err(ConfigError::Invalid { var, .. }) if var == "PC_BOTS"
        ));
        let too_many = SessionConfig::default().max_players() + 1;
        assert!(config(too_many).validate().is_err());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut config = config(3);
        config.rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_deck_file() {
        let err = load_deck(PathBuf::from("/nonexistent/white.txt")).unwrap_err();
        assert!(err.to_string().contains("white.txt"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "PC_ROUNDS".to_string(),
            reason: "Must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("PC_ROUNDS"));
    }
}
