use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::HashMap, fmt};
use uuid::Uuid;

use super::constants;

/// Identifier of a player within a session.
///
/// Whitespace around the identifier is dropped, so two transports that
/// disagree on padding still map to the same player. Nothing else is
/// rewritten: distinct identifiers stay distinct.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Session-scoped identifier of a white card in a player's hand.
pub type CardId = Uuid;

/// Identifier of a set of submitted white cards.
pub type SubmissionId = Uuid;

/// A white card held by a player.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WhiteCard {
    pub id: CardId,
    pub text: String,
}

/// A player's hand of white cards.
///
/// Cards keep the order they were dealt in. Replacing a card removes it
/// and appends the replacement at the end.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PlayerDeck(Vec<WhiteCard>);

impl PlayerDeck {
    pub fn new(cards: Vec<WhiteCard>) -> Self {
        Self(cards)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.0.iter().any(|card| card.id == *id)
    }

    pub fn get(&self, id: &CardId) -> Option<&WhiteCard> {
        self.0.iter().find(|card| card.id == *id)
    }

    pub fn cards(&self) -> &[WhiteCard] {
        &self.0
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.0.iter().map(|card| card.id)
    }

    /// Texts of the cards in hand order, the payload shape of deck changes.
    pub fn texts(&self) -> Vec<String> {
        self.0.iter().map(|card| card.text.clone()).collect()
    }

    /// Swap the card with `id` for `replacement`, returning the old card.
    pub fn replace(&mut self, id: &CardId, replacement: WhiteCard) -> Option<WhiteCard> {
        let idx = self.0.iter().position(|card| card.id == *id)?;
        let old = self.0.remove(idx);
        self.0.push(replacement);
        Some(old)
    }

    pub fn into_cards(self) -> Vec<WhiteCard> {
        self.0
    }
}

/// Session phases.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    WaitingForPlayers,
    CountdownToGame,
    GamePlaying,
    CzarPicking,
    CzarPicked,
}

impl Status {
    /// Phases in which the judge is actively needed for the round.
    pub fn is_czar_dependent(&self) -> bool {
        matches!(self, Self::GamePlaying | Self::CzarPicking)
    }

    /// Phases in which the submission maps exist.
    pub fn has_submissions(&self) -> bool {
        matches!(
            self,
            Self::GamePlaying | Self::CzarPicking | Self::CzarPicked
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            Self::CountdownToGame => "COUNTDOWN_TO_GAME",
            Self::GamePlaying => "GAME_PLAYING",
            Self::CzarPicking => "CZAR_PICKING",
            Self::CzarPicked => "CZAR_PICKED",
        };
        write!(f, "{repr}")
    }
}

/// What the single armed countdown will do when it fires.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Countdown {
    StartGame,
    CzarPicking,
    SkipCzar,
    ResetGame,
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::StartGame => "start game",
            Self::CzarPicking => "czar picking",
            Self::SkipCzar => "skip czar",
            Self::ResetGame => "reset game",
        };
        write!(f, "{repr}")
    }
}

/// Why a round was thrown away.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    CzarLeft,
    TooManySkipped,
    CzarSkipped,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::CzarLeft => constants::CZAR_LEFT,
            Self::TooManySkipped => constants::TOO_MANY_SKIPPED,
            Self::CzarSkipped => constants::CZAR_SKIPPED,
        };
        write!(f, "{repr}")
    }
}

/// A player's answer to the current black card.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub player_id: PlayerId,
    pub card_ids: Vec<CardId>,
    pub cards: Vec<WhiteCard>,
    pub submitted_at: DateTime<Utc>,
}

/// The last round's winning submission and the prompt it answered.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    #[serde(flatten)]
    pub submission: Submission,
    pub black_card: Option<String>,
}

/// Point-in-time snapshot of a session.
///
/// This is what `STATE_CHANGED` carries and what `get_state` returns. The
/// live card pools are reported by size only.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub min_players: usize,
    pub max_players: usize,
    pub status: Status,
    pub black_card: Option<String>,
    pub czar_id: Option<PlayerId>,
    pub player_ids: Vec<PlayerId>,
    pub player_decks: HashMap<PlayerId, PlayerDeck>,
    pub player_scores: HashMap<PlayerId, u32>,
    pub submitted_cards: Option<HashMap<SubmissionId, Submission>>,
    pub submitted_players: Option<HashMap<PlayerId, SubmissionId>>,
    pub winner: Option<Winner>,
    pub reason: Option<ResetReason>,
    pub countdown: Option<Countdown>,
    pub countdown_until: Option<DateTime<Utc>>,
    pub white_pool_size: usize,
    pub black_pool_size: usize,
}

impl SessionView {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The submission made by `player_id` this round, if any.
    pub fn submission_of(&self, player_id: &PlayerId) -> Option<&Submission> {
        let submission_id = self.submitted_players.as_ref()?.get(player_id)?;
        self.submitted_cards.as_ref()?.get(submission_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> WhiteCard {
        WhiteCard {
            id: Uuid::new_v4(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_player_id_trims_whitespace() {
        assert_eq!(PlayerId::new("  alice "), PlayerId::new("alice"));
        assert_eq!(PlayerId::from("bob").as_str(), "bob");
    }

    #[test]
    fn test_player_id_keeps_multibyte_text() {
        let raw = format!("a{}", "é".repeat(40));
        let id = PlayerId::new(&raw);
        assert_eq!(id.as_str(), raw);
    }

    #[test]
    fn test_long_ids_with_shared_prefix_stay_distinct() {
        let prefix = "x".repeat(64);
        let alice = PlayerId::new(&format!("{prefix}-alice"));
        let bob = PlayerId::new(&format!("{prefix}-bob"));
        assert_ne!(alice, bob);
    }

    #[test]
    fn test_player_id_deserialize_normalizes() {
        let id: PlayerId = serde_json::from_str("\" carol\"").unwrap();
        assert_eq!(id.as_str(), "carol");
    }

    #[test]
    fn test_deck_replace_appends_replacement() {
        let (a, b, c) = (card("a"), card("b"), card("c"));
        let mut deck = PlayerDeck::new(vec![a.clone(), b.clone()]);

        let old = deck.replace(&a.id, c.clone());

        assert_eq!(old, Some(a.clone()));
        assert_eq!(deck.texts(), vec!["b".to_string(), "c".to_string()]);
        assert!(!deck.contains(&a.id));
        assert!(deck.replace(&a.id, card("d")).is_none());
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&Status::CzarPicking).unwrap();
        assert_eq!(json, "\"CZAR_PICKING\"");
        assert_eq!(Status::CzarPicking.to_string(), "CZAR_PICKING");
    }

    #[test]
    fn test_reset_reason_messages() {
        assert_eq!(ResetReason::CzarLeft.to_string(), "The card czar left the game");
        assert_eq!(
            ResetReason::TooManySkipped.to_string(),
            "Too many players were skipped."
        );
        assert_eq!(ResetReason::CzarSkipped.to_string(), "The czar was skipped.");
    }
}
