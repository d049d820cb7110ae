//! Notifications emitted by a session and the observer list that fans
//! them out.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    constants,
    entities::{PlayerId, SessionView},
};

/// Events that occur during a session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    PlayerAdded(PlayerId),
    PlayerRemoved(PlayerId),
    #[serde(rename_all = "camelCase")]
    DeckChange {
        deck: Vec<String>,
        player_id: PlayerId,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        added_to_deck: Option<Vec<String>>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerScored { player_id: PlayerId, score: u32 },
    PlayerSkipped(PlayerId),
    StateChanged(Box<SessionView>),
}

impl GameEvent {
    /// Stable event name used by transports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayerAdded(_) => constants::PLAYER_ADDED,
            Self::PlayerRemoved(_) => constants::PLAYER_REMOVED,
            Self::DeckChange { .. } => constants::DECK_CHANGE,
            Self::PlayerScored { .. } => constants::PLAYER_SCORED,
            Self::PlayerSkipped(_) => constants::PLAYER_SKIPPED,
            Self::StateChanged(_) => constants::STATE_CHANGED,
        }
    }

    /// The player this event concerns, if it concerns exactly one.
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::PlayerAdded(id) | Self::PlayerRemoved(id) | Self::PlayerSkipped(id) => Some(id),
            Self::DeckChange { player_id, .. } | Self::PlayerScored { player_id, .. } => {
                Some(player_id)
            }
            Self::StateChanged(_) => None,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerAdded(id) => format!("{id} joined the game"),
            Self::PlayerRemoved(id) => format!("{id} left the game"),
            Self::DeckChange {
                player_id,
                added_to_deck: Some(added),
                ..
            } => format!("{player_id} drew {} new card(s)", added.len()),
            Self::DeckChange { player_id, deck, .. } => {
                format!("{player_id} was dealt {} cards", deck.len())
            }
            Self::PlayerScored { player_id, score } => {
                format!("{player_id} won the round (score: {score})")
            }
            Self::PlayerSkipped(id) => format!("{id} was skipped"),
            Self::StateChanged(view) => format!("state changed to {}", view.status),
        };
        write!(f, "{repr}")
    }
}

/// Handle returned by [`EventDispatcher::subscribe`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

type Listener = Box<dyn FnMut(&GameEvent) + Send>;

/// Observer list delivering every emitted event to every subscriber, in
/// subscription order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub_id, _)| *sub_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
