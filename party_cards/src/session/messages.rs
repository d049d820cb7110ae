//! Session actor message types.

use crate::game::{
    entities::{CardId, PlayerId, SessionView, SubmissionId},
    errors::SessionResult,
    events::{GameEvent, SubscriptionId},
};
use tokio::sync::{mpsc, oneshot};

/// Identifier of a session owned by a `SessionManager`.
pub type SessionId = u64;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Join the session
    AddPlayer {
        player_id: PlayerId,
        response: oneshot::Sender<SessionResult<()>>,
    },

    /// Leave the session
    RemovePlayer {
        player_id: PlayerId,
        response: oneshot::Sender<SessionResult<()>>,
    },

    /// Answer the current black card
    SubmitCards {
        player_id: PlayerId,
        card_ids: Vec<CardId>,
        response: oneshot::Sender<SessionResult<()>>,
    },

    /// Judge picks the winning submission
    PickWinner {
        submission_id: SubmissionId,
        response: oneshot::Sender<SessionResult<()>>,
    },

    /// Get a snapshot of the session
    GetState {
        response: oneshot::Sender<SessionView>,
    },

    /// Forward every future event to `sender`
    Subscribe {
        sender: mpsc::Sender<GameEvent>,
        response: oneshot::Sender<SubscriptionId>,
    },

    /// Stop forwarding events to a subscriber
    Unsubscribe {
        id: SubscriptionId,
        response: oneshot::Sender<bool>,
    },

    /// Destroy the session and stop the actor
    Close { response: oneshot::Sender<()> },
}
