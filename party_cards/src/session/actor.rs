//! Session actor implementation with async message handling.

use super::messages::{SessionId, SessionMessage};
use crate::game::{
    config::SessionConfig,
    entities::{CardId, PlayerId, SessionView, SubmissionId},
    errors::{ConfigError, SessionError, SessionResult},
    events::{GameEvent, SubscriptionId},
    scheduler::{TimerId, TokioScheduler},
    state_machine::Session,
};
use rand::rngs::StdRng;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// Inbox capacity of a session actor.
const INBOX_CAPACITY: usize = 100;

/// Buffer of each subscriber channel. Events beyond it are dropped for
/// that subscriber only.
pub const SUBSCRIBER_CAPACITY: usize = 256;

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: SessionId,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(sender: mpsc::Sender<SessionMessage>, session_id: SessionId) -> Self {
        Self { sender, session_id }
    }

    /// Get session ID
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::SessionDestroyed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> SessionResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| SessionError::SessionDestroyed)
    }

    pub async fn add_player(&self, player_id: impl Into<PlayerId>) -> SessionResult<()> {
        let player_id = player_id.into();
        self.request(|response| SessionMessage::AddPlayer {
            player_id,
            response,
        })
        .await?
    }

    pub async fn remove_player(&self, player_id: impl Into<PlayerId>) -> SessionResult<()> {
        let player_id = player_id.into();
        self.request(|response| SessionMessage::RemovePlayer {
            player_id,
            response,
        })
        .await?
    }

    pub async fn submit_cards(
        &self,
        player_id: impl Into<PlayerId>,
        card_ids: Vec<CardId>,
    ) -> SessionResult<()> {
        let player_id = player_id.into();
        self.request(|response| SessionMessage::SubmitCards {
            player_id,
            card_ids,
            response,
        })
        .await?
    }

    pub async fn pick_winner(&self, submission_id: SubmissionId) -> SessionResult<()> {
        self.request(|response| SessionMessage::PickWinner {
            submission_id,
            response,
        })
        .await?
    }

    pub async fn get_state(&self) -> SessionResult<SessionView> {
        self.request(|response| SessionMessage::GetState { response })
            .await
    }

    /// Receive every event the session emits from now on.
    pub async fn subscribe(&self) -> SessionResult<(SubscriptionId, mpsc::Receiver<GameEvent>)> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let id = self
            .request(|response| SessionMessage::Subscribe { sender, response })
            .await?;
        Ok((id, receiver))
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> SessionResult<bool> {
        self.request(|response| SessionMessage::Unsubscribe { id, response })
            .await
    }

    /// Destroy the session. The actor stops once the close is acknowledged.
    pub async fn close(&self) -> SessionResult<()> {
        self.request(|response| SessionMessage::Close { response })
            .await
    }
}

/// Session actor running a single game session
pub struct SessionActor {
    /// Session ID
    id: SessionId,

    /// The game itself
    session: Session<TokioScheduler>,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Fired countdowns from the session's scheduler
    timers: mpsc::UnboundedReceiver<TimerId>,

    /// Events emitted by the session, waiting to be fanned out
    outbox: mpsc::UnboundedReceiver<GameEvent>,

    /// Subscribers receiving every event
    subscribers: HashMap<SubscriptionId, mpsc::Sender<GameEvent>>,

    next_subscription: u64,

    /// Is session closed
    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Arguments
    ///
    /// * `id` - Session ID
    /// * `config` - Session configuration
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(id: SessionId, config: SessionConfig) -> Result<(Self, SessionHandle), ConfigError> {
        let (scheduler, timers) = TokioScheduler::new();
        let session = Session::new(config, scheduler)?;
        Ok(Self::from_session(id, session, timers))
    }

    /// Like [`SessionActor::new`] with a caller-supplied random source.
    pub fn with_rng(
        id: SessionId,
        config: SessionConfig,
        rng: StdRng,
    ) -> Result<(Self, SessionHandle), ConfigError> {
        let (scheduler, timers) = TokioScheduler::new();
        let session = Session::with_rng(config, scheduler, rng)?;
        Ok(Self::from_session(id, session, timers))
    }

    fn from_session(
        id: SessionId,
        mut session: Session<TokioScheduler>,
        timers: mpsc::UnboundedReceiver<TimerId>,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let (events, outbox) = mpsc::unbounded_channel();
        session.subscribe(move |event: &GameEvent| {
            let _ = events.send(event.clone());
        });

        let actor = Self {
            id,
            session,
            inbox,
            timers,
            outbox,
            subscribers: HashMap::new(),
            next_subscription: 0,
            is_closed: false,
        };

        (actor, SessionHandle::new(sender, id))
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!("Session {} starting", self.id);

        loop {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => {
                        log::debug!("Session {}: all handles dropped", self.id);
                        self.session.destroy();
                        self.is_closed = true;
                    }
                },

                Some(timer) = self.timers.recv() => {
                    self.session.handle_timeout(timer);
                }
            }

            self.flush_events();

            if self.is_closed {
                break;
            }
        }

        log::info!("Session {} closed", self.id);
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::AddPlayer {
                player_id,
                response,
            } => {
                let _ = response.send(self.session.add_player(player_id));
            }

            SessionMessage::RemovePlayer {
                player_id,
                response,
            } => {
                let _ = response.send(self.session.remove_player(player_id));
            }

            SessionMessage::SubmitCards {
                player_id,
                card_ids,
                response,
            } => {
                let _ = response.send(self.session.submit_cards(player_id, &card_ids));
            }

            SessionMessage::PickWinner {
                submission_id,
                response,
            } => {
                let _ = response.send(self.session.pick_winner(submission_id));
            }

            SessionMessage::GetState { response } => {
                let _ = response.send(self.session.get_state());
            }

            SessionMessage::Subscribe { sender, response } => {
                let id = SubscriptionId::new(self.next_subscription);
                self.next_subscription += 1;
                self.subscribers.insert(id, sender);
                log::debug!("Subscriber {} joined session {}", id.raw(), self.id);
                let _ = response.send(id);
            }

            SessionMessage::Unsubscribe { id, response } => {
                let existed = self.subscribers.remove(&id).is_some();
                let _ = response.send(existed);
            }

            SessionMessage::Close { response } => {
                self.session.destroy();
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Fan out every pending session event to all subscribers
    fn flush_events(&mut self) {
        while let Ok(event) = self.outbox.try_recv() {
            let session_id = self.id;
            self.subscribers.retain(|sub_id, sender| {
                match sender.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!(
                            "Session {session_id}: subscriber {} channel full, dropping {}",
                            sub_id.raw(),
                            event.kind()
                        );
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        log::debug!(
                            "Session {session_id}: subscriber {} disconnected, removing",
                            sub_id.raw()
                        );
                        false
                    }
                }
            });
        }
    }
}
