//! Session manager for spawning and managing multiple session actors.

use super::{
    actor::{SessionActor, SessionHandle},
    messages::SessionId,
};
use crate::game::{config::SessionConfig, entities::Status, errors::ConfigError};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Session metadata for discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub status: Status,
    pub player_count: usize,
    pub max_players: usize,
}

/// Session manager for managing multiple session instances
#[derive(Clone, Debug, Default)]
pub struct SessionManager {
    /// Active session handles
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,

    /// Next session ID
    next_session_id: Arc<RwLock<SessionId>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and spawn a new session
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration
    ///
    /// # Returns
    ///
    /// * `Result<SessionId, ConfigError>` - Session ID or configuration error
    pub async fn create_session(&self, config: SessionConfig) -> Result<SessionId, ConfigError> {
        let mut next_id = self.next_session_id.write().await;
        let session_id = *next_id;

        let (actor, handle) = SessionActor::new(session_id, config)?;
        *next_id += 1;
        drop(next_id);

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, handle);
        drop(sessions);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned session {}", session_id);

        Ok(session_id)
    }

    /// Get a session handle
    pub async fn get_session(&self, session_id: SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(&session_id).cloned()
    }

    /// List all live sessions, in id order
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let handles: Vec<SessionHandle> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            // Sessions that stopped on their own are skipped.
            let Ok(view) = handle.get_state().await else {
                continue;
            };
            summaries.push(SessionSummary {
                id: handle.session_id(),
                status: view.status,
                player_count: view.player_ids.len(),
                max_players: view.max_players,
            });
        }
        summaries.sort_by_key(|summary| summary.id);
        summaries
    }

    /// Close a session
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the session was known to this manager
    pub async fn close_session(&self, session_id: SessionId) -> bool {
        let handle = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(&session_id)
        };

        let Some(handle) = handle else {
            return false;
        };

        if handle.close().await.is_err() {
            log::debug!("Session {} had already stopped", session_id);
        }
        log::info!("Closed session {}", session_id);

        true
    }

    /// Get active session count
    pub async fn active_session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
