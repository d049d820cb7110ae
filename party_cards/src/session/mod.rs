//! Session module providing multi-session support with async actor model.
//!
//! Each session runs in a separate Tokio task with an mpsc message inbox.
//! The task owns a [`Session`](crate::game::state_machine::Session) driven
//! by a [`TokioScheduler`](crate::game::scheduler::TokioScheduler), so
//! player commands and countdown firings are applied one at a time.
//! The [`SessionManager`] spawns and indexes many independent sessions.
//!
//! ## Example
//!
//! ```no_run
//! use party_cards::{SessionConfig, session::SessionManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = SessionManager::new();
//!     let id = manager.create_session(SessionConfig::default()).await.unwrap();
//!     let handle = manager.get_session(id).await.unwrap();
//!
//!     let (_, mut events) = handle.subscribe().await.unwrap();
//!     handle.add_player("alice").await.unwrap();
//!     handle.add_player("bob").await.unwrap();
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{event}");
//!     }
//! }
//! ```

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{SUBSCRIBER_CAPACITY, SessionActor, SessionHandle};
pub use manager::{SessionManager, SessionSummary};
pub use messages::{SessionId, SessionMessage};
