//! # Party Cards
//!
//! Session engine for a fill-in-the-blank party card game.
//!
//! Each round one player is the judge (the "czar"). A black prompt card is
//! drawn, every other player answers with white cards from their hand, and
//! the judge picks the winning answer. A session owns its players, hands,
//! scores, both card pools, and a single countdown that drives the timed
//! phases:
//!
//! - **WAITING_FOR_PLAYERS**: fewer players than the configured minimum
//! - **COUNTDOWN_TO_GAME**: enough players, the next round is about to start
//! - **GAME_PLAYING**: players submit their answers
//! - **CZAR_PICKING**: the judge picks a winner
//! - **CZAR_PICKED**: the winner is shown before the next countdown
//!
//! ## Core Modules
//!
//! - [`game`]: Session state machine, entities, decks, and events
//! - [`session`]: Async actor wrapper and multi-session manager
//!
//! ## Example
//!
//! ```
//! use party_cards::{ManualScheduler, Session, SessionConfig, entities::Status};
//! use std::time::Duration;
//!
//! let mut session = Session::new(SessionConfig::default(), ManualScheduler::new()).unwrap();
//! session.add_player("alice").unwrap();
//! session.add_player("bob").unwrap();
//! assert_eq!(session.status(), Status::CountdownToGame);
//!
//! session.advance(Duration::from_secs(15));
//! assert_eq!(session.status(), Status::GamePlaying);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ConfigError, Countdowns, EventDispatcher, GameEvent, ManualScheduler, Scheduler, Session,
    SessionConfig, SessionError, SessionResult, SubscriptionId, TimerId, TokioScheduler,
    constants::{self, HAND_SIZE},
    entities::{self, PlayerId, SessionView, Status},
};

/// Async session actors and the session manager.
pub mod session;
pub use session::{SessionHandle, SessionManager};
