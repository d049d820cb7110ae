//! Party card game engine.
//!
//! This module provides the session state machine and everything it is
//! built from:
//! - Entities and the snapshot view of a session
//! - White and black card pools
//! - Judge rotation
//! - Events and their dispatcher
//! - Schedulers driving the timed phases

pub mod config;
pub mod constants;
pub mod czar;
pub mod deck;
pub mod decks;
pub mod entities;
pub mod errors;
pub mod events;
pub mod scheduler;
pub mod state_machine;

pub use config::{Countdowns, SessionConfig};
pub use errors::{ConfigError, SessionError, SessionResult};
pub use events::{EventDispatcher, GameEvent, SubscriptionId};
pub use scheduler::{ManualScheduler, Scheduler, TimerId, TokioScheduler};
pub use state_machine::Session;
