//! The session state machine.
//!
//! A [`Session`] owns all mutable game state, validates every
//! player-initiated operation, and drives the timed phases through a single
//! countdown armed on its [`Scheduler`]. Every operation runs to completion
//! before returning, so a session needs no internal locking.

use chrono::{DateTime, TimeDelta, Utc};
use log::Level;
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use super::{
    config::SessionConfig,
    czar::next_czar,
    deck::DeckManager,
    entities::{
        CardId, Countdown, PlayerDeck, PlayerId, ResetReason, SessionView, Status, Submission,
        SubmissionId, Winner,
    },
    errors::{ConfigError, SessionError, SessionResult},
    events::{EventDispatcher, GameEvent, SubscriptionId},
    scheduler::{ManualScheduler, Scheduler, TimerId},
};

/// Upper bound on timers fired by one `Session::advance` call. Only reached
/// when every countdown is zero and the phases cycle forever.
const MAX_FIRINGS_PER_ADVANCE: usize = 10_000;

/// Submissions of the current round, keyed both ways.
#[derive(Debug, Default)]
struct Submissions {
    cards: HashMap<SubmissionId, Submission>,
    players: HashMap<PlayerId, SubmissionId>,
}

/// Mutable per-session game data.
#[derive(Debug, Default)]
struct GameData {
    status: Status,
    black_card: Option<String>,
    czar_id: Option<PlayerId>,
    player_ids: Vec<PlayerId>,
    player_decks: HashMap<PlayerId, PlayerDeck>,
    player_scores: HashMap<PlayerId, u32>,
    /// Present only while a round is running or just finished.
    submissions: Option<Submissions>,
    winner: Option<Winner>,
    reason: Option<ResetReason>,
}

/// The countdown currently armed on the scheduler.
#[derive(Clone, Copy, Debug)]
struct ArmedCountdown {
    id: TimerId,
    kind: Countdown,
    until: Option<DateTime<Utc>>,
}

/// What a reset does with the judge.
#[derive(Clone, Debug, PartialEq)]
enum CzarCarry {
    Keep,
    Replace(Option<PlayerId>),
}

/// A single game session.
pub struct Session<S: Scheduler> {
    config: SessionConfig,
    max_players: usize,
    decks: DeckManager,
    data: GameData,
    scheduler: S,
    countdown: Option<ArmedCountdown>,
    dispatcher: EventDispatcher,
    destroyed: bool,
}

impl<S: Scheduler> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.data.status)
            .field("player_ids", &self.data.player_ids)
            .field("czar_id", &self.data.czar_id)
            .field("countdown", &self.countdown)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<S: Scheduler> Session<S> {
    /// Create a session whose shuffles are seeded from the OS.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the black deck is empty or the white
    /// deck cannot deal a hand to `max_players` players.
    pub fn new(config: SessionConfig, scheduler: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, scheduler, StdRng::from_os_rng())
    }

    /// Create a session drawing all randomness (shuffles and identifiers)
    /// from `rng`. A seeded `rng` makes the whole session deterministic.
    pub fn with_rng(config: SessionConfig, scheduler: S, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let max_players = config.max_players();
        let decks = DeckManager::new(config.white_deck.clone(), config.black_deck.clone(), rng);

        let session = Self {
            max_players,
            decks,
            data: GameData::default(),
            scheduler,
            countdown: None,
            dispatcher: EventDispatcher::new(),
            destroyed: false,
            config,
        };
        session.log(format_args!(
            "Session created for {}-{} players",
            session.config.min_players, session.max_players
        ));
        Ok(session)
    }

    // Public API

    /// Add a player and deal them a hand.
    pub fn add_player(&mut self, player_id: impl Into<PlayerId>) -> SessionResult<()> {
        self.ensure_alive()?;
        let player_id = player_id.into();

        if self.data.player_ids.contains(&player_id) {
            return Err(SessionError::AlreadyInGame);
        }

        if self.data.player_ids.len() >= self.max_players {
            return Err(SessionError::GameFull);
        }

        let deck = self.decks.deal_hand().ok_or(SessionError::InternalState)?;
        let texts = deck.texts();

        self.data.player_ids.push(player_id.clone());
        self.data.player_decks.insert(player_id.clone(), deck);
        self.data.player_scores.insert(player_id.clone(), 0);
        self.log(format_args!("Player {player_id} joined"));

        self.emit(GameEvent::PlayerAdded(player_id.clone()));
        self.emit(GameEvent::DeckChange {
            deck: texts,
            player_id,
            added_to_deck: None,
        });

        if self.data.status == Status::WaitingForPlayers {
            self.reset(None, CzarCarry::Keep);
        }

        Ok(())
    }

    /// Remove a player, returning their hand to the white pool.
    pub fn remove_player(&mut self, player_id: impl Into<PlayerId>) -> SessionResult<()> {
        self.ensure_alive()?;
        let player_id = player_id.into();

        if !self.data.player_ids.contains(&player_id) {
            return Err(SessionError::NotInGame);
        }

        let was_czar = self.data.czar_id.as_ref() == Some(&player_id);
        let successor = next_czar(&self.data.player_ids, Some(&player_id));

        if was_czar && self.data.status.is_czar_dependent() {
            self.remove_id(&player_id);
            self.reset(Some(ResetReason::CzarLeft), CzarCarry::Replace(successor));
            return Ok(());
        }

        if was_czar && self.data.status == Status::CountdownToGame {
            self.data.czar_id = successor;
            self.remove_id(&player_id);
            self.ensure_game_valid();
            self.emit_state();
            return Ok(());
        }

        if was_czar {
            self.data.czar_id = successor;
        }

        self.remove_id(&player_id);
        self.ensure_game_valid();

        if self.data.status == Status::GamePlaying && self.all_submitted() {
            self.enter_czar_picking();
        } else {
            self.emit_state();
        }

        Ok(())
    }

    /// Submit white cards from `player_id`'s hand as their answer.
    pub fn submit_cards(&mut self, player_id: impl Into<PlayerId>, card_ids: &[CardId]) -> SessionResult<()> {
        self.ensure_alive()?;
        let player_id = player_id.into();
        self.check_can_submit(&player_id)?;

        let unique: HashSet<&CardId> = card_ids.iter().collect();
        if card_ids.is_empty() || unique.len() != card_ids.len() {
            return Err(SessionError::InvalidCards);
        }

        let deck = self
            .data
            .player_decks
            .get(&player_id)
            .ok_or(SessionError::InternalState)?;
        let cards = card_ids
            .iter()
            .map(|id| deck.get(id).cloned())
            .collect::<Option<Vec<_>>>()
            .ok_or(SessionError::InvalidCards)?;

        let submission_id = self.decks.new_id();
        let submission = Submission {
            id: submission_id,
            player_id: player_id.clone(),
            card_ids: card_ids.to_vec(),
            cards,
            submitted_at: Utc::now(),
        };

        let submissions = self
            .data
            .submissions
            .as_mut()
            .ok_or(SessionError::InternalState)?;
        submissions.players.insert(player_id.clone(), submission_id);
        submissions.cards.insert(submission_id, submission);
        self.log(format_args!("Player {player_id} submitted {} card(s)", card_ids.len()));

        if self.all_submitted() {
            self.enter_czar_picking();
        } else {
            self.emit_state();
        }

        Ok(())
    }

    /// Like [`Session::submit_cards`], for identifiers that arrive as text.
    /// Anything that does not parse as a card identifier is rejected as
    /// invalid cards.
    pub fn submit_card_strings<T: AsRef<str>>(
        &mut self,
        player_id: impl Into<PlayerId>,
        card_ids: &[T],
    ) -> SessionResult<()> {
        self.ensure_alive()?;
        let player_id = player_id.into();
        self.check_can_submit(&player_id)?;

        let card_ids = card_ids
            .iter()
            .map(|id| CardId::parse_str(id.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SessionError::InvalidCards)?;

        self.submit_cards(player_id, &card_ids)
    }

    /// The judge picks the winning submission.
    pub fn pick_winner(&mut self, submission_id: SubmissionId) -> SessionResult<()> {
        self.ensure_alive()?;

        if self.data.status != Status::CzarPicking {
            return Err(SessionError::CannotPickWinner);
        }

        let submissions = self
            .data
            .submissions
            .as_ref()
            .ok_or(SessionError::InternalState)?;
        let submission = submissions
            .cards
            .get(&submission_id)
            .cloned()
            .ok_or(SessionError::UnknownSubmission)?;

        if !self.data.player_scores.contains_key(&submission.player_id) {
            return Err(SessionError::InternalState);
        }

        // Hands to refresh, in seating order.
        let played: Vec<(PlayerId, Vec<CardId>)> = self
            .data
            .player_ids
            .iter()
            .filter_map(|id| {
                let sub_id = submissions.players.get(id)?;
                let sub = submissions.cards.get(sub_id)?;
                Some((id.clone(), sub.card_ids.clone()))
            })
            .collect();

        self.cancel_countdown();

        self.data.status = Status::CzarPicked;
        self.data.czar_id = next_czar(&self.data.player_ids, self.data.czar_id.as_ref());

        let winner_id = submission.player_id.clone();
        self.data.winner = Some(Winner {
            submission,
            black_card: self.data.black_card.clone(),
        });

        let mut score = 0;
        if let Some(entry) = self.data.player_scores.get_mut(&winner_id) {
            *entry += 1;
            score = *entry;
        }
        self.log(format_args!("Player {winner_id} won the round (score {score})"));
        self.emit(GameEvent::PlayerScored {
            player_id: winner_id,
            score,
        });

        for (player_id, card_ids) in played {
            let added = self.replace_cards(&player_id, &card_ids);
            let deck = self
                .data
                .player_decks
                .get(&player_id)
                .map(PlayerDeck::texts)
                .unwrap_or_default();
            self.emit(GameEvent::DeckChange {
                deck,
                player_id,
                added_to_deck: Some(added),
            });
        }

        self.arm(Countdown::ResetGame, self.config.countdowns.winner_picked());
        self.emit_state();

        Ok(())
    }

    /// Snapshot of the full current state.
    pub fn get_state(&self) -> SessionView {
        let submissions = self.data.submissions.as_ref();
        SessionView {
            min_players: self.config.min_players,
            max_players: self.max_players,
            status: self.data.status,
            black_card: self.data.black_card.clone(),
            czar_id: self.data.czar_id.clone(),
            player_ids: self.data.player_ids.clone(),
            player_decks: self.data.player_decks.clone(),
            player_scores: self.data.player_scores.clone(),
            submitted_cards: submissions.map(|s| s.cards.clone()),
            submitted_players: submissions.map(|s| s.players.clone()),
            winner: self.data.winner.clone(),
            reason: self.data.reason,
            countdown: self.countdown.map(|c| c.kind),
            countdown_until: self.countdown.and_then(|c| c.until),
            white_pool_size: self.decks.white_pool().len(),
            black_pool_size: self.decks.black_pool().len(),
        }
    }

    /// Register a listener for every event this session emits.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.dispatcher.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Cancel the pending countdown and make the session inert. Further
    /// operations fail with [`SessionError::SessionDestroyed`] and late
    /// timer firings are ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.cancel_countdown();
        self.destroyed = true;
        self.log(format_args!("Session destroyed"));
    }

    /// Re-enter the session for a fired timer. Timers that are no longer
    /// the armed countdown are ignored.
    pub fn handle_timeout(&mut self, id: TimerId) {
        if self.destroyed {
            return;
        }

        let kind = match self.countdown {
            Some(armed) if armed.id == id => armed.kind,
            _ => {
                log::debug!("Ignoring stale timer {}", id.raw());
                return;
            }
        };
        self.countdown = None;
        self.log(format_args!("Countdown '{kind}' fired in {}", self.data.status));

        match kind {
            Countdown::StartGame => self.start_game(),
            Countdown::CzarPicking => self.enter_czar_picking(),
            Countdown::SkipCzar => self.skip_czar(),
            Countdown::ResetGame => self.reset(None, CzarCarry::Keep),
        }
    }

    // Accessors

    pub fn status(&self) -> Status {
        self.data.status
    }

    pub fn czar_id(&self) -> Option<&PlayerId> {
        self.data.czar_id.as_ref()
    }

    pub fn player_ids(&self) -> &[PlayerId] {
        &self.data.player_ids
    }

    pub fn player_deck(&self, player_id: &PlayerId) -> Option<&PlayerDeck> {
        self.data.player_decks.get(player_id)
    }

    pub fn score(&self, player_id: &PlayerId) -> Option<u32> {
        self.data.player_scores.get(player_id).copied()
    }

    /// Id of the submission `player_id` made this round.
    pub fn submission_id_of(&self, player_id: &PlayerId) -> Option<SubmissionId> {
        self.data
            .submissions
            .as_ref()?
            .players
            .get(player_id)
            .copied()
    }

    pub fn pending_countdown(&self) -> Option<Countdown> {
        self.countdown.map(|c| c.kind)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    // Internal transitions

    fn start_game(&mut self) {
        let czar_present = self
            .data
            .czar_id
            .as_ref()
            .is_some_and(|czar| self.data.player_ids.contains(czar));
        if !czar_present {
            self.data.czar_id = next_czar(&self.data.player_ids, None);
        }

        self.data.black_card = self.decks.draw_black();
        if self.data.black_card.is_none() {
            log::error!("Black deck produced no card; starting round without a prompt");
        }

        self.data.status = Status::GamePlaying;
        self.data.reason = None;
        self.data.winner = None;
        self.data.submissions = Some(Submissions::default());

        self.arm(Countdown::CzarPicking, self.config.countdowns.game_duration());
        self.emit_state();
    }

    fn enter_czar_picking(&mut self) {
        self.data.status = Status::CzarPicking;

        let skipped: Vec<PlayerId> = self
            .data
            .player_ids
            .iter()
            .filter(|id| Some(*id) != self.data.czar_id.as_ref())
            .filter(|id| {
                !self
                    .data
                    .submissions
                    .as_ref()
                    .is_some_and(|s| s.players.contains_key(*id))
            })
            .cloned()
            .collect();
        for id in skipped {
            self.emit(GameEvent::PlayerSkipped(id));
        }

        let submitted = self
            .data
            .submissions
            .as_ref()
            .map_or(0, |s| s.players.len());
        if submitted < self.config.min_players.saturating_sub(1) {
            self.reset(Some(ResetReason::TooManySkipped), CzarCarry::Keep);
            return;
        }

        self.arm(Countdown::SkipCzar, self.config.countdowns.czar_picking());
        self.emit_state();
    }

    fn skip_czar(&mut self) {
        if let Some(czar) = self.data.czar_id.clone() {
            self.emit(GameEvent::PlayerSkipped(czar));
        }
        let successor = next_czar(&self.data.player_ids, self.data.czar_id.as_ref());
        self.reset(Some(ResetReason::CzarSkipped), CzarCarry::Replace(successor));
    }

    /// Throw away the current round and count down to the next one if
    /// enough players remain.
    fn reset(&mut self, reason: Option<ResetReason>, carry: CzarCarry) {
        self.cancel_countdown();

        self.data.black_card = None;
        self.data.submissions = None;
        self.data.reason = reason;
        if let CzarCarry::Replace(czar) = carry {
            self.data.czar_id = czar;
        }

        if self.data.player_ids.len() >= self.config.min_players {
            self.data.status = Status::CountdownToGame;
            self.arm(Countdown::StartGame, self.config.countdowns.countdown_to_game());
            self.emit_state();
        } else if self.data.status != Status::WaitingForPlayers {
            self.data.status = Status::WaitingForPlayers;
            self.emit_state();
        }
    }

    /// Fall back to waiting when too few players remain.
    fn ensure_game_valid(&mut self) {
        if self.data.player_ids.len() < self.config.min_players
            && self.data.status != Status::WaitingForPlayers
        {
            self.cancel_countdown();
            self.data.black_card = None;
            self.data.czar_id = None;
            self.data.status = Status::WaitingForPlayers;
            self.data.submissions = None;
        }
    }

    // Helpers

    fn ensure_alive(&self) -> SessionResult<()> {
        if self.destroyed {
            return Err(SessionError::SessionDestroyed);
        }
        Ok(())
    }

    fn check_can_submit(&self, player_id: &PlayerId) -> SessionResult<()> {
        if self.data.status != Status::GamePlaying {
            return Err(SessionError::CannotSubmit);
        }

        if !self.data.player_ids.contains(player_id) {
            return Err(SessionError::NotInGame);
        }

        if self.data.czar_id.as_ref() == Some(player_id) {
            return Err(SessionError::CzarCannotSubmit);
        }

        let submissions = self
            .data
            .submissions
            .as_ref()
            .ok_or(SessionError::InternalState)?;
        if submissions.players.contains_key(player_id) {
            return Err(SessionError::AlreadySubmitted);
        }

        Ok(())
    }

    /// Whether every player other than the judge has submitted.
    fn all_submitted(&self) -> bool {
        let Some(submissions) = self.data.submissions.as_ref() else {
            return false;
        };
        self.data
            .player_ids
            .iter()
            .filter(|id| Some(*id) != self.data.czar_id.as_ref())
            .all(|id| submissions.players.contains_key(id))
    }

    fn remove_id(&mut self, player_id: &PlayerId) {
        self.data.player_ids.retain(|id| id != player_id);
        self.data.player_scores.remove(player_id);

        if let Some(deck) = self.data.player_decks.remove(player_id) {
            for card in deck.into_cards() {
                self.decks.return_white(card.text);
            }
        }

        if let Some(submissions) = self.data.submissions.as_mut()
            && let Some(submission_id) = submissions.players.remove(player_id)
        {
            submissions.cards.remove(&submission_id);
        }

        self.log(format_args!("Player {player_id} left"));
        self.emit(GameEvent::PlayerRemoved(player_id.clone()));
    }

    /// Return each played card to the pool and deal a replacement,
    /// returning the texts of the new cards.
    fn replace_cards(&mut self, player_id: &PlayerId, card_ids: &[CardId]) -> Vec<String> {
        let mut added = Vec::with_capacity(card_ids.len());

        for card_id in card_ids {
            let Some(deck) = self.data.player_decks.get_mut(player_id) else {
                log::error!("Player {player_id} has no deck to refill");
                break;
            };
            let Some(played) = deck.get(card_id).map(|card| card.text.clone()) else {
                log::error!("Card {card_id} missing from {player_id}'s deck");
                continue;
            };

            self.decks.return_white(played);
            let Some(replacement) = self.decks.draw_white() else {
                log::error!("White deck produced no card for {player_id}");
                continue;
            };

            added.push(replacement.text.clone());
            deck.replace(card_id, replacement);
        }

        added
    }

    fn arm(&mut self, kind: Countdown, delay: Duration) {
        self.cancel_countdown();
        let id = self.scheduler.arm(delay);
        let until = TimeDelta::from_std(delay)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta));
        self.countdown = Some(ArmedCountdown { id, kind, until });
        self.log(format_args!("Countdown '{kind}' armed for {}s", delay.as_secs()));
    }

    fn cancel_countdown(&mut self) {
        if let Some(armed) = self.countdown.take() {
            self.scheduler.cancel(armed.id);
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.dispatcher.emit(&event);
    }

    fn emit_state(&mut self) {
        let view = self.get_state();
        self.log(format_args!("State changed to {}", view.status));
        self.emit(GameEvent::StateChanged(Box::new(view)));
    }

    fn log(&self, args: std::fmt::Arguments<'_>) {
        let level = if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        log::log!(level, "{args}");
    }
}

impl Session<ManualScheduler> {
    /// Move the manual clock forward by `by`, firing every countdown that
    /// comes due on the way, including ones armed by earlier firings.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        let mut fired = 0;

        while let Some(id) = self.scheduler.pop_due(until) {
            self.handle_timeout(id);
            fired += 1;
            if fired >= MAX_FIRINGS_PER_ADVANCE {
                log::warn!("Stopped advancing after {fired} timer firings");
                break;
            }
        }

        self.scheduler.set_now(until);
    }

    /// Fire the armed countdown immediately, whatever its deadline.
    pub fn fire_countdown(&mut self) -> Option<Countdown> {
        let armed = self.countdown?;
        let remaining = self
            .scheduler
            .pending()
            .iter()
            .find(|(id, _)| *id == armed.id)
            .map(|(_, deadline)| deadline.saturating_sub(self.scheduler.now()))
            .unwrap_or_default();
        self.advance(remaining);
        Some(armed.kind)
    }
}
