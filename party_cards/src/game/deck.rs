//! Card pools for the white and black decks.
//!
//! Each pool is drawn from the front. When a draw empties a pool, the pool
//! is refilled with a fresh shuffle of the full configured deck. Played
//! white cards go back onto the end of the live white pool.

use rand::{RngCore, rngs::StdRng, seq::SliceRandom};
use std::{collections::VecDeque, sync::Arc};
use uuid::{Builder, Uuid};

use super::{
    constants::HAND_SIZE,
    entities::{PlayerDeck, WhiteCard},
};

fn shuffled<R: RngCore + ?Sized>(full_deck: &[String], rng: &mut R) -> VecDeque<String> {
    let mut cards = full_deck.to_vec();
    cards.shuffle(rng);
    cards.into()
}

/// Take the front card of `pool`.
///
/// Returns the card and the pool to use from now on: the remainder of
/// `pool`, or a fresh shuffle of `full_deck` if the draw emptied it.
pub fn draw<R: RngCore + ?Sized>(
    mut pool: VecDeque<String>,
    full_deck: &[String],
    rng: &mut R,
) -> (Option<String>, VecDeque<String>) {
    let card = pool.pop_front();
    if pool.is_empty() {
        pool = shuffled(full_deck, rng);
    }
    (card, pool)
}

/// A live pool of card texts backed by the full configured deck.
#[derive(Debug, Clone)]
pub struct CardPool {
    full: Arc<[String]>,
    live: VecDeque<String>,
}

impl CardPool {
    /// Create a pool holding a shuffle of `full_deck`.
    pub fn new<R: RngCore + ?Sized>(full_deck: Vec<String>, rng: &mut R) -> Self {
        let live = shuffled(&full_deck, rng);
        Self {
            full: full_deck.into(),
            live,
        }
    }

    /// Draw the next card. `None` only when the configured deck is empty.
    pub fn draw<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.live.is_empty() {
            self.live = shuffled(&self.full, rng);
        }
        let (card, live) = draw(std::mem::take(&mut self.live), &self.full, rng);
        self.live = live;
        card
    }

    /// Append a used card to the end of the live pool, unshuffled.
    pub fn put_back(&mut self, text: String) {
        self.live.push_back(text);
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// Owns both decks and the session's random source.
#[derive(Debug)]
pub struct DeckManager {
    white: CardPool,
    black: CardPool,
    rng: StdRng,
}

impl DeckManager {
    pub fn new(white_deck: Vec<String>, black_deck: Vec<String>, mut rng: StdRng) -> Self {
        let white = CardPool::new(white_deck, &mut rng);
        let black = CardPool::new(black_deck, &mut rng);
        Self { white, black, rng }
    }

    /// Mint a card identifier from the session's random source.
    pub fn new_id(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        Builder::from_random_bytes(bytes).into_uuid()
    }

    pub fn draw_white(&mut self) -> Option<WhiteCard> {
        let text = self.white.draw(&mut self.rng)?;
        let id = self.new_id();
        Some(WhiteCard { id, text })
    }

    pub fn draw_black(&mut self) -> Option<String> {
        self.black.draw(&mut self.rng)
    }

    pub fn return_white(&mut self, text: String) {
        self.white.put_back(text);
    }

    /// Deal a full hand of white cards.
    pub fn deal_hand(&mut self) -> Option<PlayerDeck> {
        let cards = (0..HAND_SIZE)
            .map(|_| self.draw_white())
            .collect::<Option<Vec<_>>>()?;
        Some(PlayerDeck::new(cards))
    }

    pub fn white_pool(&self) -> &CardPool {
        &self.white
    }

    pub fn black_pool(&self) -> &CardPool {
        &self.black
    }
}
