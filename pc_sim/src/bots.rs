//! Scripted players.
//!
//! Bots answer with a random card from their hand while a round is being
//! played, and the bot holding the judge seat picks a random submission.

use party_cards::{
    PlayerId, SessionHandle, SessionResult, SessionView,
    entities::{CardId, Status, SubmissionId},
};
use rand::{Rng, rngs::StdRng, seq::IndexedRandom};

/// Bots that answer for the players they control
pub struct BotTable {
    handle: SessionHandle,
    bots: Vec<PlayerId>,
    rng: StdRng,
}

impl BotTable {
    pub fn new(handle: SessionHandle, count: usize, rng: StdRng) -> Self {
        let bots = (1..=count)
            .map(|i| PlayerId::new(&format!("bot-{i}")))
            .collect();
        Self { handle, bots, rng }
    }

    pub fn bots(&self) -> &[PlayerId] {
        &self.bots
    }

    /// Seat every bot in the session
    pub async fn join_all(&self) -> SessionResult<()> {
        for bot in &self.bots {
            self.handle.add_player(bot.clone()).await?;
        }
        Ok(())
    }

    /// Make whatever moves the current phase calls for
    pub async fn act(&mut self) -> SessionResult<()> {
        let view = self.handle.get_state().await?;

        match view.status {
            Status::GamePlaying => {
                for (bot, card) in pick_answers(&view, &self.bots, &mut self.rng) {
                    log::debug!("{bot} plays card {card}");
                    // A stale snapshot can race the round ending; the session
                    // has the final say.
                    if let Err(e) = self.handle.submit_cards(bot.clone(), vec![card]).await {
                        log::debug!("{bot} could not submit: {e}");
                    }
                }
            }
            Status::CzarPicking => {
                if let Some(submission) = pick_winning_submission(&view, &self.bots, &mut self.rng) {
                    if let Err(e) = self.handle.pick_winner(submission).await {
                        log::debug!("Judge could not pick: {e}");
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// One random card for each bot that still owes an answer this round.
pub fn pick_answers<R: Rng + ?Sized>(
    view: &SessionView,
    bots: &[PlayerId],
    rng: &mut R,
) -> Vec<(PlayerId, CardId)> {
    bots.iter()
        .filter(|bot| view.czar_id.as_ref() != Some(*bot))
        .filter(|bot| view.submission_of(bot).is_none())
        .filter_map(|bot| {
            let deck = view.player_decks.get(bot)?;
            let card = deck.cards().choose(rng)?;
            Some((bot.clone(), card.id))
        })
        .collect()
}

/// A random submission, if the judge is one of our bots.
pub fn pick_winning_submission<R: Rng + ?Sized>(
    view: &SessionView,
    bots: &[PlayerId],
    rng: &mut R,
) -> Option<SubmissionId> {
    let judge = view.czar_id.as_ref()?;
    if !bots.contains(judge) {
        return None;
    }

    let mut ids: Vec<SubmissionId> = view.submitted_cards.as_ref()?.keys().copied().collect();
    ids.sort();
    ids.choose(rng).copied()
}
