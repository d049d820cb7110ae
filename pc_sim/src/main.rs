//! Simulated party card game.
//!
//! Spawns one session actor, seats scripted bots in it, and prints every
//! event until the requested number of rounds has a winner.

mod bots;
mod config;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use party_cards::{GameEvent, session::SessionActor};
use pico_args::Arguments;
use rand::{SeedableRng, rngs::StdRng};

use bots::BotTable;
use config::{Overrides, SimConfig};

const HELP: &str = "\
Run a simulated party card game with scripted bots

USAGE:
  pc_sim [OPTIONS]

OPTIONS:
  --bots        N         Number of bots to seat         [default: env PC_BOTS or 4]
  --rounds      N         Rounds to play before exiting  [default: env PC_ROUNDS or 3]
  --seed        N         Seed for a reproducible game   [default: env PC_SEED or random]
  --white-deck  PATH      White cards, one per line      [default: env PC_WHITE_DECK or built-in]
  --black-deck  PATH      Black cards, one per line      [default: env PC_BLACK_DECK or built-in]

FLAGS:
  -v, --verbose           Log every transition at info level
  -h, --help              Print help information

ENVIRONMENT:
  PC_MIN_PLAYERS          Players needed to start a round
  PC_MAX_PLAYERS          Player cap
  PC_COUNTDOWN_TO_GAME    Seconds before a round starts
  PC_GAME_DURATION        Seconds players have to answer
  PC_CZAR_PICKING         Seconds the judge has to pick
  PC_WINNER_PICKED        Seconds the winner is shown
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bots: pargs.opt_value_from_str("--bots")?,
        rounds: pargs.opt_value_from_str("--rounds")?,
        seed: pargs.opt_value_from_str("--seed")?,
        white_deck: pargs.opt_value_from_str("--white-deck")?,
        black_deck: pargs.opt_value_from_str("--black-deck")?,
        verbose: pargs.contains(["-v", "--verbose"]),
    };
    let config = SimConfig::from_env(overrides)?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!(
        "Simulating {} round(s) with {} bots",
        config.rounds, config.bots
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let session_rng = StdRng::seed_from_u64(rand::Rng::random(&mut rng));

    let (actor, handle) = SessionActor::with_rng(0, config.session.clone(), session_rng)?;
    tokio::spawn(actor.run());

    let (_, mut events) = handle.subscribe().await?;
    let mut table = BotTable::new(handle.clone(), config.bots, rng);
    table.join_all().await?;
    info!("Seated {}", table.bots().len());

    let mut rounds_played = 0;
    while let Some(event) = events.recv().await {
        match &event {
            GameEvent::StateChanged(view) => {
                match &view.black_card {
                    Some(card) => println!("[{}] {}", view.status, card),
                    None => println!("[{}]", view.status),
                }
                if let Some(reason) = view.reason {
                    println!("  ({reason})");
                }
                table.act().await?;
            }
            GameEvent::PlayerScored { .. } => {
                println!("{event}");
                rounds_played += 1;
                if rounds_played >= config.rounds {
                    break;
                }
            }
            _ => println!("{event}"),
        }
    }

    let scores = handle.get_state().await?.player_scores;
    let mut standings: Vec<_> = scores.into_iter().collect();
    standings.sort_by(|(a_id, a), (b_id, b)| b.cmp(a).then_with(|| a_id.cmp(b_id)));
    println!("Final scores:");
    for (player, score) in standings {
        println!("  {player}: {score}");
    }

    handle.close().await?;
    Ok(())
}
