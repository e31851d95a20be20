use std::{path::PathBuf, time::Duration};

use blockfall_engine::{GameLoop, GameSession, NullRenderer, PieceSeed, RunSummary};
use serde::Serialize;

use crate::{
    input::RandomInput,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: u32,
    /// Piece seed of the first game as 32 hex digits; later games count up from it
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Virtual time limit per game, in seconds
    #[arg(long, default_value_t = 600)]
    duration_secs: u64,
    /// Virtual time between random commands, in milliseconds
    #[arg(long, default_value_t = 250)]
    input_interval_ms: u64,
    /// Game config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct GameSummary {
    game: u32,
    seed: PieceSeed,
    #[serde(flatten)]
    run: RunSummary,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        games,
        seed,
        duration_secs,
        input_interval_ms,
        config,
        output,
    } = arg;

    let base_config = util::load_game_config(config.as_deref(), None)?;
    let first_seed = seed.or(base_config.seed).unwrap_or_else(rand::random);
    let until = Duration::from_secs(*duration_secs);
    let interval = Duration::from_millis((*input_interval_ms).max(1));

    eprintln!("Simulating {games} games from seed {first_seed}...");
    let mut summaries = Vec::new();
    for game in 0..*games {
        let seed = PieceSeed::from_u128(first_seed.as_u128().wrapping_add(u128::from(game)));
        let session = GameSession::new(&base_config.clone().with_seed(seed), NullRenderer)?;
        let mut game_loop = GameLoop::new(session);
        let run = game_loop.run(RandomInput::new(seed, interval), until);

        eprintln!(
            "Game {}/{games}: score {}, level {}, pieces {}, {:.1}s{}",
            game + 1,
            run.stats.score(),
            run.level,
            run.stats.completed_pieces(),
            Duration::from_millis(run.elapsed_ms).as_secs_f64(),
            if run.game_over { ", game over" } else { "" },
        );
        summaries.push(GameSummary { game, seed, run });
    }

    if let Some(best) = summaries.iter().max_by_key(|s| s.run.stats.score()) {
        let total: u64 = summaries
            .iter()
            .map(|s| u64::from(s.run.stats.score()))
            .sum();
        eprintln!(
            "Best score {} (game {}), total {total}",
            best.run.stats.score(),
            best.game + 1,
        );
    }

    Output::save_json(&summaries, output.clone())?;
    Ok(())
}
