use std::{path::PathBuf, time::Duration};

use blockfall_engine::{
    GameLoop, GameSession, PieceSeed, RecordingRenderer, RenderEvent, RunSummary,
};
use serde::Serialize;

use crate::{
    input::RandomInput,
    util::{self, Output},
};

const TRACE_INPUT_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TraceArg {
    /// Piece seed as 32 hex digits
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Virtual time limit, in seconds
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,
    /// Game config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Trace {
    seed: PieceSeed,
    summary: RunSummary,
    events: Vec<RenderEvent>,
    /// Final board, one string per row, `#` for occupied squares.
    board: Vec<String>,
}

pub(crate) fn run(arg: &TraceArg) -> anyhow::Result<()> {
    let TraceArg {
        seed,
        duration_secs,
        config,
        output,
    } = arg;

    let mut config = util::load_game_config(config.as_deref(), *seed)?;
    let seed = *config.seed.get_or_insert_with(rand::random);

    eprintln!("Tracing game with seed {seed}...");
    let session = GameSession::new(&config, RecordingRenderer::new())?;
    let mut game_loop = GameLoop::new(session);
    let summary = game_loop.run(
        RandomInput::new(seed, TRACE_INPUT_INTERVAL),
        Duration::from_secs(*duration_secs),
    );

    let session = game_loop.into_session();
    let board = session.board().to_string().lines().map(str::to_owned).collect();
    let events = session.into_renderer().into_events();
    eprintln!(
        "Recorded {} events, score {}{}",
        events.len(),
        summary.stats.score(),
        if summary.game_over { ", game over" } else { "" },
    );

    Output::save_json(
        &Trace {
            seed,
            summary,
            events,
            board,
        },
        output.clone(),
    )?;
    Ok(())
}
