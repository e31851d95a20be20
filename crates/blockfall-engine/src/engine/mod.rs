//! Game flow on top of the core data structures.
//!
//! - [`GameSession`] - The controller: falling piece, locking, row clears,
//!   score, level and game over
//! - [`GameLoop`] - Drives a session on virtual time, interleaving gravity
//!   ticks and player commands
//! - [`TickScheduler`] - Self-rescheduling gravity timer with cancellation
//! - [`Command`] - The five logical inputs
//! - [`GameStats`] - Score and lock statistics
//! - [`SpeedCurve`] / [`GameConfig`] - Level thresholds and fall delays
//! - [`PieceGenerator`] / [`PieceSeed`] - Deterministic random piece sequence
//!
//! # Game Flow
//!
//! 1. A session spawns a random piece at the top of an empty board
//! 2. Each tick moves it down; commands move, rotate or drop it
//! 3. A piece that cannot move down locks, complete rows are removed and the
//!    score, level and delay are updated
//! 4. The next piece spawns; if it has no room the game is over
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use blockfall_engine::{Command, GameLoop, GameSession, RecordingRenderer, PieceSeed};
//!
//! let session = GameSession::with_seed(PieceSeed::from_u128(1), RecordingRenderer::new());
//! let mut game = GameLoop::new(session);
//!
//! game.advance_to(Duration::from_millis(2500));
//! game.handle(Command::MoveRight);
//! game.handle(Command::HardDrop);
//!
//! assert_eq!(game.ticks(), 2);
//! assert_eq!(game.session().board().occupied_count(), 4);
//! ```

pub use self::{
    command::*, game_config::*, game_loop::*, game_session::*, game_stats::*,
    piece_generator::*, speed_curve::*, tick_scheduler::*,
};

mod command;
mod game_config;
mod game_loop;
mod game_session;
mod game_stats;
mod piece_generator;
mod speed_curve;
mod tick_scheduler;
