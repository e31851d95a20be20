use std::time::Duration;

use serde::Serialize;

use crate::{
    ConfigError,
    core::{
        board::{Board, ClearedRows},
        piece::{Piece, PieceKind},
        render::Renderer,
    },
};

use super::{
    command::Command,
    game_config::GameConfig,
    game_stats::GameStats,
    piece_generator::{PieceGenerator, PieceSeed},
    speed_curve::SpeedCurve,
};

/// Phase of a [`GameSession`].
///
/// `Locking` and `RowClearing` only exist while a lock is being resolved
/// inside a single call; callers observe `Falling` or `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Spawned,
    Falling,
    Locking,
    RowClearing,
    GameOver,
}

/// Result of one gravity step.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// The falling piece moved down one row.
    Moved,
    /// The piece locked and the next piece spawned.
    Locked { cleared_rows: ClearedRows },
    /// The piece locked (or could not be stored) and the game ended.
    GameOver { cleared_rows: ClearedRows },
    /// The session was already over; nothing changed.
    Ignored,
}

/// The game controller.
///
/// Owns the board, the falling piece, the piece generator and the score, and
/// forwards every visual change to its [`Renderer`].
///
/// # Game Flow
///
/// 1. A piece spawns at the top and is drawn
/// 2. Each [`tick`](Self::tick) moves it down one row
/// 3. When it cannot move down it locks, complete rows are cleared and the
///    score, level and delay are updated
/// 4. The next piece spawns; if its squares are taken the game is over
///
/// # Example
///
/// ```
/// use blockfall_engine::{Command, GameSession, NullRenderer, PieceSeed};
///
/// let mut session = GameSession::with_seed(PieceSeed::from_u128(5), NullRenderer);
///
/// session.apply(Command::MoveLeft);
/// session.apply(Command::Rotate);
/// session.tick();
/// session.apply(Command::HardDrop);
///
/// assert_eq!(session.stats().completed_pieces(), 1);
/// assert!(session.state().is_falling());
/// ```
#[derive(Debug)]
pub struct GameSession<R> {
    board: Board,
    falling_piece: Option<Piece>,
    generator: PieceGenerator,
    stats: GameStats,
    speed: SpeedCurve,
    level: u32,
    state: SessionState,
    renderer: R,
}

impl<R> GameSession<R>
where
    R: Renderer,
{
    /// Creates a session from `config` and spawns the first piece.
    pub fn new(config: &GameConfig, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = match config.seed {
            Some(seed) => PieceGenerator::with_seed(seed),
            None => PieceGenerator::new(),
        };
        Ok(Self::with_generator(generator, config.speed.clone(), renderer))
    }

    /// Creates a session with the default speed curve and a fixed seed.
    #[must_use]
    pub fn with_seed(seed: PieceSeed, renderer: R) -> Self {
        Self::with_generator(
            PieceGenerator::with_seed(seed),
            SpeedCurve::default(),
            renderer,
        )
    }

    fn with_generator(generator: PieceGenerator, speed: SpeedCurve, mut renderer: R) -> Self {
        let level = speed.level(0);
        renderer.display_score(0);
        renderer.display_level(level);
        let mut this = Self {
            board: Board::new(),
            falling_piece: None,
            generator,
            stats: GameStats::new(),
            speed,
            level,
            state: SessionState::Spawned,
            renderer,
        };
        this.spawn_next();
        this
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the piece under player control, or `None` once the game is over.
    #[must_use]
    pub fn falling_piece(&self) -> Option<&Piece> {
        self.falling_piece.as_ref()
    }

    /// Returns the kind of the piece that will spawn next.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.generator.peek_next()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.stats.score()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the delay until the next gravity tick at the current score.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.speed.delay(self.stats.score())
    }

    #[must_use]
    pub fn speed_curve(&self) -> &SpeedCurve {
        &self.speed
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Routes a command to the matching operation.
    ///
    /// Returns `false` when the command was rejected or the game is over.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.try_move_left(),
            Command::MoveRight => self.try_move_right(),
            Command::MoveDown => !self.soft_drop().is_ignored(),
            Command::Rotate => self.try_rotate(),
            Command::HardDrop => !self.hard_drop().is_ignored(),
        }
    }

    pub fn try_move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn try_move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// Moves the piece down one row if possible.
    ///
    /// Never locks; see [`Self::soft_drop`] for the player's down command.
    pub fn try_move_down(&mut self) -> bool {
        self.try_move(0, 1)
    }

    /// Player-driven step down.
    ///
    /// Takes the same path as a gravity tick, so a blocked piece locks.
    pub fn soft_drop(&mut self) -> TickOutcome {
        self.tick()
    }

    pub fn try_rotate(&mut self) -> bool {
        let Some(piece) = self.falling_piece.as_mut() else {
            return false;
        };
        if !piece.can_rotate(&self.board) {
            return false;
        }
        piece.rotate(&mut self.renderer);
        true
    }

    /// Performs one gravity step.
    pub fn tick(&mut self) -> TickOutcome {
        if self.try_move_down() {
            return TickOutcome::Moved;
        }
        if self.is_game_over() {
            return TickOutcome::Ignored;
        }
        self.lock_piece()
    }

    /// Drops the piece as far as it goes, then locks it like a tick would.
    pub fn hard_drop(&mut self) -> TickOutcome {
        if self.is_game_over() {
            return TickOutcome::Ignored;
        }
        while self.try_move_down() {}
        self.lock_piece()
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.falling_piece.as_mut() else {
            return false;
        };
        if !piece.can_move(&self.board, dx, dy) {
            return false;
        }
        piece.move_by(dx, dy, &mut self.renderer);
        true
    }

    fn lock_piece(&mut self) -> TickOutcome {
        let Some(piece) = self.falling_piece.take() else {
            return TickOutcome::Ignored;
        };
        self.state = SessionState::Locking;

        // Cells above the top edge have no square on the board to live in.
        if piece.positions().any(|p| p.y < 0) {
            self.stats.complete_piece_drop(0);
            self.enter_game_over();
            return TickOutcome::GameOver {
                cleared_rows: ClearedRows::default(),
            };
        }
        self.board.add_piece(piece);

        self.state = SessionState::RowClearing;
        let cleared_rows = self.board.remove_complete_rows(&mut self.renderer);
        for _ in cleared_rows.rows() {
            let score = self.stats.add_cleared_row();
            self.renderer.display_score(score);
        }
        self.stats.complete_piece_drop(cleared_rows.count());
        self.update_level();

        if self.spawn_next() {
            TickOutcome::Locked { cleared_rows }
        } else {
            TickOutcome::GameOver { cleared_rows }
        }
    }

    fn update_level(&mut self) {
        let level = self.speed.level(self.stats.score());
        if level != self.level {
            self.level = level;
            self.renderer.display_level(level);
        }
    }

    fn spawn_next(&mut self) -> bool {
        self.state = SessionState::Spawned;
        let piece = Piece::new(self.generator.pop_next());
        if !self.board.draw_piece(&piece, &mut self.renderer) {
            self.enter_game_over();
            return false;
        }
        self.falling_piece = Some(piece);
        self.state = SessionState::Falling;
        true
    }

    fn enter_game_over(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.falling_piece = None;
        self.state = SessionState::GameOver;
        self.renderer.display_game_over();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{
        board::{BOARD_HEIGHT, BOARD_WIDTH},
        cell::CellPosition,
        render::{NullRenderer, RecordingRenderer, RenderEvent},
    };

    /// Finds a seed whose first piece is `kind`.
    pub(crate) fn seed_starting_with(kind: PieceKind) -> PieceSeed {
        (0..)
            .map(PieceSeed::from_u128)
            .find(|&seed| PieceGenerator::with_seed(seed).peek_next() == kind)
            .unwrap()
    }

    fn session_starting_with(kind: PieceKind) -> GameSession<RecordingRenderer> {
        GameSession::with_seed(seed_starting_with(kind), RecordingRenderer::new())
    }

    fn positions(session: &GameSession<RecordingRenderer>) -> Vec<CellPosition> {
        session.falling_piece().unwrap().positions().collect()
    }

    fn p(x: i32, y: i32) -> CellPosition {
        CellPosition::new(x, y)
    }

    #[test]
    fn test_start_displays_score_level_and_first_piece() {
        let session = session_starting_with(PieceKind::T);
        let events = session.renderer().events();
        assert_eq!(events[0], RenderEvent::Score { value: 0 });
        assert_eq!(events[1], RenderEvent::Level { value: 1 });
        assert_eq!(events[2..].len(), 4);
        assert!(events[2..].iter().all(RenderEvent::is_render));
        assert_eq!(session.state(), SessionState::Falling);
        assert_eq!(session.delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_tick_moves_piece_down() {
        let mut session = session_starting_with(PieceKind::O);
        assert_eq!(session.tick(), TickOutcome::Moved);
        assert_eq!(positions(&session), [p(4, 1), p(3, 1), p(4, 2), p(3, 2)]);
    }

    #[test]
    fn test_lateral_moves_stop_at_walls() {
        let mut session = session_starting_with(PieceKind::I);
        assert!(session.apply(Command::MoveLeft));
        assert!(session.apply(Command::MoveLeft));
        assert!(session.apply(Command::MoveLeft));
        assert!(!session.apply(Command::MoveLeft));
        assert_eq!(positions(&session)[0], p(0, 0));

        for _ in 0..6 {
            assert!(session.apply(Command::MoveRight));
        }
        assert!(!session.apply(Command::MoveRight));
        assert_eq!(positions(&session)[3], p(9, 0));
    }

    #[test]
    fn test_blocked_move_down_locks_piece() {
        let mut session = session_starting_with(PieceKind::I);
        for _ in 0..19 {
            assert!(session.apply(Command::MoveDown));
        }
        assert_eq!(positions(&session)[0], p(3, 19));
        assert_eq!(session.stats().completed_pieces(), 0);

        assert!(session.apply(Command::MoveDown));

        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.board().row_occupancy(19), 4);
        assert!(session.state().is_falling());
        assert!(session.falling_piece().unwrap().positions().all(|c| c.y <= 1));
    }

    #[test]
    fn test_try_move_down_never_locks() {
        let mut session = session_starting_with(PieceKind::I);
        while session.try_move_down() {}
        assert!(!session.try_move_down());
        assert_eq!(session.stats().completed_pieces(), 0);
        assert_eq!(positions(&session)[0], p(3, 19));
    }

    #[test]
    fn test_rotate_command() {
        let mut session = session_starting_with(PieceKind::I);
        assert!(session.apply(Command::Rotate));
        assert_eq!(positions(&session), [p(4, -1), p(4, 0), p(4, 1), p(4, 2)]);

        let mut session = session_starting_with(PieceKind::O);
        assert!(!session.apply(Command::Rotate));
    }

    #[test]
    fn test_scenario_i_piece_clears_bottom_row() {
        let mut session = session_starting_with(PieceKind::I);
        assert_eq!(positions(&session), [p(3, 0), p(4, 0), p(5, 0), p(6, 0)]);
        session.board.fill_row_except(19, &[3, 4, 5, 6]);

        assert_eq!(session.tick(), TickOutcome::Moved);
        assert!(positions(&session).iter().all(|c| c.y == 1));

        let outcome = session.hard_drop();
        let TickOutcome::Locked { cleared_rows } = outcome else {
            panic!("expected lock, got {outcome:?}");
        };
        assert_eq!(cleared_rows.rows(), &[19]);
        assert_eq!(session.score(), 1);
        assert_eq!(session.delay(), Duration::from_millis(1000));
        assert_eq!(session.level(), 1);
        assert_eq!(session.board().occupied_count(), 0);
        assert_eq!(session.stats().completed_pieces(), 1);
        assert!(session.state().is_falling());
        assert!(
            session
                .renderer()
                .events()
                .contains(&RenderEvent::Score { value: 1 })
        );
    }

    #[test]
    fn test_lock_without_clear() {
        let mut session = session_starting_with(PieceKind::T);
        let outcome = session.hard_drop();
        assert_eq!(
            outcome,
            TickOutcome::Locked {
                cleared_rows: ClearedRows::default()
            }
        );
        let board = session.board();
        assert_eq!(board.occupied_count(), 4);
        for (x, y) in [(3, 18), (4, 18), (5, 18), (4, 19)] {
            assert!(board.is_occupied(x, y), "({x}, {y})");
        }
        assert_eq!(session.stats().row_cleared_counter()[0], 1);
    }

    #[test]
    fn test_tick_locks_when_blocked() {
        let mut session = session_starting_with(PieceKind::O);
        for _ in 0..18 {
            assert_eq!(session.tick(), TickOutcome::Moved);
        }
        assert!(session.tick().is_locked());
        assert!(session.board().is_occupied(3, 19));
        assert!(session.board().is_occupied(4, 18));
    }

    #[test]
    fn test_level_change_updates_delay_and_display() {
        let config = GameConfig {
            seed: Some(seed_starting_with(PieceKind::I)),
            speed: SpeedCurve::new(1, vec![1000, 500]).unwrap(),
        };
        let mut session = GameSession::new(&config, RecordingRenderer::new()).unwrap();
        session.board.fill_row_except(19, &[3, 4, 5, 6]);
        session.renderer_mut().clear();

        assert!(session.hard_drop().is_locked());

        assert_eq!(session.level(), 2);
        assert_eq!(session.delay(), Duration::from_millis(500));
        let events = session.renderer().events();
        let score_at = events
            .iter()
            .position(|e| *e == RenderEvent::Score { value: 1 })
            .unwrap();
        let level_at = events
            .iter()
            .position(|e| *e == RenderEvent::Level { value: 2 })
            .unwrap();
        assert!(score_at < level_at);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "speed": { "points_per_level": 0 } }"#).unwrap();
        let result = GameSession::new(&config, NullRenderer);
        assert_eq!(result.unwrap_err(), ConfigError::ZeroPointsPerLevel);
    }

    /// Fills every free square of rows 1.. except column 0, so the current
    /// piece cannot fall and no row completes.
    fn bury_spawn_area(session: &mut GameSession<RecordingRenderer>) {
        let taken = positions(session);
        let squares: Vec<_> = (1..BOARD_HEIGHT)
            .flat_map(|y| (1..BOARD_WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| !taken.contains(&p(x, y)))
            .collect();
        session.board.fill(squares);
    }

    #[test]
    fn test_game_over_when_spawn_blocked() {
        let mut session = session_starting_with(PieceKind::T);
        bury_spawn_area(&mut session);
        session.renderer_mut().clear();

        let outcome = session.tick();
        assert!(outcome.is_game_over(), "{outcome:?}");
        assert!(session.is_game_over());
        assert!(session.falling_piece().is_none());
        assert_eq!(
            session.renderer().events(),
            &[RenderEvent::GameOver],
            "the rejected piece must not be drawn"
        );

        let occupied = session.board().occupied_count();
        session.renderer_mut().clear();
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.hard_drop(), TickOutcome::Ignored);
        for command in Command::ALL {
            assert!(!session.apply(command));
        }
        assert_eq!(session.board().occupied_count(), occupied);
        assert!(session.renderer().events().is_empty());
    }

    #[test]
    fn test_lock_out_above_top_edge_ends_game() {
        let mut session = session_starting_with(PieceKind::I);
        assert!(session.try_rotate());
        session.board.fill([(4, 3)]);

        let outcome = session.tick();

        assert_eq!(
            outcome,
            TickOutcome::GameOver {
                cleared_rows: ClearedRows::default()
            }
        );
        assert_eq!(session.board().occupied_count(), 1);
        assert!(session.board().cells().all(|c| c.y() >= 0));
        let game_overs = session
            .renderer()
            .events()
            .iter()
            .filter(|e| e.is_game_over())
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_board_cells_stay_in_bounds_during_play() {
        let mut session = GameSession::with_seed(PieceSeed::from_u128(11), NullRenderer);
        let pattern = [
            Command::MoveLeft,
            Command::Rotate,
            Command::MoveLeft,
            Command::HardDrop,
            Command::MoveRight,
            Command::MoveRight,
            Command::Rotate,
            Command::HardDrop,
        ];
        let mut score = 0;
        for command in pattern.iter().cycle().take(2000) {
            session.apply(*command);
            session.tick();
            assert!(session.score() >= score);
            score = session.score();
            for cell in session.board().cells() {
                assert!((0..BOARD_WIDTH).contains(&cell.x()));
                assert!((0..BOARD_HEIGHT).contains(&cell.y()));
                assert_eq!(session.board().cell_at(cell.x(), cell.y()), Some(cell));
            }
            if session.is_game_over() {
                break;
            }
        }
    }

    #[test]
    fn test_next_piece_preview() {
        let mut session = GameSession::with_seed(PieceSeed::from_u128(21), NullRenderer);
        for _ in 0..5 {
            let upcoming = session.next_piece();
            assert!(session.hard_drop().is_locked());
            assert_eq!(session.falling_piece().unwrap().kind(), upcoming);
        }
    }
}
