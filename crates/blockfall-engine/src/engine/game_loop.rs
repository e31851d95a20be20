use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::render::Renderer;

use super::{
    command::Command,
    game_session::GameSession,
    game_stats::GameStats,
    tick_scheduler::TickScheduler,
};

/// A command tagged with the virtual time it arrives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimedCommand {
    #[serde(with = "duration_millis")]
    pub at: Duration,
    pub command: Command,
}

impl TimedCommand {
    #[must_use]
    pub const fn new(at: Duration, command: Command) -> Self {
        Self { at, command }
    }
}

/// Source of player input for [`GameLoop::run`].
///
/// Commands are expected in non-decreasing time order. Any iterator of
/// [`TimedCommand`] is an input source.
pub trait InputSource {
    /// Returns the next command, or `None` when input is exhausted.
    fn next_command(&mut self) -> Option<TimedCommand>;
}

impl<I> InputSource for I
where
    I: Iterator<Item = TimedCommand>,
{
    fn next_command(&mut self) -> Option<TimedCommand> {
        self.next()
    }
}

/// Summary of a [`GameLoop::run`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Virtual time reached, in milliseconds.
    pub elapsed_ms: u64,
    pub ticks: u64,
    pub commands_applied: u64,
    pub commands_rejected: u64,
    pub level: u32,
    pub game_over: bool,
    pub stats: GameStats,
}

/// Drives a [`GameSession`] on virtual time.
///
/// Gravity ticks and player commands are interleaved on a single thread:
/// every tick due at or before a command's time runs first, then the
/// command. After each tick the next one is scheduled from the tick's own
/// due time with the delay the session reports at that point, so a level
/// change takes effect from the following tick. Reaching game over cancels
/// the schedule.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{Command, GameLoop, GameSession, NullRenderer, PieceSeed, TimedCommand};
///
/// let session = GameSession::with_seed(PieceSeed::from_u128(3), NullRenderer);
/// let mut game = GameLoop::new(session);
///
/// let input = (1..=5).map(|i| {
///     TimedCommand::new(Duration::from_millis(i * 500), Command::HardDrop)
/// });
/// let summary = game.run(input, Duration::from_secs(3));
///
/// assert_eq!(summary.commands_applied, 5);
/// assert_eq!(summary.stats.completed_pieces(), 5);
/// assert_eq!(summary.elapsed_ms, 3000);
/// ```
#[derive(Debug)]
pub struct GameLoop<R> {
    session: GameSession<R>,
    scheduler: TickScheduler,
    now: Duration,
    ticks: u64,
    commands_applied: u64,
    commands_rejected: u64,
}

impl<R> GameLoop<R>
where
    R: Renderer,
{
    /// Wraps `session` and schedules its first tick one delay from time zero.
    pub fn new(session: GameSession<R>) -> Self {
        let mut scheduler = TickScheduler::new();
        if !session.is_game_over() {
            scheduler.start(Duration::ZERO, session.delay());
        }
        Self {
            session,
            scheduler,
            now: Duration::ZERO,
            ticks: 0,
            commands_applied: 0,
            commands_rejected: 0,
        }
    }

    #[must_use]
    pub fn session(&self) -> &GameSession<R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession<R> {
        &mut self.session
    }

    pub fn into_session(self) -> GameSession<R> {
        self.session
    }

    #[must_use]
    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns `false` once game over has cancelled the tick schedule.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.scheduler.is_cancelled()
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs every tick due at or before `now` and moves the clock forward.
    ///
    /// The clock never goes backwards; an earlier `now` runs nothing. Once
    /// the game is over the clock stays at the time it ended.
    pub fn advance_to(&mut self, now: Duration) {
        if self.scheduler.is_cancelled() {
            return;
        }
        while self.scheduler.is_due(now) {
            let Some(tick_time) = self.scheduler.next_tick_at() else {
                break;
            };
            self.now = self.now.max(tick_time);
            let outcome = self.session.tick();
            if !outcome.is_ignored() {
                self.ticks += 1;
            }
            if self.session.is_game_over() {
                self.scheduler.cancel();
                return;
            }
            self.scheduler.reschedule(tick_time, self.session.delay());
        }
        self.now = self.now.max(now);
    }

    /// Applies a command at the current time.
    ///
    /// Returns `false` if the session rejected it.
    pub fn handle(&mut self, command: Command) -> bool {
        let accepted = self.session.apply(command);
        if accepted {
            self.commands_applied += 1;
        } else {
            self.commands_rejected += 1;
        }
        if self.session.is_game_over() {
            self.scheduler.cancel();
        }
        accepted
    }

    /// Feeds `input` into the session until it runs out, the game ends, or
    /// the clock reaches `until`.
    ///
    /// The first command stamped after `until` is consumed and dropped.
    pub fn run<I>(&mut self, mut input: I, until: Duration) -> RunSummary
    where
        I: InputSource,
    {
        while !self.session.is_game_over() {
            let Some(next) = input.next_command() else {
                break;
            };
            if next.at > until {
                break;
            }
            self.advance_to(next.at);
            if self.session.is_game_over() {
                break;
            }
            self.handle(next.command);
        }
        if !self.session.is_game_over() {
            self.advance_to(until);
        }
        self.summary()
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_ms: u64::try_from(self.now.as_millis()).unwrap_or(u64::MAX),
            ticks: self.ticks,
            commands_applied: self.commands_applied,
            commands_rejected: self.commands_rejected,
            level: self.session.level(),
            game_over: self.session.is_game_over(),
            stats: self.session.stats().clone(),
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
