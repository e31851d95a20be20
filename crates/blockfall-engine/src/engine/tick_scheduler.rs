use std::time::Duration;

/// Gravity tick timing.
///
/// Times are virtual: a [`Duration`] since the start of the game. The
/// scheduler holds the instant the next tick is due, or nothing once it has
/// been cancelled. It never reads a clock itself, so the same code drives a
/// real-time frontend and a deterministic simulation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::TickScheduler;
///
/// let ms = Duration::from_millis;
/// let mut scheduler = TickScheduler::new();
/// scheduler.start(ms(0), ms(1000));
///
/// assert!(!scheduler.is_due(ms(999)));
/// assert_eq!(scheduler.time_until_next(ms(400)), Some(ms(600)));
/// assert!(scheduler.is_due(ms(1000)));
///
/// scheduler.cancel();
/// assert!(!scheduler.is_due(ms(5000)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickScheduler {
    next_tick_at: Option<Duration>,
}

impl TickScheduler {
    /// Creates a scheduler with nothing scheduled.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_tick_at: None }
    }

    /// Schedules the first tick `delay` after `now`.
    pub fn start(&mut self, now: Duration, delay: Duration) {
        self.next_tick_at = Some(now.saturating_add(delay));
    }

    #[must_use]
    pub const fn next_tick_at(&self) -> Option<Duration> {
        self.next_tick_at
    }

    /// Returns `true` if a tick is scheduled at or before `now`.
    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        self.next_tick_at.is_some_and(|at| at <= now)
    }

    /// Returns how long to wait before the next tick, or `None` if cancelled.
    ///
    /// An overdue tick yields [`Duration::ZERO`].
    #[must_use]
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_tick_at.map(|at| at.saturating_sub(now))
    }

    /// Schedules the tick following the one that was due at `tick_time`.
    ///
    /// Does nothing after [`Self::cancel`].
    pub fn reschedule(&mut self, tick_time: Duration, delay: Duration) {
        if self.next_tick_at.is_some() {
            self.next_tick_at = Some(tick_time.saturating_add(delay));
        }
    }

    pub fn cancel(&mut self) {
        self.next_tick_at = None;
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.next_tick_at.is_none()
    }
}
