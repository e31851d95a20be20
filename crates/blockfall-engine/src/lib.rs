pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected [`GameConfig`] or [`SpeedCurve`] settings.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("points per level must be positive")]
    ZeroPointsPerLevel,
    #[display("delay table must not be empty")]
    EmptyDelayTable,
    #[display("delay of level {level} must be positive")]
    ZeroDelay { level: usize },
    #[display("delay of level {level} ({delay_ms} ms) exceeds previous level ({previous_ms} ms)")]
    IncreasingDelay {
        level: usize,
        previous_ms: u64,
        delay_ms: u64,
    },
}
