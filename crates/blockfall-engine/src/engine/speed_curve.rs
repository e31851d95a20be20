use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Fall delays (milliseconds) of the default curve, one per level.
const DEFAULT_DELAYS_MS: [u64; 6] = [1000, 800, 600, 400, 200, 100];
const DEFAULT_POINTS_PER_LEVEL: u32 = 10;

/// Maps a score to a level and the delay between gravity ticks.
///
/// Level `n` (1-based) covers scores
/// `[(n - 1) * points_per_level, n * points_per_level)` and uses
/// `delays_ms[n - 1]`. Past the last tier the level and delay stay at the
/// fastest entry.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::SpeedCurve;
///
/// let curve = SpeedCurve::default();
/// assert_eq!(curve.level(0), 1);
/// assert_eq!(curve.delay(0), Duration::from_millis(1000));
/// assert_eq!(curve.level(25), 3);
/// assert_eq!(curve.delay(25), Duration::from_millis(600));
/// assert_eq!(curve.level(500), 6);
/// assert_eq!(curve.delay(500), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedCurve {
    points_per_level: u32,
    delays_ms: Vec<u64>,
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            points_per_level: DEFAULT_POINTS_PER_LEVEL,
            delays_ms: DEFAULT_DELAYS_MS.to_vec(),
        }
    }
}

impl SpeedCurve {
    /// Creates a curve and checks it with [`Self::validate`].
    pub fn new(points_per_level: u32, delays_ms: Vec<u64>) -> Result<Self, ConfigError> {
        let curve = Self {
            points_per_level,
            delays_ms,
        };
        curve.validate()?;
        Ok(curve)
    }

    #[must_use]
    pub fn points_per_level(&self) -> u32 {
        self.points_per_level
    }

    #[must_use]
    pub fn delays_ms(&self) -> &[u64] {
        &self.delays_ms
    }

    /// Checks that the curve can be used by a session.
    ///
    /// Delays must be non-empty, positive, and never increase from one level
    /// to the next.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points_per_level == 0 {
            return Err(ConfigError::ZeroPointsPerLevel);
        }
        if self.delays_ms.is_empty() {
            return Err(ConfigError::EmptyDelayTable);
        }
        if let Some(level) = self.delays_ms.iter().position(|&d| d == 0) {
            return Err(ConfigError::ZeroDelay { level: level + 1 });
        }
        if let Some(i) = self.delays_ms.windows(2).position(|w| w[1] > w[0]) {
            return Err(ConfigError::IncreasingDelay {
                level: i + 2,
                previous_ms: self.delays_ms[i],
                delay_ms: self.delays_ms[i + 1],
            });
        }
        Ok(())
    }

    fn tier(&self, score: u32) -> usize {
        let last = self.delays_ms.len().saturating_sub(1);
        usize::try_from(score / self.points_per_level.max(1)).map_or(last, |tier| tier.min(last))
    }

    /// Returns the 1-based level for `score`.
    #[must_use]
    pub fn level(&self, score: u32) -> u32 {
        u32::try_from(self.tier(score) + 1).unwrap_or(u32::MAX)
    }

    /// Returns the delay between gravity ticks at `score`.
    #[must_use]
    pub fn delay(&self, score: u32) -> Duration {
        let millis = self
            .delays_ms
            .get(self.tier(score))
            .copied()
            .unwrap_or(DEFAULT_DELAYS_MS[0]);
        Duration::from_millis(millis)
    }
}
