use serde::{Deserialize, Serialize};

use crate::ConfigError;

use super::{piece_generator::PieceSeed, speed_curve::SpeedCurve};

/// Settings a [`GameSession`](super::GameSession) is created from.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```
/// use blockfall_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(
///     r#"{ "seed": "000000000000000000000000000000ff" }"#,
/// ).unwrap();
/// config.validate().unwrap();
/// assert_eq!(config.seed.unwrap().as_u128(), 0xff);
/// assert_eq!(config.speed.points_per_level(), 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Seed of the piece sequence; a random one is drawn when absent.
    pub seed: Option<PieceSeed>,
    /// Score to level/delay mapping.
    pub speed: SpeedCurve,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.speed.validate()
    }

    #[must_use]
    pub fn with_seed(mut self, seed: PieceSeed) -> Self {
        self.seed = Some(seed);
        self
    }
}
