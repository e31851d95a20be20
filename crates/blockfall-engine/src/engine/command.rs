use serde::{Deserialize, Serialize};

/// Logical input understood by a [`GameSession`](super::GameSession).
///
/// Key codes and other device details never reach the engine; frontends
/// translate them into these five commands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    #[display("move_left")]
    MoveLeft,
    #[display("move_right")]
    MoveRight,
    #[display("move_down")]
    MoveDown,
    #[display("hard_drop")]
    HardDrop,
    #[display("rotate")]
    Rotate,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::MoveDown,
        Command::HardDrop,
        Command::Rotate,
    ];
}
