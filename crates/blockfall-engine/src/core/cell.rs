use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    render::{PixelDelta, Renderer},
};

/// Grid coordinate of a cell.
///
/// # Coordinate System
///
/// - (0, 0) is the top-left square of the board
/// - X increases rightward (columns)
/// - Y increases downward (rows)
/// - Y may be negative while a falling piece sticks out above the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CellPosition {
    pub x: i32,
    pub y: i32,
}

impl CellPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for CellPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Color tag carried by a cell. Each piece kind has its own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum CellColor {
    #[display("blue")]
    Blue,
    #[display("orange")]
    Orange,
    #[display("cyan")]
    Cyan,
    #[display("red")]
    Red,
    #[display("green")]
    Green,
    #[display("yellow")]
    Yellow,
    #[display("magenta")]
    Magenta,
}

/// A single occupied grid unit.
///
/// While a piece is falling its cells belong to the [`Piece`](super::piece::Piece);
/// after lock-in they are owned by the [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    position: CellPosition,
    color: CellColor,
}

impl Cell {
    #[must_use]
    pub const fn new(position: CellPosition, color: CellColor) -> Self {
        Self { position, color }
    }

    #[must_use]
    pub const fn position(&self) -> CellPosition {
        self.position
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.position.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.position.y
    }

    #[must_use]
    pub const fn color(&self) -> CellColor {
        self.color
    }

    /// Returns `true` if the board accepts this cell at `(x + dx, y + dy)`.
    #[must_use]
    pub fn can_move(&self, board: &Board, dx: i32, dy: i32) -> bool {
        board.can_move(self.x() + dx, self.y() + dy)
    }

    /// Moves the cell by the given grid delta and repositions its visual.
    ///
    /// No collision check is done here; callers ask [`Cell::can_move`] first.
    pub fn move_by<R>(&mut self, dx: i32, dy: i32, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        renderer.reposition(self, PixelDelta::from_grid(dx, dy));
        self.position = self.position.offset(dx, dy);
    }
}
