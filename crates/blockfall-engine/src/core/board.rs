use std::{collections::HashMap, fmt};

use arrayvec::ArrayVec;

use super::{
    cell::{Cell, CellPosition},
    piece::Piece,
    render::Renderer,
};

/// Number of columns on the board.
pub const BOARD_WIDTH: i32 = 10;
/// Number of rows on the board.
pub const BOARD_HEIGHT: i32 = 20;

/// Row indices removed by one [`Board::remove_complete_rows`] pass, in the
/// order they were cleared (top to bottom).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearedRows(ArrayVec<i32, { BOARD_HEIGHT as usize }>);

impl ClearedRows {
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[i32] {
        &self.0
    }
}

/// Occupancy map of locked cells.
///
/// Every key lies within `[0, BOARD_WIDTH) × [0, BOARD_HEIGHT)` and maps to
/// the one cell occupying it. Only the top edge is open: [`Board::can_move`]
/// accepts negative rows so pieces can spawn or rotate partly above the
/// visible area.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, NullRenderer, Piece, PieceKind};
///
/// let mut board = Board::new();
/// let piece = Piece::new(PieceKind::O);
///
/// assert!(board.draw_piece(&piece, &mut NullRenderer));
/// board.add_piece(piece);
/// assert!(!board.can_move(4, 0));
/// assert!(!board.draw_piece(&Piece::new(PieceKind::T), &mut NullRenderer));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Board {
    cells: HashMap<CellPosition, Cell>,
}

impl Board {
    pub const WIDTH: i32 = BOARD_WIDTH;
    pub const HEIGHT: i32 = BOARD_HEIGHT;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        Self::WIDTH
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        Self::HEIGHT
    }

    /// Returns `true` if a cell may occupy `(x, y)`.
    ///
    /// Rejects the side walls, the floor and occupied squares. There is no
    /// check against the top edge.
    #[must_use]
    pub fn can_move(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= Self::WIDTH || y >= Self::HEIGHT {
            return false;
        }
        !self.is_occupied(x, y)
    }

    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cells.contains_key(&CellPosition::new(x, y))
    }

    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get(&CellPosition::new(x, y))
    }

    /// Returns an iterator over the locked cells, in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of occupied squares in row `y`.
    #[must_use]
    pub fn row_occupancy(&self, y: i32) -> usize {
        (0..Self::WIDTH).filter(|&x| self.is_occupied(x, y)).count()
    }

    /// Renders `piece` if its current position is entirely free.
    ///
    /// Returns `false` without rendering anything otherwise, which is how
    /// the controller detects that a freshly spawned piece has no room.
    pub fn draw_piece<R>(&self, piece: &Piece, renderer: &mut R) -> bool
    where
        R: Renderer + ?Sized,
    {
        if !piece.can_move(self, 0, 0) {
            return false;
        }
        for cell in piece.cells() {
            renderer.render(cell);
        }
        true
    }

    /// Takes ownership of all four cells of a settled piece.
    ///
    /// No validation is done; the caller has already established that the
    /// piece sits on free, in-bounds squares.
    pub fn add_piece(&mut self, piece: Piece) {
        for cell in piece.into_cells() {
            self.insert(cell);
        }
    }

    #[must_use]
    pub fn is_row_complete(&self, y: i32) -> bool {
        (0..Self::WIDTH).all(|x| self.is_occupied(x, y))
    }

    /// Removes and erases every cell in row `y`.
    pub fn delete_row<R>(&mut self, y: i32, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        for x in 0..Self::WIDTH {
            if let Some(cell) = self.cells.remove(&CellPosition::new(x, y)) {
                renderer.erase(&cell);
            }
        }
    }

    /// Moves every cell in rows `y_start` up to row 0 down by one row.
    ///
    /// Rows are processed from `y_start` toward the top so each row lands in
    /// the one below it only after that row has been vacated. Row
    /// `y_start + 1` must be empty.
    pub fn move_down_rows<R>(&mut self, y_start: i32, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        for y in (0..=y_start).rev() {
            for x in 0..Self::WIDTH {
                if let Some(mut cell) = self.cells.remove(&CellPosition::new(x, y)) {
                    cell.move_by(0, 1, renderer);
                    self.insert(cell);
                }
            }
        }
    }

    /// Clears every complete row and lets the rows above fall into place.
    ///
    /// Rows are scanned from the top. Each complete row is deleted and
    /// everything above it shifts down by one before the scan continues, so
    /// a cell ends up lowered by the number of cleared rows beneath it.
    pub fn remove_complete_rows<R>(&mut self, renderer: &mut R) -> ClearedRows
    where
        R: Renderer + ?Sized,
    {
        let mut cleared = ClearedRows::default();
        for y in 0..Self::HEIGHT {
            if self.is_row_complete(y) {
                self.delete_row(y, renderer);
                self.move_down_rows(y - 1, renderer);
                cleared.0.push(y);
            }
        }
        cleared
    }

    fn insert(&mut self, cell: Cell) {
        debug_assert!(
            (0..Self::WIDTH).contains(&cell.x()) && (0..Self::HEIGHT).contains(&cell.y()),
            "cell out of bounds: {:?}",
            cell.position()
        );
        let previous = self.cells.insert(cell.position(), cell);
        debug_assert!(previous.is_none(), "square already occupied: {previous:?}");
    }

    #[cfg(test)]
    pub(crate) fn fill(&mut self, positions: impl IntoIterator<Item = (i32, i32)>) {
        use super::cell::CellColor;
        for (x, y) in positions {
            self.insert(Cell::new(CellPosition::new(x, y), CellColor::Red));
        }
    }

    #[cfg(test)]
    pub(crate) fn fill_row_except(&mut self, y: i32, holes: &[i32]) {
        self.fill(
            (0..Self::WIDTH)
                .filter(|x| !holes.contains(x))
                .map(|x| (x, y)),
        );
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..Self::HEIGHT {
            for x in 0..Self::WIDTH {
                let c = if self.is_occupied(x, y) { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
