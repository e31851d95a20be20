use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    cell::{Cell, CellColor, CellPosition},
    render::Renderer,
};

/// Grid position new pieces are laid out around.
pub const SPAWN_POSITION: CellPosition = CellPosition::new(4, 0);

/// A falling piece: four cells, a pivot, and the current rotation sign.
///
/// Unlike locked cells, a piece's cells move together. The piece itself never
/// checks collisions when mutated; call [`Piece::can_move`] or
/// [`Piece::can_rotate`] first.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, CellPosition, NullRenderer, Piece, PieceKind};
///
/// let board = Board::new();
/// let mut piece = Piece::new(PieceKind::T);
///
/// assert!(piece.can_move(&board, 0, 1));
/// piece.move_by(0, 1, &mut NullRenderer);
/// assert_eq!(piece.pivot().position(), CellPosition::new(4, 1));
///
/// if piece.can_rotate(&board) {
///     piece.rotate(&mut NullRenderer);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    cells: [Cell; 4],
    rotation_sign: RotationSign,
}

impl Piece {
    /// Creates a piece at [`SPAWN_POSITION`].
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self::at(kind, SPAWN_POSITION)
    }

    /// Creates a piece laid out around `origin`.
    #[must_use]
    pub fn at(kind: PieceKind, origin: CellPosition) -> Self {
        let shape = kind.shape();
        let cells = shape
            .offsets
            .map(|(dx, dy)| Cell::new(origin.offset(dx, dy), shape.color));
        Self {
            kind,
            cells,
            rotation_sign: shape.initial_sign,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell; 4] {
        &self.cells
    }

    #[must_use]
    pub fn into_cells(self) -> [Cell; 4] {
        self.cells
    }

    /// Returns the cell rotations are computed around.
    #[must_use]
    pub fn pivot(&self) -> &Cell {
        &self.cells[self.kind.shape().pivot]
    }

    #[must_use]
    pub fn rotation_sign(&self) -> RotationSign {
        self.rotation_sign
    }

    pub fn positions(&self) -> impl Iterator<Item = CellPosition> + '_ {
        self.cells.iter().map(Cell::position)
    }

    /// Returns `true` if every cell can move by `(dx, dy)`.
    #[must_use]
    pub fn can_move(&self, board: &Board, dx: i32, dy: i32) -> bool {
        self.cells.iter().all(|cell| cell.can_move(board, dx, dy))
    }

    /// Moves all four cells by `(dx, dy)`.
    pub fn move_by<R>(&mut self, dx: i32, dy: i32, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        for cell in &mut self.cells {
            cell.move_by(dx, dy, renderer);
        }
    }

    /// Returns `true` if every cell's rotated position is free on the board.
    ///
    /// Always `false` for [`PieceKind::O`].
    #[must_use]
    pub fn can_rotate(&self, board: &Board) -> bool {
        if !self.kind.rotates() {
            return false;
        }
        let pivot = self.pivot().position();
        self.cells.iter().all(|cell| {
            let target = self.rotation_sign.rotate_about(pivot, cell.position());
            board.can_move(target.x, target.y)
        })
    }

    /// Rotates the piece by 90° about its pivot.
    ///
    /// For I, S and Z the rotation sign flips afterwards so the piece toggles
    /// between two orientations.
    pub fn rotate<R>(&mut self, renderer: &mut R)
    where
        R: Renderer + ?Sized,
    {
        if !self.kind.rotates() {
            return;
        }
        let pivot = self.pivot().position();
        for cell in &mut self.cells {
            let target = self.rotation_sign.rotate_about(pivot, cell.position());
            cell.move_by(target.x - cell.x(), target.y - cell.y(), renderer);
        }
        if self.kind.shape().shifts_rotation {
            self.rotation_sign = self.rotation_sign.flipped();
        }
    }
}

/// Direction of the next rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RotationSign {
    Positive,
    Negative,
}

impl RotationSign {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            RotationSign::Positive => 1,
            RotationSign::Negative => -1,
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            RotationSign::Positive => RotationSign::Negative,
            RotationSign::Negative => RotationSign::Positive,
        }
    }

    /// Rotates `position` by 90° around `pivot`.
    ///
    /// ```text
    /// x' = P.x - s * (P.y - y)
    /// y' = P.y + s * (P.x - x)
    /// ```
    #[must_use]
    pub const fn rotate_about(self, pivot: CellPosition, position: CellPosition) -> CellPosition {
        let s = self.as_i32();
        CellPosition::new(
            pivot.x - s * (pivot.y - position.y),
            pivot.y + s * (pivot.x - position.x),
        )
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    fn shape(self) -> &'static PieceShape {
        &PIECE_SHAPES[self as usize]
    }

    #[must_use]
    pub fn color(self) -> CellColor {
        self.shape().color
    }

    /// Returns `false` for the O-piece, which is symmetric under rotation.
    #[must_use]
    pub const fn rotates(self) -> bool {
        !matches!(self, PieceKind::O)
    }

    /// Returns `true` if the rotation sign flips after every rotation.
    #[must_use]
    pub fn shifts_rotation(self) -> bool {
        self.shape().shifts_rotation
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('S'), Some(PieceKind::S));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Static layout and rotation data of one piece kind.
#[derive(Debug)]
struct PieceShape {
    /// Cell offsets from the spawn origin, in cell order.
    offsets: [(i32, i32); 4],
    /// Index into `offsets` of the pivot cell.
    pivot: usize,
    initial_sign: RotationSign,
    shifts_rotation: bool,
    color: CellColor,
}

static PIECE_SHAPES: [PieceShape; PieceKind::LEN] = {
    use RotationSign::{Negative as N, Positive as P};
    [
        // I-piece
        PieceShape {
            offsets: [(-1, 0), (0, 0), (1, 0), (2, 0)],
            pivot: 1,
            initial_sign: N,
            shifts_rotation: true,
            color: CellColor::Blue,
        },
        // J-piece
        PieceShape {
            offsets: [(-1, 0), (0, 0), (1, 0), (1, 1)],
            pivot: 1,
            initial_sign: P,
            shifts_rotation: false,
            color: CellColor::Orange,
        },
        // L-piece
        PieceShape {
            offsets: [(-1, 0), (0, 0), (1, 0), (-1, 1)],
            pivot: 1,
            initial_sign: P,
            shifts_rotation: false,
            color: CellColor::Cyan,
        },
        // O-piece
        PieceShape {
            offsets: [(0, 0), (-1, 0), (0, 1), (-1, 1)],
            pivot: 0,
            initial_sign: P,
            shifts_rotation: false,
            color: CellColor::Red,
        },
        // S-piece
        PieceShape {
            offsets: [(0, 0), (0, 1), (1, 0), (-1, 1)],
            pivot: 0,
            initial_sign: P,
            shifts_rotation: true,
            color: CellColor::Green,
        },
        // T-piece
        PieceShape {
            offsets: [(-1, 0), (0, 0), (1, 0), (0, 1)],
            pivot: 1,
            initial_sign: P,
            shifts_rotation: false,
            color: CellColor::Yellow,
        },
        // Z-piece
        PieceShape {
            offsets: [(-1, 0), (0, 0), (0, 1), (1, 1)],
            pivot: 1,
            initial_sign: P,
            shifts_rotation: true,
            color: CellColor::Magenta,
        },
    ]
};

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::core::render::{NullRenderer, RecordingRenderer};

    fn positions(piece: &Piece) -> Vec<CellPosition> {
        piece.positions().collect()
    }

    fn sorted(piece: &Piece) -> Vec<(i32, i32)> {
        let mut cells: Vec<_> = piece.positions().map(|c| (c.x, c.y)).collect();
        cells.sort_unstable();
        cells
    }

    fn p(x: i32, y: i32) -> CellPosition {
        CellPosition::new(x, y)
    }

    #[test]
    fn test_spawn_layouts() {
        let expected = [
            (PieceKind::I, [p(3, 0), p(4, 0), p(5, 0), p(6, 0)]),
            (PieceKind::J, [p(3, 0), p(4, 0), p(5, 0), p(5, 1)]),
            (PieceKind::L, [p(3, 0), p(4, 0), p(5, 0), p(3, 1)]),
            (PieceKind::O, [p(4, 0), p(3, 0), p(4, 1), p(3, 1)]),
            (PieceKind::S, [p(4, 0), p(4, 1), p(5, 0), p(3, 1)]),
            (PieceKind::T, [p(3, 0), p(4, 0), p(5, 0), p(4, 1)]),
            (PieceKind::Z, [p(3, 0), p(4, 0), p(4, 1), p(5, 1)]),
        ];
        for (kind, cells) in expected {
            let piece = Piece::new(kind);
            assert_eq!(positions(&piece), cells, "layout of {kind}");
            assert!(piece.cells().iter().all(|c| c.color() == kind.color()));
        }
    }

    #[test]
    fn test_pivot_and_initial_sign() {
        assert_eq!(Piece::new(PieceKind::I).pivot().position(), p(4, 0));
        assert_eq!(Piece::new(PieceKind::S).pivot().position(), p(4, 0));
        assert_eq!(Piece::new(PieceKind::O).pivot().position(), p(4, 0));
        assert_eq!(
            Piece::new(PieceKind::I).rotation_sign(),
            RotationSign::Negative
        );
        for kind in [PieceKind::J, PieceKind::L, PieceKind::T, PieceKind::S, PieceKind::Z] {
            assert_eq!(Piece::new(kind).rotation_sign(), RotationSign::Positive);
        }
    }

    #[test]
    fn test_rotate_i_piece_vertical() {
        let board = Board::new();
        let mut piece = Piece::new(PieceKind::I);
        assert!(piece.can_rotate(&board));
        piece.rotate(&mut NullRenderer);
        assert_eq!(positions(&piece), [p(4, -1), p(4, 0), p(4, 1), p(4, 2)]);
        assert_eq!(piece.rotation_sign(), RotationSign::Positive);
    }

    #[test]
    fn test_four_state_pieces_return_after_four_rotations() {
        let board = Board::new();
        for kind in [PieceKind::J, PieceKind::L, PieceKind::T] {
            let mut piece = Piece::at(kind, p(4, 8));
            let original = positions(&piece);
            let mut orientations = vec![sorted(&piece)];
            for i in 0..4 {
                assert!(piece.can_rotate(&board), "{kind} rotation {i}");
                piece.rotate(&mut NullRenderer);
                orientations.push(sorted(&piece));
            }
            assert_eq!(positions(&piece), original, "{kind}");
            assert_eq!(piece.rotation_sign(), RotationSign::Positive);

            orientations.truncate(4);
            orientations.sort();
            orientations.dedup();
            assert_eq!(orientations.len(), 4, "{kind} should have 4 orientations");
        }
    }

    #[test]
    fn test_shift_pieces_return_after_two_rotations() {
        let board = Board::new();
        for kind in [PieceKind::I, PieceKind::S, PieceKind::Z] {
            let mut piece = Piece::at(kind, p(4, 8));
            let original = positions(&piece);
            let sign = piece.rotation_sign();

            piece.rotate(&mut NullRenderer);
            assert_ne!(positions(&piece), original, "{kind}");
            assert_eq!(piece.rotation_sign(), sign.flipped());

            assert!(piece.can_rotate(&board));
            piece.rotate(&mut NullRenderer);
            assert_eq!(positions(&piece), original, "{kind}");
            assert_eq!(piece.rotation_sign(), sign);
        }
    }

    #[test]
    fn test_o_piece_never_rotates() {
        let board = Board::new();
        let mut piece = Piece::at(PieceKind::O, p(4, 8));
        assert!(!piece.can_rotate(&board));

        let mut renderer = RecordingRenderer::new();
        let before = positions(&piece);
        piece.rotate(&mut renderer);
        assert_eq!(positions(&piece), before);
        assert!(renderer.events().is_empty());
    }

    #[test]
    fn test_rotation_keeps_pivot_fixed() {
        for kind in PieceKind::ALL {
            let mut piece = Piece::at(kind, p(5, 10));
            let pivot = piece.pivot().position();
            piece.rotate(&mut NullRenderer);
            assert_eq!(piece.pivot().position(), pivot, "{kind}");
        }
    }

    #[test]
    fn test_can_rotate_blocked_by_wall() {
        let board = Board::new();
        // vertical I against the right wall: rotating back would need x = 10
        let mut piece = Piece::at(PieceKind::I, p(9, 5));
        piece.rotate(&mut NullRenderer);
        assert!(piece.positions().all(|c| c.x == 9));
        assert!(!piece.can_rotate(&board));
    }

    #[test]
    fn test_can_move_respects_walls() {
        let board = Board::new();
        let piece = Piece::new(PieceKind::I);
        assert!(piece.can_move(&board, -3, 0));
        assert!(!piece.can_move(&board, -4, 0));
        assert!(piece.can_move(&board, 3, 0));
        assert!(!piece.can_move(&board, 4, 0));
        assert!(piece.can_move(&board, 0, 19));
        assert!(!piece.can_move(&board, 0, 20));
    }

    #[test]
    fn test_move_by_repositions_every_cell() {
        let mut renderer = RecordingRenderer::new();
        let mut piece = Piece::new(PieceKind::T);
        piece.move_by(1, 0, &mut renderer);
        assert_eq!(positions(&piece), [p(4, 0), p(5, 0), p(6, 0), p(5, 1)]);
        assert_eq!(renderer.events().len(), 4);
        assert!(renderer.events().iter().all(|e| e.is_reposition()));
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(kind.to_string(), kind.as_char().to_string());
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }

    #[test]
    fn test_piece_kind_serialization() {
        let json = serde_json::to_string(&PieceKind::Z).unwrap();
        assert_eq!(json, "\"Z\"");
        let kind: PieceKind = serde_json::from_str("\"L\"").unwrap();
        assert_eq!(kind, PieceKind::L);
    }

    #[test]
    fn test_uniform_distribution_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut counts = [0_usize; PieceKind::LEN];
        for _ in 0..7000 {
            let kind: PieceKind = rng.random();
            counts[kind as usize] += 1;
        }
        for (i, count) in counts.iter().enumerate() {
            assert!(
                (700..1300).contains(count),
                "{:?} drawn {count} times",
                PieceKind::ALL[i]
            );
        }
    }
}
