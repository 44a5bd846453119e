use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    grid::Grid,
    shape::{Color, Rotation, Shape, ShapeMatrix},
};

/// Number of occupied sub-cells in every tetromino.
pub const PIECE_CELLS: usize = 4;

/// Absolute grid coordinate. Row 0 is the top (spawn) row.
///
/// Coordinates are signed so that a bounding matrix anchor may hang over
/// the grid edge while its occupied cells stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn offset(self, rows: i32, cols: i32) -> Self {
        Self::new(self.row + rows, self.col + cols)
    }

    const fn offset_by(self, rows: usize, cols: usize) -> Self {
        self.offset(signed(rows), signed(cols))
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn signed(n: usize) -> i32 {
    n as i32
}

/// One-cell translation issued by gravity or the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    const fn delta(self) -> (i32, i32) {
        match self {
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
        }
    }
}

/// How a rotation that collides at the current anchor is resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationSystem {
    /// A colliding rotation is rejected outright.
    #[default]
    Fixed,
    /// A colliding rotation is retried at [`WALL_KICK_OFFSETS`], in order.
    WallKick,
}

/// `(rows, cols)` offsets tried by [`RotationSystem::WallKick`]: right, left, up.
pub const WALL_KICK_OFFSETS: [(i32, i32); 3] = [(0, 1), (0, -1), (-1, 0)];

/// A live piece: shape, rotation, anchor (top-left of the bounding matrix) and color.
///
/// Every movement goes through [`Piece::attempt_translate`] or
/// [`Piece::rotate`], both of which ask the [`Grid`] whether the candidate
/// cells are legal and leave the piece untouched when they are not.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Direction, Grid, Piece, Shape};
///
/// let grid = Grid::new(20, 12, 2);
/// let mut piece = Piece::spawn(Shape::T, grid.width());
/// assert!(piece.attempt_translate(Direction::Left, &grid));
/// let dropped = piece.hard_drop(&grid);
/// assert_eq!(dropped, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    shape: Shape,
    rotation: Rotation,
    anchor: Position,
    color: Color,
}

impl Piece {
    #[must_use]
    pub fn new(shape: Shape, anchor: Position) -> Self {
        Self {
            shape,
            rotation: Rotation::default(),
            anchor,
            color: shape.color(),
        }
    }

    /// Places a new piece in the spawn row, horizontally centered.
    ///
    /// The anchor is raised so that the topmost occupied row of the spawn
    /// rotation sits exactly on row 0.
    #[must_use]
    pub fn spawn(shape: Shape, grid_width: usize) -> Self {
        let matrix = shape.rotation_state(Rotation::default());
        let top = matrix.occupied_rows().next().unwrap_or(0);
        let left = grid_width.saturating_sub(shape.envelope()) / 2;
        Self::new(shape, Position::new(-signed(top), signed(left)))
    }

    #[must_use]
    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn matrix(&self) -> &'static ShapeMatrix {
        self.shape.rotation_state(self.rotation)
    }

    /// Absolute positions of the occupied sub-cells.
    #[must_use]
    pub fn cells(&self) -> ArrayVec<Position, PIECE_CELLS> {
        cells_at(self.matrix(), self.anchor)
    }

    /// Shifts the piece one cell if every occupied sub-cell stays legal.
    ///
    /// Returns `false` and leaves the piece unchanged otherwise. Gravity,
    /// soft drops and hard drops all funnel through here.
    pub fn attempt_translate(&mut self, direction: Direction, grid: &Grid) -> bool {
        let (rows, cols) = direction.delta();
        let candidate = self.anchor.offset(rows, cols);
        if !grid.is_legal_placement(cells_at(self.matrix(), candidate)) {
            return false;
        }
        self.anchor = candidate;
        true
    }

    /// Advances the rotation index by one (clockwise).
    ///
    /// Under [`RotationSystem::Fixed`] a colliding rotation is rejected.
    /// Under [`RotationSystem::WallKick`] the [`WALL_KICK_OFFSETS`] are
    /// tried in order before rejecting. Returns whether the piece rotated.
    pub fn rotate(&mut self, grid: &Grid, system: RotationSystem) -> bool {
        let rotation = self.rotation.rotated_right();
        let matrix = self.shape.rotation_state(rotation);

        let kicks: &[(i32, i32)] = match system {
            RotationSystem::Fixed => &[],
            RotationSystem::WallKick => &WALL_KICK_OFFSETS,
        };
        let accepted = [(0, 0)]
            .iter()
            .chain(kicks)
            .map(|&(rows, cols)| self.anchor.offset(rows, cols))
            .find(|&anchor| grid.is_legal_placement(cells_at(matrix, anchor)));

        let Some(anchor) = accepted else {
            return false;
        };
        self.rotation = rotation;
        self.anchor = anchor;
        true
    }

    /// Moves the piece down until the next step would collide.
    ///
    /// Returns the number of rows travelled. The caller locks the piece
    /// right after.
    pub fn hard_drop(&mut self, grid: &Grid) -> usize {
        let mut rows = 0;
        while self.attempt_translate(Direction::Down, grid) {
            rows += 1;
        }
        rows
    }

    /// Returns where this piece would come to rest if hard dropped.
    #[must_use]
    pub fn dropped(&self, grid: &Grid) -> Self {
        let mut ghost = *self;
        ghost.hard_drop(grid);
        ghost
    }

    /// Returns the rotation bitmap and the grid position of its top-left corner.
    ///
    /// With `exclude_empty_edges`, rows and columns of the bitmap that hold
    /// no occupied sub-cell are dropped and the origin is shifted to match,
    /// so the result only spans the real cells.
    #[must_use]
    pub fn minimal_bounding_cells(&self, exclude_empty_edges: bool) -> TrimmedCells {
        let matrix = self.matrix();
        let (rows, cols): (ArrayVec<usize, 4>, ArrayVec<usize, 4>) = if exclude_empty_edges {
            (
                matrix.occupied_rows().collect(),
                matrix.occupied_cols().collect(),
            )
        } else {
            ((0..matrix.size()).collect(), (0..matrix.size()).collect())
        };

        let origin = self
            .anchor
            .offset_by(rows.first().copied().unwrap_or(0), cols.first().copied().unwrap_or(0));
        let mask = rows
            .iter()
            .map(|&row| cols.iter().map(|&col| matrix.is_occupied(row, col)).collect())
            .collect();
        TrimmedCells {
            mask,
            origin,
            color: self.color,
        }
    }
}

fn cells_at(matrix: &ShapeMatrix, anchor: Position) -> ArrayVec<Position, PIECE_CELLS> {
    matrix
        .occupied()
        .map(|(row, col)| anchor.offset_by(row, col))
        .collect()
}

/// Bitmap of a piece trimmed to its occupied rows and columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedCells {
    mask: ArrayVec<ArrayVec<bool, 4>, 4>,
    origin: Position,
    color: Color,
}

impl TrimmedCells {
    #[must_use]
    pub fn rows(&self) -> usize {
        self.mask.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.mask.first().map_or(0, ArrayVec::len)
    }

    /// Grid position of the bitmap's top-left cell.
    #[must_use]
    pub fn origin(&self) -> Position {
        self.origin
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.mask
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Absolute positions of the occupied cells.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.mask.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|&(_, &occupied)| occupied)
                .map(move |(col, _)| self.origin.offset_by(row, col))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_grid() -> Grid {
        Grid::new(20, 12, 2)
    }

    #[test]
    fn test_spawn_sits_on_top_row() {
        for shape in Shape::ALL {
            let piece = Piece::spawn(shape, 12);
            let top = piece.cells().iter().map(|p| p.row).min().unwrap();
            assert_eq!(top, 0, "{shape:?}");
        }
        let i = Piece::spawn(Shape::I, 12);
        assert_eq!(i.anchor(), Position::new(-1, 4));
        let cols: Vec<_> = i.cells().iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_translate_stops_at_walls() {
        let grid = empty_grid();
        let mut piece = Piece::spawn(Shape::O, 12);
        let mut moves = 0;
        while piece.attempt_translate(Direction::Left, &grid) {
            moves += 1;
        }
        assert_eq!(moves, 5);
        assert_eq!(piece.cells().iter().map(|p| p.col).min(), Some(0));

        let before = piece;
        assert!(!piece.attempt_translate(Direction::Left, &grid));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_translate_blocked_by_locked_cell() {
        let mut grid = empty_grid();
        grid.lock([Position::new(2, 5)], Color::GRAY);
        let mut piece = Piece::spawn(Shape::O, 12);
        let before = piece;
        assert!(!piece.attempt_translate(Direction::Down, &grid));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_hard_drop_reaches_floor() {
        let grid = empty_grid();
        let mut piece = Piece::spawn(Shape::O, 12);
        assert_eq!(piece.hard_drop(&grid), 20);
        assert!(piece.cells().iter().all(|p| p.row >= 20));
        assert!(!piece.attempt_translate(Direction::Down, &grid));
    }

    #[test]
    fn test_hard_drop_lands_on_stack() {
        let grid = Grid::from_ascii(
            20,
            12,
            2,
            r"
            .....##.....
            ############
            ",
        );
        let mut piece = Piece::spawn(Shape::O, 12);
        piece.hard_drop(&grid);
        let rows: Vec<_> = piece.cells().iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![18, 18, 19, 19]);
        assert_eq!(piece.dropped(&grid), piece);
    }

    #[test]
    fn test_fixed_rotation_rejected_at_spawn_for_i() {
        // vertical I would poke above row 0
        let grid = empty_grid();
        let mut piece = Piece::spawn(Shape::I, 12);
        let before = piece;
        assert!(!piece.rotate(&grid, RotationSystem::Fixed));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_wall_kick_off_right_wall() {
        let grid = empty_grid();
        let mut piece = Piece::new(Shape::I, Position::new(5, 0));
        assert!(piece.rotate(&grid, RotationSystem::Fixed));
        while piece.attempt_translate(Direction::Right, &grid) {}
        assert_eq!(piece.anchor(), Position::new(5, 9));
        assert_eq!(piece.cells()[0].col, 11);

        // horizontal I would cover cols 9..=12 at the current anchor
        let mut fixed = piece;
        assert!(!fixed.rotate(&grid, RotationSystem::Fixed));
        assert_eq!(fixed, piece);

        // right kick still overhangs, left kick fits
        let mut kicked = piece;
        assert!(kicked.rotate(&grid, RotationSystem::WallKick));
        assert_eq!(kicked.anchor(), Position::new(5, 8));
        assert_eq!(kicked.rotation(), Rotation::new(2));
    }

    #[test]
    fn test_wall_kick_off_left_wall() {
        let grid = empty_grid();
        let mut piece = Piece::new(Shape::T, Position::new(5, 4));
        assert!(piece.rotate(&grid, RotationSystem::Fixed));
        while piece.attempt_translate(Direction::Left, &grid) {}
        assert_eq!(piece.anchor(), Position::new(5, -1));

        let mut fixed = piece;
        assert!(!fixed.rotate(&grid, RotationSystem::Fixed));
        assert_eq!(fixed, piece);

        let mut kicked = piece;
        assert!(kicked.rotate(&grid, RotationSystem::WallKick));
        assert_eq!(kicked.anchor(), Position::new(5, 0));
        assert_eq!(kicked.rotation(), Rotation::new(2));
    }

    #[test]
    fn test_wall_kick_exhausted_keeps_state() {
        let grid = Grid::from_ascii(
            20,
            12,
            2,
            r"
            ###.########
            ###.########
            ###.########
            ###.########
            ###.########
            ",
        );
        let mut piece = Piece::new(Shape::I, Position::new(17, 1));
        assert!(piece.rotate(&Grid::new(20, 12, 2), RotationSystem::Fixed));
        assert_eq!(piece.cells()[0].col, 3);
        assert!(grid.is_legal_placement(piece.cells()));

        let before = piece;
        assert!(!piece.rotate(&grid, RotationSystem::WallKick));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_four_rotations_round_trip() {
        let grid = empty_grid();
        for shape in Shape::ALL {
            let mut piece = Piece::new(shape, Position::new(8, 4));
            let start = piece;
            for _ in 0..Rotation::COUNT {
                assert!(piece.rotate(&grid, RotationSystem::Fixed));
            }
            assert_eq!(piece, start, "{shape:?}");
        }
    }

    #[test]
    fn test_minimal_bounding_cells_trims_empty_edges() {
        let piece = Piece::new(Shape::I, Position::new(3, 2));
        let trimmed = piece.minimal_bounding_cells(true);
        assert_eq!((trimmed.rows(), trimmed.cols()), (1, 4));
        assert_eq!(trimmed.origin(), Position::new(4, 2));

        let full = piece.minimal_bounding_cells(false);
        assert_eq!((full.rows(), full.cols()), (4, 4));
        assert_eq!(full.origin(), Position::new(3, 2));

        let mut a: Vec<_> = trimmed.positions().collect();
        let mut b: Vec<_> = piece.cells().into_iter().collect();
        a.sort_by_key(|p| (p.row, p.col));
        b.sort_by_key(|p| (p.row, p.col));
        assert_eq!(a, b);
        assert_eq!(full.positions().count(), 4);
    }

    #[test]
    fn test_minimal_bounding_cells_vertical_t() {
        let mut piece = Piece::new(Shape::T, Position::new(0, 0));
        piece.rotate(&Grid::new(20, 12, 2), RotationSystem::Fixed);
        let trimmed = piece.minimal_bounding_cells(true);
        assert_eq!((trimmed.rows(), trimmed.cols()), (3, 2));
        assert_eq!(trimmed.origin(), Position::new(0, 1));
        assert!(trimmed.is_occupied(1, 1));
        assert!(!trimmed.is_occupied(0, 1));
    }
}
