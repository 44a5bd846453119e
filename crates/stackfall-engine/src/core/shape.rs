use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// RGB color carried by every occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const CYAN: Self = Self::new(0, 255, 255);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const ORANGE: Self = Self::new(255, 127, 0);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const MAGENTA: Self = Self::new(255, 0, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GRAY: Self = Self::new(127, 127, 127);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The seven tetromino shapes.
///
/// Shapes are shared, immutable catalog entries. Each one owns four
/// rotation states generated at compile time by rotating the spawn
/// matrix clockwise inside the shape's envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum Shape {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl Distribution<Shape> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        Shape::ALL[rng.random_range(0..Shape::LEN)]
    }
}

impl Shape {
    /// Number of shapes (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// Returns the ordered rotation states of this shape.
    #[must_use]
    pub fn rotation_states(self) -> &'static [ShapeMatrix; Rotation::COUNT] {
        &ROTATION_TABLE[self as usize]
    }

    #[must_use]
    pub fn rotation_state(self, rotation: Rotation) -> &'static ShapeMatrix {
        &self.rotation_states()[rotation.index()]
    }

    /// Side length of the bounding matrix (4 for I, 2 for O, 3 otherwise).
    #[must_use]
    pub const fn envelope(self) -> usize {
        match self {
            Self::I => 4,
            Self::O => 2,
            Self::J | Self::L | Self::S | Self::T | Self::Z => 3,
        }
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::I => Color::CYAN,
            Self::J => Color::BLUE,
            Self::L => Color::ORANGE,
            Self::O => Color::YELLOW,
            Self::S => Color::GREEN,
            Self::T => Color::MAGENTA,
            Self::Z => Color::RED,
        }
    }

    /// Returns the single character code of this shape.
    ///
    /// ```
    /// use stackfall_engine::Shape;
    ///
    /// assert_eq!(Shape::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::J => 'J',
            Self::L => 'L',
            Self::O => 'O',
            Self::S => 'S',
            Self::T => 'T',
            Self::Z => 'Z',
        }
    }

    /// Parses a shape from its character code (case-insensitive).
    ///
    /// ```
    /// use stackfall_engine::Shape;
    ///
    /// assert_eq!(Shape::from_char('z'), Some(Shape::Z));
    /// assert_eq!(Shape::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Self::I),
            'J' => Some(Self::J),
            'L' => Some(Self::L),
            'O' => Some(Self::O),
            'S' => Some(Self::S),
            'T' => Some(Self::T),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// Rotation index of a piece, `0..4`, wrapping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rotation(u8);

impl Rotation {
    pub const COUNT: usize = 4;

    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Occupancy bitmap of one rotation state.
///
/// Only the top-left `size × size` corner of the 4×4 storage is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl ShapeMatrix {
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Iterates the `(row, col)` offsets of occupied sub-cells, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |row| {
            (0..self.size).filter_map(move |col| self.cells[row][col].then_some((row, col)))
        })
    }

    /// Rows that contain at least one occupied sub-cell.
    pub fn occupied_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(|&row| self.cells[row][..self.size].iter().any(|&c| c))
    }

    /// Columns that contain at least one occupied sub-cell.
    pub fn occupied_cols(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(|&col| (0..self.size).any(|row| self.cells[row][col]))
    }

    const fn rotated_right(&self) -> Self {
        let mut cells = [[false; 4]; 4];
        let mut row = 0;
        while row < self.size {
            let mut col = 0;
            while col < self.size {
                cells[row][col] = self.cells[self.size - 1 - col][row];
                col += 1;
            }
            row += 1;
        }
        Self {
            size: self.size,
            cells,
        }
    }
}

const fn rotations(size: usize, spawn: [[bool; 4]; 4]) -> [ShapeMatrix; Rotation::COUNT] {
    let first = ShapeMatrix { size, cells: spawn };
    let second = first.rotated_right();
    let third = second.rotated_right();
    let fourth = third.rotated_right();
    [first, second, third, fourth]
}

const ROTATION_TABLE: [[ShapeMatrix; Rotation::COUNT]; Shape::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I
        rotations(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        // J
        rotations(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L
        rotations(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // O
        rotations(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // S
        rotations(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // T
        rotations(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // Z
        rotations(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_every_rotation_has_four_cells() {
        for shape in Shape::ALL {
            for matrix in shape.rotation_states() {
                assert_eq!(matrix.occupied().count(), 4, "{shape:?}");
                assert_eq!(matrix.size(), shape.envelope());
            }
        }
    }

    #[test]
    fn test_i_rotates_to_vertical_column() {
        let vertical = Shape::I.rotation_state(Rotation::new(1));
        let cells: Vec<_> = vertical.occupied().collect();
        assert_eq!(cells, vec![(0, 2), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_t_rotation_sequence() {
        // spawn: .T. / TTT
        let right = Shape::T.rotation_state(Rotation::new(1));
        let cells: Vec<_> = right.occupied().collect();
        assert_eq!(cells, vec![(0, 1), (1, 1), (1, 2), (2, 1)]);

        let down = Shape::T.rotation_state(Rotation::new(2));
        let cells: Vec<_> = down.occupied().collect();
        assert_eq!(cells, vec![(1, 0), (1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_o_rotations_identical() {
        let states = Shape::O.rotation_states();
        assert!(states.iter().all(|m| m == &states[0]));
    }

    #[test]
    fn test_rotation_wraps() {
        let mut rotation = Rotation::default();
        for _ in 0..Rotation::COUNT {
            rotation = rotation.rotated_right();
        }
        assert_eq!(rotation, Rotation::default());
        assert_eq!(Rotation::new(6).index(), 2);
    }

    #[test]
    fn test_occupied_rows_and_cols() {
        let spawn = Shape::I.rotation_state(Rotation::default());
        assert_eq!(spawn.occupied_rows().collect::<Vec<_>>(), vec![1]);
        assert_eq!(spawn.occupied_cols().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_shape_char_conversion() {
        for shape in Shape::ALL {
            assert_eq!(Shape::from_char(shape.as_char()), Some(shape));
        }
        assert_eq!(Shape::from_char('x'), None);
    }

    #[test]
    fn test_random_shape_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = [false; Shape::LEN];
        for _ in 0..500 {
            let shape: Shape = rng.random();
            seen[shape as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
