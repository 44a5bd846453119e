use std::fmt;

use serde::Serialize;

use super::{piece::Position, shape::Color};

/// A single locked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Color),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Result of locking cells into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameOverSignal {
    Continue,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GridRow {
    cells: Vec<Cell>,
}

impl GridRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; width],
        }
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    fn is_clear(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

/// The board of locked cells.
///
/// # Layout
///
/// Row 0 is the top. The first `buffer_rows` rows are a hidden buffer
/// above the visible field, and row 0 itself is the spawn row: a lock that
/// leaves anything in it ends the game.
///
/// ```text
/// row 0            spawn row  ┐
/// row 1..buffer    buffer     ┘ hidden
/// row buffer..     visible field (height rows)
/// ```
///
/// The grid is the only authority on collision. Pieces hand it candidate
/// positions and never look at the cells themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    buffer_rows: usize,
    rows: Vec<GridRow>,
}

impl Grid {
    /// Creates an empty grid with `height` visible rows, `width` columns and
    /// `buffer_rows` hidden rows on top.
    #[must_use]
    pub fn new(height: usize, width: usize, buffer_rows: usize) -> Self {
        Self {
            width,
            height,
            buffer_rows,
            rows: vec![GridRow::empty(width); buffer_rows + height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of visible rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn buffer_rows(&self) -> usize {
        self.buffer_rows
    }

    /// Visible plus buffer rows.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cell at `position`, or `None` when it is off the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        let (row, col) = self.index(position)?;
        Some(self.rows[row].cells[col])
    }

    fn index(&self, position: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        (row < self.rows.len() && col < self.width).then_some((row, col))
    }

    /// True iff every position is on the grid and currently empty.
    pub fn is_legal_placement<I>(&self, cells: I) -> bool
    where
        I: IntoIterator<Item = Position>,
    {
        cells
            .into_iter()
            .all(|position| self.cell(position).is_some_and(Cell::is_empty))
    }

    /// Marks every position as occupied with `color`.
    ///
    /// Positions off the grid cannot be stored; one above the top still
    /// counts as an intrusion into the spawn row. Positions that are already
    /// occupied keep their cell. The game is over when, after the lock, the
    /// spawn row holds any occupied cell.
    pub fn lock<I>(&mut self, cells: I, color: Color) -> GameOverSignal
    where
        I: IntoIterator<Item = Position>,
    {
        let mut above_top = false;
        for position in cells {
            if position.row < 0 {
                above_top = true;
            }
            match self.index(position) {
                Some((row, col)) => {
                    let cell = &mut self.rows[row].cells[col];
                    if cell.is_empty() {
                        *cell = Cell::Occupied(color);
                    } else {
                        log::debug!("keeping occupied cell at {position:?}");
                    }
                }
                None => log::warn!("dropping locked cell outside the grid at {position:?}"),
            }
        }

        if above_top || self.rows.first().is_some_and(|row| !row.is_clear()) {
            GameOverSignal::GameOver
        } else {
            GameOverSignal::Continue
        }
    }

    /// Removes every full row and returns how many were removed.
    ///
    /// Full rows are collected in one pass before anything moves. The grid
    /// is then rebuilt from the remaining rows in their original order, with
    /// fresh empty rows prepended at the top to keep the row count.
    pub fn clear_full_lines(&mut self) -> usize {
        let full: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(y, row)| row.is_full().then_some(y))
            .collect();
        if full.is_empty() {
            return 0;
        }

        let mut y = 0;
        self.rows.retain(|_| {
            let keep = full.binary_search(&y).is_err();
            y += 1;
            keep
        });
        let mut rebuilt = vec![GridRow::empty(self.width); full.len()];
        rebuilt.append(&mut self.rows);
        self.rows = rebuilt;

        log::debug!("cleared rows {full:?}");
        full.len()
    }

    /// Read-only view of the locked cells, ready for overlays.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            buffer_rows: self.buffer_rows,
            rows: self
                .rows
                .iter()
                .map(|row| row.cells.iter().map(|&c| Block::from(c)).collect())
                .collect(),
        }
    }

    /// Builds a grid from ASCII art, mainly for tests.
    ///
    /// `#` is an occupied cell and `.` an empty one. Rows are aligned to the
    /// bottom of the grid: the last line of `art` is the bottom row.
    #[must_use]
    pub fn from_ascii(height: usize, width: usize, buffer_rows: usize, art: &str) -> Self {
        let mut grid = Self::new(height, width, buffer_rows);
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= grid.total_rows(),
            "art has {} rows, grid only {}",
            lines.len(),
            grid.total_rows()
        );

        let first_row = grid.total_rows() - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| matches!(c, '#' | '.')).collect();
            assert_eq!(
                cells.len(),
                width,
                "each row must have exactly {width} cells, got {} at line {i}",
                cells.len()
            );
            for (x, ch) in cells.into_iter().enumerate() {
                if ch == '#' {
                    grid.rows[first_row + i].cells[x] = Cell::Occupied(Color::GRAY);
                }
            }
        }
        grid
    }
}

/// Renders the whole grid as `#`/`.` rows, top row first.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in &row.cells {
                f.write_str(if cell.is_empty() { "." } else { "#" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// What a renderer should draw in one snapshot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Block {
    #[default]
    Empty,
    Locked(Color),
    Falling(Color),
    /// Landing preview of the falling piece.
    Ghost,
}

impl From<Cell> for Block {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => Block::Empty,
            Cell::Occupied(color) => Block::Locked(color),
        }
    }
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Locked(_) => '#',
            Block::Falling(_) => '@',
            Block::Ghost => '+',
        }
    }
}

/// Copy of every grid cell plus overlays, for the presentation layer.
///
/// Taking or modifying a snapshot never touches the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GridSnapshot {
    width: usize,
    height: usize,
    buffer_rows: usize,
    rows: Vec<Vec<Block>>,
}

impl GridSnapshot {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn buffer_rows(&self) -> usize {
        self.buffer_rows
    }

    /// All rows including the hidden buffer, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[Block]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Only the visible rows, top first.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Block]> {
        self.rows().skip(self.buffer_rows)
    }

    #[must_use]
    pub fn block(&self, position: Position) -> Option<Block> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        self.rows.get(row)?.get(col).copied()
    }

    /// Paints `block` over the given positions; off-grid positions are skipped.
    pub fn overlay<I>(&mut self, cells: I, block: Block)
    where
        I: IntoIterator<Item = Position>,
    {
        for position in cells {
            let (Ok(row), Ok(col)) = (usize::try_from(position.row), usize::try_from(position.col))
            else {
                continue;
            };
            if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                *slot = block;
            }
        }
    }

    /// Text rendering of the visible rows (`.` empty, `#` locked, `@` falling, `+` ghost).
    #[must_use]
    pub fn visible_text(&self) -> Vec<String> {
        self.visible_rows()
            .map(|row| row.iter().map(|b| b.as_char()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied_count(grid: &Grid) -> usize {
        grid.rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|c| !c.is_empty())
            .count()
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(20, 12, 2);
        assert_eq!(grid.total_rows(), 22);
        assert_eq!(grid.width(), 12);
        assert_eq!(occupied_count(&grid), 0);
    }

    #[test]
    fn test_legal_placement_bounds() {
        let grid = Grid::new(20, 12, 2);
        assert!(grid.is_legal_placement([Position::new(0, 0), Position::new(21, 11)]));
        assert!(!grid.is_legal_placement([Position::new(-1, 0)]));
        assert!(!grid.is_legal_placement([Position::new(22, 0)]));
        assert!(!grid.is_legal_placement([Position::new(5, -1)]));
        assert!(!grid.is_legal_placement([Position::new(5, 12)]));
        assert!(grid.is_legal_placement(std::iter::empty()));
    }

    #[test]
    fn test_legal_placement_occupied() {
        let mut grid = Grid::new(20, 12, 2);
        let signal = grid.lock([Position::new(10, 3)], Color::RED);
        assert!(signal.is_continue());
        assert!(!grid.is_legal_placement([Position::new(10, 4), Position::new(10, 3)]));
        assert_eq!(grid.cell(Position::new(10, 3)), Some(Cell::Occupied(Color::RED)));
    }

    #[test]
    fn test_lock_in_spawn_row_is_game_over() {
        let mut grid = Grid::new(20, 12, 2);
        assert!(grid.lock([Position::new(0, 5)], Color::RED).is_game_over());
    }

    #[test]
    fn test_lock_in_buffer_below_spawn_row_continues() {
        let mut grid = Grid::new(20, 12, 4);
        let cells = [1, 2, 3].map(|row| Position::new(row, 5));
        assert!(grid.lock(cells, Color::RED).is_continue());
        assert_eq!(occupied_count(&grid), 3);
    }

    #[test]
    fn test_lock_above_grid_is_game_over() {
        let mut grid = Grid::new(20, 12, 2);
        let signal = grid.lock([Position::new(-1, 5), Position::new(1, 5)], Color::RED);
        assert!(signal.is_game_over());
        assert_eq!(occupied_count(&grid), 1);
    }

    #[test]
    fn test_lock_keeps_already_occupied_cells() {
        let mut grid = Grid::new(20, 12, 2);
        grid.lock([Position::new(1, 5)], Color::GRAY);
        let signal = grid.lock([Position::new(0, 5), Position::new(1, 5)], Color::RED);
        assert!(signal.is_game_over());
        assert_eq!(grid.cell(Position::new(0, 5)), Some(Cell::Occupied(Color::RED)));
        assert_eq!(grid.cell(Position::new(1, 5)), Some(Cell::Occupied(Color::GRAY)));
        assert_eq!(occupied_count(&grid), 2);
    }

    #[test]
    fn test_clear_no_full_rows_is_noop() {
        let mut grid = Grid::from_ascii(
            20,
            12,
            2,
            r"
            #.#.#.#.#.#.
            ###########.
            ",
        );
        let before = grid.clone();
        assert_eq!(grid.clear_full_lines(), 0);
        assert_eq!(grid, before);
        assert_eq!(grid.clear_full_lines(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_clear_single_bottom_row_shifts_above_down() {
        let mut grid = Grid::from_ascii(
            20,
            12,
            2,
            r"
            #..........#
            ############
            ",
        );
        assert_eq!(grid.clear_full_lines(), 1);
        let expected = Grid::from_ascii(
            20,
            12,
            2,
            r"
            #..........#
            ",
        );
        assert_eq!(grid, expected);
        assert_eq!(grid.total_rows(), 22);
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut grid = Grid::from_ascii(
            6,
            4,
            1,
            r"
            #...
            ####
            .#..
            ..#.
            ####
            ...#
            ",
        );
        assert_eq!(grid.clear_full_lines(), 2);
        let expected = Grid::from_ascii(
            6,
            4,
            1,
            r"
            #...
            .#..
            ..#.
            ...#
            ",
        );
        assert_eq!(grid, expected);
    }

    #[test]
    fn test_clear_four_rows_keeps_height() {
        let mut grid = Grid::from_ascii(
            20,
            12,
            2,
            r"
            .#..........
            ############
            ############
            ############
            ############
            ",
        );
        assert_eq!(grid.clear_full_lines(), 4);
        assert_eq!(grid.total_rows(), 22);
        assert_eq!(occupied_count(&grid), 1);
        assert_eq!(grid.cell(Position::new(21, 1)), Some(Cell::Occupied(Color::GRAY)));
    }

    #[test]
    fn test_clear_preserves_colors() {
        let mut grid = Grid::new(4, 4, 1);
        grid.lock([Position::new(3, 0)], Color::RED);
        grid.lock((0..4).map(|col| Position::new(4, col)), Color::BLUE);
        assert_eq!(grid.clear_full_lines(), 1);
        assert_eq!(grid.cell(Position::new(4, 0)), Some(Cell::Occupied(Color::RED)));
    }

    #[test]
    fn test_snapshot_overlay_does_not_touch_grid() {
        let grid = Grid::from_ascii(4, 4, 1, "#...");
        let before = grid.clone();
        let mut snapshot = grid.snapshot();
        snapshot.overlay(
            [Position::new(0, 1), Position::new(-1, 0), Position::new(2, 9)],
            Block::Falling(Color::CYAN),
        );
        assert_eq!(snapshot.block(Position::new(0, 1)), Some(Block::Falling(Color::CYAN)));
        assert_eq!(snapshot.block(Position::new(4, 0)), Some(Block::Locked(Color::GRAY)));
        assert_eq!(snapshot.visible_text(), vec!["....", "....", "....", "#..."]);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_display() {
        let grid = Grid::from_ascii(2, 3, 1, "#.#");
        assert_eq!(grid.to_string(), "...\n...\n#.#\n");
    }
}
