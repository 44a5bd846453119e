use serde::Serialize;

use crate::EngineFault;

/// Points awarded per lock, indexed by the number of lines it cleared.
///
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points
pub const SCORE_TABLE: [usize; 5] = [0, 40, 100, 300, 1200];

/// Returns the reward for one lock that cleared `cleared_lines` lines.
///
/// A piece spans at most four rows, so any larger count means the engine
/// is broken and is reported as a fault.
pub fn line_clear_reward(cleared_lines: usize) -> Result<usize, EngineFault> {
    SCORE_TABLE
        .get(cleared_lines)
        .copied()
        .ok_or(EngineFault::ImpossibleLineClear {
            count: cleared_lines,
        })
}

/// Score and lock statistics of a session.
///
/// The score only ever grows, and only through [`SCORE_TABLE`].
///
/// # Example
///
/// ```
/// use stackfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4).unwrap(); // four lines at once
///
/// assert_eq!(stats.score(), 1200);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Pieces locked without ending the game.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by lines cleared; index 4 counts four-line clears.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records one lock and returns the points it earned.
    ///
    /// Nothing is recorded when `cleared_lines` is impossible.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> Result<usize, EngineFault> {
        let points = line_clear_reward(cleared_lines)?;
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[cleared_lines] += 1;
        self.score += points;
        Ok(points)
    }
}
