use serde::Serialize;

/// Game statistics tracking score and locked pieces.
///
/// - **Score**: one point per cleared row
/// - **Completed pieces**: total number of pieces locked into the board
/// - **Row clear distribution**: how many locks cleared 0, 1, 2, 3 or 4 rows
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(0);
/// stats.add_cleared_row();
/// stats.add_cleared_row();
/// stats.complete_piece_drop(2);
///
/// assert_eq!(stats.score(), 2);
/// assert_eq!(stats.completed_pieces(), 2);
/// assert_eq!(stats.row_cleared_counter()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: u32,
    completed_pieces: usize,
    row_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            row_cleared_counter: [0; 5],
        }
    }

    /// Returns the current score (total rows cleared).
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns a histogram of locks by rows cleared.
    ///
    /// Index `n` counts the locks that cleared exactly `n` rows.
    #[must_use]
    pub const fn row_cleared_counter(&self) -> &[usize; 5] {
        &self.row_cleared_counter
    }

    /// Records one lock that cleared `cleared_rows` rows.
    pub fn complete_piece_drop(&mut self, cleared_rows: usize) {
        self.completed_pieces += 1;
        if let Some(count) = self.row_cleared_counter.get_mut(cleared_rows) {
            *count += 1;
        }
    }

    /// Adds one point for a cleared row and returns the new score.
    pub fn add_cleared_row(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }
}
