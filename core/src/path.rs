use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

/// Result of a finished run, handed over to whoever presents it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: Score,
    pub high_score: Score,
    pub is_new_high_score: bool,
}

/// Best score seen so far.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HighScore(Score);

impl HighScore {
    pub const fn new(best: Score) -> Self {
        Self(best)
    }

    pub const fn get(self) -> Score {
        self.0
    }

    /// Records a finished run, the best only moves when strictly beaten.
    pub fn submit(&mut self, score: Score) -> RunSummary {
        let is_new_high_score = score > self.0;
        if is_new_high_score {
            self.0 = score;
        }
        RunSummary {
            score,
            high_score: self.0,
            is_new_high_score,
        }
    }
}

/// Outcome of stepping onto a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Prime cell, the path grew. `points` is zero when the cell was already credited.
    Accepted { points: Score },
    /// Composite cell, the caller is expected to [`PathState::reset`].
    Rejected(NotPrime),
    /// Goal reached, `summary.score` includes the completion bonus.
    Won { points: Score, summary: RunSummary },
}

impl MoveOutcome {
    /// Points earned by the step itself, excluding the completion bonus.
    pub const fn points(self) -> Score {
        match self {
            Self::Accepted { points } | Self::Won { points, .. } => points,
            Self::Rejected(_) => 0,
        }
    }
}

/// Player progress within one run: the cells walked so far and the score they earned.
#[derive(Clone, Debug, PartialEq)]
pub struct PathState {
    selected_path: Vec<Coord2>,
    scored_tiles: HashSet<Coord2>,
    score: Score,
    completion_bonus: Score,
}

impl PathState {
    pub fn new(completion_bonus: Score) -> Self {
        Self {
            selected_path: Vec::new(),
            scored_tiles: HashSet::new(),
            score: 0,
            completion_bonus,
        }
    }

    pub fn selected_path(&self) -> &[Coord2] {
        &self.selected_path
    }

    /// Last cell stepped on, `None` before the first move.
    pub fn head(&self) -> Option<Coord2> {
        self.selected_path.last().copied()
    }

    /// Where the player stands: the path head, or the start corner.
    pub fn position(&self) -> Coord2 {
        self.head().unwrap_or((0, 0))
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn is_scored(&self, coords: Coord2) -> bool {
        self.scored_tiles.contains(&coords)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.selected_path.contains(&coords)
    }

    /// Drops the whole path and score, no partial credit survives.
    pub fn reset(&mut self) {
        self.selected_path.clear();
        self.scored_tiles.clear();
        self.score = 0;
    }

    /// Steps onto `target`, which the caller has already checked to be in bounds and adjacent.
    ///
    /// A prime is credited with its face value the first time it is stepped on. Reaching the goal adds the
    /// completion bonus and submits the final score to `high_score`. Rejections leave the state untouched.
    pub fn attempt_move(
        &mut self,
        grid: &Grid,
        target: Coord2,
        high_score: &mut HighScore,
    ) -> MoveOutcome {
        debug_assert!(grid.validate_coords(target).is_ok());

        let value = grid[target].value();
        if let Some(not_prime) = NotPrime::check(value.into()) {
            return MoveOutcome::Rejected(not_prime);
        }

        self.selected_path.push(target);
        let points = if self.scored_tiles.insert(target) {
            Score::from(value)
        } else {
            0
        };
        self.score = self.score.saturating_add(points);

        if grid.is_goal(target) {
            self.score = self.score.saturating_add(self.completion_bonus);
            let summary = high_score.submit(self.score);
            MoveOutcome::Won { points, summary }
        } else {
            MoveOutcome::Accepted { points }
        }
    }
}

impl Default for PathState {
    fn default() -> Self {
        Self::new(GameConfig::DEFAULT_COMPLETION_BONUS)
    }
}
