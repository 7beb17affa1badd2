use core::ops::Index;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Smallest value a cell may hold.
pub const MIN_VALUE: u8 = 2;
/// Largest value a cell may hold.
pub const MAX_VALUE: u8 = 100;

/// Square board of numbered cells, indexed by `(x, y)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    pub(crate) fn from_cells(cells: Array2<Cell>) -> Self {
        debug_assert_eq!(cells.nrows(), cells.ncols());
        Self { cells }
    }

    /// Builds a grid from row-major values, `rows[y][x]` ends up at `(x, y)`.
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self> {
        let size = rows.len();
        if size == 0
            || size > Coord::MAX.into()
            || rows.iter().any(|row| row.len() != size)
        {
            return Err(GameError::InvalidGridShape);
        }

        let mut seen = HashSet::with_capacity(size * size);
        for &value in rows.iter().flat_map(|row| row.iter()) {
            if !(MIN_VALUE..=MAX_VALUE).contains(&value) {
                return Err(GameError::ValueOutOfRange(value));
            }
            if !seen.insert(value) {
                return Err(GameError::DuplicateValue(value));
            }
        }

        let cells = Array2::from_shape_fn((size, size), |(x, y)| Cell::new(rows[y][x]));
        Ok(Self::from_cells(cells))
    }

    /// Side length of the board.
    pub fn size(&self) -> Coord {
        self.cells.nrows() as Coord
    }

    pub fn bounds(&self) -> Coord2 {
        let size = self.size();
        (size, size)
    }

    pub const fn start(&self) -> Coord2 {
        (0, 0)
    }

    pub fn goal(&self) -> Coord2 {
        let last = self.size().saturating_sub(1);
        (last, last)
    }

    pub fn is_goal(&self, coords: Coord2) -> bool {
        coords == self.goal()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }

    pub fn prime_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_prime()).count() as CellCount
    }

    /// Finds a right/down path of prime cells from the start to the goal.
    pub fn find_prime_path(&self) -> Option<Vec<Coord2>> {
        let mut reachable = Array2::from_elem(self.cells.dim(), false);

        // logical order visits (x - 1, y) and (x, y - 1) before (x, y)
        for ((x, y), cell) in self.cells.indexed_iter() {
            reachable[[x, y]] = cell.is_prime()
                && ((x, y) == (0, 0)
                    || (x > 0 && reachable[[x - 1, y]])
                    || (y > 0 && reachable[[x, y - 1]]));
        }

        let goal = self.goal();
        if !reachable[goal.to_nd_index()] {
            return None;
        }

        let (mut x, mut y) = (usize::from(goal.0), usize::from(goal.1));
        let mut path = vec![goal];
        while (x, y) != (0, 0) {
            if x > 0 && reachable[[x - 1, y]] {
                x -= 1;
            } else {
                y -= 1;
            }
            path.push((x as Coord, y as Coord));
        }
        path.reverse();
        Some(path)
    }

    pub fn has_prime_path(&self) -> bool {
        self.find_prime_path().is_some()
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.cells[(x as usize, y as usize)]
    }
}
