use serde::{Deserialize, Serialize};

/// Single coordinate axis used for the board size and positions.
pub type Coord = u8;

/// Count type used for total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`, `x` grows to the right and `y` grows down.
pub type Coord2 = (Coord, Coord);

/// Points accumulated during a run.
pub type Score = u32;

/// Minimum pointer travel, in pixels, for a swipe to count as a move.
pub const MIN_SWIPE_DISTANCE: f32 = 30.0;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Whether `a` and `b` are orthogonal neighbors.
pub const fn is_adjacent(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) as u16 + a.1.abs_diff(b.1) as u16 == 1
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub const fn delta(self) -> (i8, i8) {
        use Direction::*;
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    /// Moves `coords` one step, returning a value only when it remains in bounds.
    pub fn apply(self, coords: Coord2, bounds: Coord2) -> Option<Coord2> {
        let (x, y) = coords;
        let (dx, dy) = self.delta();
        let (max_x, max_y) = bounds;

        let next_x = x.checked_add_signed(dx)?;
        if next_x >= max_x {
            return None;
        }

        let next_y = y.checked_add_signed(dy)?;
        if next_y >= max_y {
            return None;
        }

        Some((next_x, next_y))
    }

    /// Translates a pointer swipe into a direction, the dominant axis wins.
    ///
    /// Returns `None` when the swipe is shorter than `min_distance` along both axes.
    pub fn from_swipe(dx: f32, dy: f32, min_distance: f32) -> Option<Self> {
        if dx.abs() < min_distance && dy.abs() < min_distance {
            return None;
        }

        Some(if dx.abs() > dy.abs() {
            if dx > 0.0 { Self::Right } else { Self::Left }
        } else if dy > 0.0 {
            Self::Down
        } else {
            Self::Up
        })
    }
}
