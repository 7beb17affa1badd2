use super::*;
use ndarray::Array2;
use rand::prelude::*;
use smallvec::SmallVec;

/// Corner-to-corner staircase, `2 * size - 1` cells long.
pub type GuaranteedPath = SmallVec<[Coord2; 17]>;

/// Generation strategy that lays a random right/down staircase of primes from the start to the goal and fills the
/// rest of the board randomly with a mix of primes and composites.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomGridGenerator {
    seed: u64,
}

impl RandomGridGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// Shuffled values of one kind, falls back to reusing values once the fresh ones run out.
#[derive(Debug)]
struct ValuePool {
    fresh: Vec<u8>,
    all: Vec<u8>,
}

impl ValuePool {
    fn shuffled(all: Vec<u8>, rng: &mut SmallRng) -> Self {
        let mut fresh = all.clone();
        fresh.shuffle(rng);
        Self { fresh, all }
    }

    fn draw(&mut self) -> Option<u8> {
        self.fresh.pop()
    }

    fn recycle(&self, rng: &mut SmallRng) -> u8 {
        debug_assert!(!self.all.is_empty());
        self.all[rng.random_range(0..self.all.len())]
    }
}

pub(crate) fn guaranteed_path(size: Coord, rng: &mut SmallRng) -> GuaranteedPath {
    let last = size.saturating_sub(1);
    let (mut x, mut y) = (0, 0);
    let mut path = GuaranteedPath::new();
    path.push((x, y));

    while x < last || y < last {
        let can_move_right = x < last;
        let can_move_down = y < last;
        if can_move_right && (!can_move_down || rng.random_bool(0.5)) {
            x += 1;
        } else {
            y += 1;
        }
        path.push((x, y));
    }

    path
}

impl GridGenerator for RandomGridGenerator {
    fn generate(self, config: GameConfig) -> Grid {
        let size = config.size.max(1);
        let dim = (usize::from(size), usize::from(size));
        let bonus_prime_chance = if config.bonus_prime_chance.is_nan() {
            0.0
        } else {
            config.bonus_prime_chance.clamp(0.0, 1.0)
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (primes, non_primes) = partition_primes(MIN_VALUE..=MAX_VALUE);
        let unique_values = primes.len() + non_primes.len();
        let mut primes = ValuePool::shuffled(primes, &mut rng);
        let mut non_primes = ValuePool::shuffled(non_primes, &mut rng);

        if usize::from(mult(size, size)) > unique_values {
            log::warn!(
                "Grid of size {} needs {} values but only {} are unique, some will repeat",
                size,
                mult(size, size),
                unique_values
            );
        }

        // None marks a cell not assigned yet
        let mut assigned: Array2<Option<Cell>> = Array2::default(dim);

        let path = guaranteed_path(size, &mut rng);
        log::trace!("Guaranteed path: {:?}", path);
        for &coords in &path {
            let value = primes.draw().unwrap_or_else(|| {
                log::warn!("Ran out of primes for the guaranteed path, reusing one");
                primes.recycle(&mut rng)
            });
            assigned[coords.to_nd_index()] = Some(Cell::new(value));
        }

        let cells = Array2::from_shape_fn(dim, |index| {
            if let Some(cell) = assigned[index] {
                return cell;
            }

            let value = if rng.random_bool(bonus_prime_chance) {
                primes.draw().or_else(|| non_primes.draw())
            } else {
                non_primes.draw().or_else(|| primes.draw())
            };
            let value = value.unwrap_or_else(|| {
                log::warn!("Both value pools exhausted at {:?}, reusing a composite", index);
                non_primes.recycle(&mut rng)
            });
            Cell::new(value)
        });

        let grid = Grid::from_cells(cells);
        log::debug!(
            "Generated {}x{} grid from seed {} with {} primes",
            size,
            size,
            self.seed,
            grid.prime_count()
        );
        grid
    }
}
