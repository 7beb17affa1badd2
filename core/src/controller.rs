use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - Idle -> Active
/// - Active -> Active
/// - Active -> Resetting -> Active
/// - Active -> Won
/// - Won -> Active (new run)
/// - any -> Idle (run ended)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No run started
    Idle,
    /// Accepting moves
    Active,
    /// A wrong step wiped the path, waiting for the presentation to settle
    Resetting,
    /// Goal reached, no new moves are accepted
    Won,
}

impl RunState {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::Active | Self::Resetting)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Notification for the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEvent {
    MoveAccepted {
        coords: Coord2,
        points: Score,
    },
    MoveRejected {
        coords: Coord2,
        value: u8,
        reason: NotPrimeReason,
    },
    RunWon {
        summary: RunSummary,
    },
    /// Path and score were wiped, the player is back at the start.
    RunReset,
}

/// Events caused by a single intent, at most two.
pub type RunEvents = SmallVec<[RunEvent; 2]>;

/// Board and progress of the current run.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    grid: Grid,
    path: PathState,
}

impl Session {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn path(&self) -> &PathState {
        &self.path
    }
}

/// Drives runs: turns directional intents into moves, one at a time, and keeps the high score.
#[derive(Debug)]
pub struct RunController<S> {
    config: GameConfig,
    store: S,
    high_score: HighScore,
    session: Option<Session>,
    state: RunState,
    move_in_flight: bool,
    cooldown_until: Option<Instant>,
}

impl<S: KeyValueStore> RunController<S> {
    pub fn new(config: GameConfig, store: S) -> Self {
        let high_score = HighScore::load(&store).unwrap_or_default();
        Self {
            config,
            store,
            high_score,
            session: None,
            state: Default::default(),
            move_in_flight: false,
            cooldown_until: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.session.as_ref().map(Session::grid)
    }

    pub fn path(&self) -> Option<&PathState> {
        self.session.as_ref().map(Session::path)
    }

    /// Score of the current run, zero when there is none.
    pub fn score(&self) -> Score {
        self.path().map_or(0, PathState::score)
    }

    pub fn high_score(&self) -> Score {
        self.high_score.get()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_move_in_flight(&self) -> bool {
        self.move_in_flight
    }

    /// Whether an intent arriving at `now` would be dropped by the debounce.
    pub fn is_blocked_at(&self, now: Instant) -> bool {
        self.move_in_flight || self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Generates a fresh board of `size` (clamped to the supported range) and starts a run on it.
    pub fn start_new_run(&mut self, size: Coord, seed: u64) -> Result<()> {
        self.check_can_start()?;
        self.config.size = GameConfig::new(size).size;
        let grid = RandomGridGenerator::new(seed).generate(self.config);
        self.begin(grid);
        Ok(())
    }

    /// Starts a run on a prepared board.
    pub fn start_run_with(&mut self, grid: Grid) -> Result<()> {
        self.check_can_start()?;
        self.config.size = grid.size();
        self.begin(grid);
        Ok(())
    }

    /// Discards the current run, if any.
    pub fn end_run(&mut self) {
        if self.session.take().is_some() {
            log::debug!("Run ended in state {:?}", self.state);
        }
        self.state = RunState::Idle;
        self.move_in_flight = false;
        self.cooldown_until = None;
    }

    pub fn handle_intent(&mut self, direction: Direction) -> RunEvents {
        self.handle_intent_at(direction, Instant::now())
    }

    /// Moves one step in `direction`, intents that cannot be honored right now are dropped.
    pub fn handle_intent_at(&mut self, direction: Direction, now: Instant) -> RunEvents {
        let Some(session) = &self.session else {
            log::trace!("Ignoring {:?}, no run", direction);
            return RunEvents::new();
        };

        let position = session.path.position();
        let Some(target) = direction.apply(position, session.grid.bounds()) else {
            log::trace!("Ignoring {:?}, edge of the board at {:?}", direction, position);
            return RunEvents::new();
        };

        match self.move_to_at(target, now) {
            Ok(events) => events,
            Err(err) => {
                log::trace!("Ignoring {:?}: {}", direction, err);
                RunEvents::new()
            }
        }
    }

    pub fn move_to(&mut self, target: Coord2) -> Result<RunEvents> {
        self.move_to_at(target, Instant::now())
    }

    /// Steps onto `target`, which has to be next to the current position.
    pub fn move_to_at(&mut self, target: Coord2, now: Instant) -> Result<RunEvents> {
        if !self.state.is_in_progress() {
            return Err(GameError::NoActiveRun);
        }
        if self.is_blocked_at(now) {
            return Err(GameError::MoveInFlight);
        }

        let session = self.session.as_mut().ok_or(GameError::NoActiveRun)?;
        let target = session.grid.validate_coords(target)?;
        if !is_adjacent(session.path.position(), target) {
            return Err(GameError::NotAdjacent);
        }

        self.move_in_flight = true;
        self.cooldown_until = now.checked_add(self.config.move_cooldown);

        let mut events = RunEvents::new();
        match session
            .path
            .attempt_move(&session.grid, target, &mut self.high_score)
        {
            MoveOutcome::Accepted { points } => {
                log::debug!("Step to {:?} earned {} points", target, points);
                events.push(RunEvent::MoveAccepted {
                    coords: target,
                    points,
                });
            }
            MoveOutcome::Rejected(not_prime) => {
                log::debug!("Step to {:?} rejected: {}", target, not_prime);
                session.path.reset();
                self.state = RunState::Resetting;
                events.push(RunEvent::MoveRejected {
                    coords: target,
                    value: session.grid[target].value(),
                    reason: not_prime.reason,
                });
                events.push(RunEvent::RunReset);
            }
            MoveOutcome::Won { points, summary } => {
                log::debug!("Goal reached with {} points", summary.score);
                self.state = RunState::Won;
                if summary.is_new_high_score {
                    self.high_score.save(&mut self.store);
                }
                events.push(RunEvent::MoveAccepted {
                    coords: target,
                    points,
                });
                events.push(RunEvent::RunWon { summary });
            }
        }

        Ok(events)
    }

    /// The presentation finished animating the last move.
    pub fn settle_move(&mut self) {
        if !self.move_in_flight {
            return;
        }
        self.move_in_flight = false;
        if matches!(self.state, RunState::Resetting) {
            log::trace!("Reset settled");
            self.state = RunState::Active;
        }
    }

    fn check_can_start(&self) -> Result<()> {
        if self.state.is_in_progress() {
            Err(GameError::RunInProgress)
        } else {
            Ok(())
        }
    }

    fn begin(&mut self, grid: Grid) {
        if let Some(stored) = HighScore::load(&self.store) {
            self.high_score = self.high_score.max(stored);
        }

        log::debug!(
            "Run started on a {}x{} grid, high score {}",
            grid.size(),
            grid.size(),
            self.high_score.get()
        );
        self.session = Some(Session {
            grid,
            path: PathState::new(self.config.completion_bonus),
        });
        self.state = RunState::Active;
        self.move_in_flight = false;
        self.cooldown_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    // 2 3 9
    // 4 5 7
    // 6 8 11
    fn grid() -> Grid {
        Grid::from_rows(&[&[2, 3, 9], &[4, 5, 7], &[6, 8, 11]]).unwrap()
    }

    fn controller() -> RunController<MemoryStore> {
        let mut controller = RunController::new(GameConfig::default(), MemoryStore::new());
        controller.start_run_with(grid()).unwrap();
        controller
    }

    /// Applies an intent and lets its animation and cooldown finish.
    fn step(
        controller: &mut RunController<MemoryStore>,
        direction: Direction,
        now: &mut Instant,
    ) -> RunEvents {
        let events = controller.handle_intent_at(direction, *now);
        controller.settle_move();
        *now += Duration::from_secs(1);
        events
    }

    #[test]
    fn starts_idle() {
        let controller = RunController::new(GameConfig::default(), MemoryStore::new());

        assert_eq!(controller.state(), RunState::Idle);
        assert!(controller.grid().is_none());
        assert_eq!(controller.score(), 0);
    }

    #[test]
    fn intents_without_run_are_ignored() {
        let mut controller = RunController::new(GameConfig::default(), MemoryStore::new());

        assert!(controller.handle_intent(Direction::Right).is_empty());
        assert_eq!(controller.move_to((1, 0)), Err(GameError::NoActiveRun));
    }

    #[test]
    fn accepted_move_emits_points() {
        let mut controller = controller();
        let mut now = Instant::now();

        let events = step(&mut controller, Direction::Right, &mut now);

        assert_eq!(
            events.as_slice(),
            &[RunEvent::MoveAccepted {
                coords: (1, 0),
                points: 3,
            }]
        );
        assert_eq!(controller.score(), 3);
        assert_eq!(controller.state(), RunState::Active);
    }

    #[test]
    fn rejected_move_resets_run() {
        let mut controller = controller();
        let mut now = Instant::now();

        step(&mut controller, Direction::Right, &mut now);
        let events = controller.handle_intent_at(Direction::Right, now);

        assert_eq!(
            events.as_slice(),
            &[
                RunEvent::MoveRejected {
                    coords: (2, 0),
                    value: 9,
                    reason: NotPrimeReason::DivisibleBy(3),
                },
                RunEvent::RunReset,
            ]
        );
        assert_eq!(controller.state(), RunState::Resetting);
        assert_eq!(controller.score(), 0);
        assert!(controller.path().unwrap().selected_path().is_empty());

        controller.settle_move();
        assert_eq!(controller.state(), RunState::Active);
        assert_eq!(controller.path().unwrap().position(), (0, 0));
    }

    #[test]
    fn intents_are_debounced() {
        let mut controller = controller();
        let now = Instant::now();

        assert_eq!(controller.handle_intent_at(Direction::Right, now).len(), 1);
        // still animating
        assert!(controller.handle_intent_at(Direction::Down, now + Duration::from_secs(5)).is_empty());

        controller.settle_move();
        // animation done but cooldown still running
        assert!(controller.is_blocked_at(now + Duration::from_millis(100)));
        assert!(controller.handle_intent_at(Direction::Down, now + Duration::from_millis(100)).is_empty());
        assert_eq!(
            controller.move_to_at((1, 1), now + Duration::from_millis(199)),
            Err(GameError::MoveInFlight)
        );

        let events = controller.handle_intent_at(Direction::Down, now + Duration::from_millis(200));
        assert_eq!(
            events.as_slice(),
            &[RunEvent::MoveAccepted {
                coords: (1, 1),
                points: 5,
            }]
        );
        assert_eq!(controller.path().unwrap().selected_path(), &[(1, 0), (1, 1)]);
    }

    #[test]
    fn move_to_checks_contract() {
        let mut controller = controller();
        let now = Instant::now();

        assert_eq!(controller.move_to_at((1, 1), now), Err(GameError::NotAdjacent));
        assert_eq!(controller.move_to_at((0, 0), now), Err(GameError::NotAdjacent));
        assert_eq!(controller.move_to_at((3, 0), now), Err(GameError::InvalidCoords));
        assert!(!controller.is_move_in_flight());
    }

    #[test]
    fn edge_intents_are_ignored() {
        let mut controller = controller();

        assert!(controller.handle_intent(Direction::Left).is_empty());
        assert!(controller.handle_intent(Direction::Up).is_empty());
        assert!(!controller.is_move_in_flight());
    }

    #[test]
    fn winning_run_persists_high_score() {
        let mut controller = controller();
        let mut now = Instant::now();

        for direction in [Direction::Right, Direction::Down, Direction::Right] {
            step(&mut controller, direction, &mut now);
        }
        let events = controller.handle_intent_at(Direction::Down, now);

        let summary = RunSummary {
            score: 3 + 5 + 7 + 11 + 500,
            high_score: 3 + 5 + 7 + 11 + 500,
            is_new_high_score: true,
        };
        assert_eq!(
            events.as_slice(),
            &[
                RunEvent::MoveAccepted {
                    coords: (2, 2),
                    points: 11,
                },
                RunEvent::RunWon { summary },
            ]
        );
        assert_eq!(controller.state(), RunState::Won);
        assert_eq!(controller.high_score(), 526);
        assert_eq!(HighScore::load(controller.store()), Some(HighScore::new(526)));

        controller.settle_move();
        assert!(controller.handle_intent_at(Direction::Left, now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn new_run_only_from_idle_or_won() {
        let mut controller = controller();

        assert_eq!(controller.start_new_run(8, 1), Err(GameError::RunInProgress));

        controller.end_run();
        assert_eq!(controller.state(), RunState::Idle);
        assert!(controller.session().is_none());

        controller.start_new_run(8, 1).unwrap();
        assert_eq!(controller.state(), RunState::Active);
        assert_eq!(controller.grid().unwrap().size(), 8);
        assert!(controller.grid().unwrap().has_prime_path());
    }

    #[test]
    fn new_run_size_is_clamped() {
        let mut controller = RunController::new(GameConfig::default(), MemoryStore::new());

        controller.start_new_run(40, 9).unwrap();
        assert_eq!(controller.grid().unwrap().size(), GameConfig::MAX_SIZE);
        assert_eq!(controller.config().size, GameConfig::MAX_SIZE);
    }

    #[test]
    fn high_score_loaded_from_store() {
        let mut store = MemoryStore::new();
        HighScore::new(900).save(&mut store);

        let controller = RunController::new(GameConfig::default(), store);
        assert_eq!(controller.high_score(), 900);
    }

    #[test]
    fn unavailable_store_keeps_playing() {
        let mut controller = RunController::new(GameConfig::default(), MemoryStore::unavailable());
        controller.start_run_with(grid()).unwrap();
        let mut now = Instant::now();

        for direction in [Direction::Right, Direction::Down, Direction::Right, Direction::Down] {
            step(&mut controller, direction, &mut now);
        }

        assert_eq!(controller.state(), RunState::Won);
        assert_eq!(controller.high_score(), 526);
    }
}
