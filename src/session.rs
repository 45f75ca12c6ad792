use core::time::Duration;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Hints granted at the start of a session.
pub const DEFAULT_HINTS: u8 = 4;

/// Valid transitions:
/// - GameOver -> InGame (session start)
/// - InGame -> LevelCompleted (finished with a rank)
/// - InGame -> LevelFailed (finished unranked)
/// - InGame | LevelFailed -> InGame (retry)
/// - LevelCompleted -> InGame (next level)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    InGame,
    LevelFailed,
    LevelCompleted,
    GameOver,
}

impl FlowState {
    pub const fn is_in_game(self) -> bool {
        matches!(self, Self::InGame)
    }

    /// The level outcome has been decided.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::LevelFailed | Self::LevelCompleted)
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::GameOver
    }
}

/// HUD-facing view of the session, pushed after every mutation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub level: usize,
    pub score: u32,
    pub digs_remaining: u16,
    pub rank: Rank,
    pub hints_remaining: u8,
    pub diamonds_remaining: i32,
    pub next_rank_score: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HintOutcome {
    Played,
    /// Out of hints, on cooldown, or not in a level; silently rejected.
    Unavailable,
}

impl HintOutcome {
    pub const fn was_played(self) -> bool {
        matches!(self, Self::Played)
    }
}

/// Session owner: current level, score, dig budget, hints, and the flow
/// state machine. Owns the pool and the live board; collaborators drive it
/// through digs/hints and a [`GameFlow::tick`] update loop.
#[derive(Clone, Debug)]
pub struct GameFlow {
    catalogue: LevelCatalogue,
    pool: HandlePool,
    board: Option<BoardSim>,
    rng: SmallRng,
    state: FlowState,
    current_level: usize,
    score: u32,
    digs_used: u16,
    hints_remaining: u8,
    hints_used_this_level: u8,
    diamonds_remaining: i32,
    hint_timer: Duration,
    snapshots: Vec<SessionSnapshot>,
}

impl GameFlow {
    /// Builds a session over `catalogue`, seeding the per-level board
    /// generation from `seed`. The pool is preallocated for the largest
    /// level so mid-game growth stays the exception.
    pub fn new(catalogue: LevelCatalogue, seed: u64) -> Self {
        let max_cells = catalogue
            .iter()
            .map(|spec| usize::from(spec.total_cells()))
            .max()
            .unwrap_or(0);

        let mut pool = HandlePool::new();
        for key in [
            PoolKey::BombTile,
            PoolKey::EmptyTile,
            PoolKey::DiamondTile,
            PoolKey::Cover,
            PoolKey::HintBurst,
            PoolKey::ExplosionBurst,
        ] {
            pool.preallocate(key, max_cells);
        }

        Self {
            catalogue,
            pool,
            board: None,
            rng: SmallRng::seed_from_u64(seed),
            state: FlowState::default(),
            current_level: 1,
            score: 0,
            digs_used: 0,
            hints_remaining: DEFAULT_HINTS,
            hints_used_this_level: 0,
            diamonds_remaining: 0,
            hint_timer: Duration::ZERO,
            snapshots: Vec::new(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn diamonds_remaining(&self) -> i32 {
        self.diamonds_remaining
    }

    pub fn digs_remaining(&self) -> u16 {
        self.current_spec().digs.saturating_sub(self.digs_used)
    }

    pub fn hints_remaining(&self) -> u8 {
        self.hints_remaining
    }

    pub fn rank(&self) -> Rank {
        self.current_spec().rank_for_score(self.score)
    }

    pub fn is_last_level(&self) -> bool {
        self.current_level >= self.catalogue.len()
    }

    pub fn board(&self) -> Option<&BoardSim> {
        self.board.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let spec = self.current_spec();
        SessionSnapshot {
            level: self.current_level,
            score: self.score,
            digs_remaining: self.digs_remaining(),
            rank: spec.rank_for_score(self.score),
            hints_remaining: self.hints_remaining,
            diamonds_remaining: self.diamonds_remaining,
            next_rank_score: spec.next_rank_score(self.score),
        }
    }

    /// Drains the snapshots accumulated since the last call, one per
    /// session mutation, oldest first.
    pub fn take_snapshots(&mut self) -> Vec<SessionSnapshot> {
        core::mem::take(&mut self.snapshots)
    }

    /// Starts (or restarts) the 1-based level `index`: tears down any live
    /// board, generates a fresh one, and resets score and digs.
    pub fn start_level(&mut self, index: usize) -> Result<()> {
        self.current_level = index.clamp(1, self.catalogue.len());
        self.hints_used_this_level = 0;
        self.load_current_level()
    }

    /// Replays the current level. Hints spent on the failed attempt come
    /// back; score and digs reset.
    pub fn retry(&mut self) -> Result<()> {
        self.hints_remaining += self.hints_used_this_level;
        self.hints_used_this_level = 0;
        self.load_current_level()
    }

    /// Advances past a completed level, wrapping to the first level after
    /// the last.
    pub fn next_level(&mut self) -> Result<()> {
        self.current_level = if self.is_last_level() {
            1
        } else {
            self.current_level + 1
        };
        self.hints_used_this_level = 0;
        self.load_current_level()
    }

    fn load_current_level(&mut self) -> Result<()> {
        if let Some(board) = self.board.as_mut() {
            board.recycle_all(&mut self.pool);
        }

        let spec = self.current_spec().clone();
        let seed: u64 = self.rng.random();
        log::debug!("Generating level {} with seed {}", self.current_level, seed);
        let layout = RandomBoardGenerator::new(seed).generate(&spec)?;
        self.board = Some(BoardSim::materialize(layout, &mut self.pool)?);

        self.score = 0;
        self.digs_used = 0;
        self.diamonds_remaining = i32::from(spec.diamonds);
        self.hint_timer = Duration::ZERO;
        self.state = FlowState::InGame;
        self.push_snapshot();
        Ok(())
    }

    /// Player dig. Consumes one dig only when the board actually scheduled
    /// an explosion; exhausting the budget settles the level.
    pub fn dig(&mut self, coords: Coord2) -> Result<DigOutcome> {
        if !self.state.is_in_game() {
            return Err(GameError::AlreadyEnded);
        }
        let Some(board) = self.board.as_mut() else {
            return Err(GameError::AlreadyEnded);
        };

        let outcome = board.dig(coords)?;
        if outcome.was_scheduled() {
            self.digs_used += 1;
            self.push_snapshot();
            if self.digs_used >= self.current_spec().digs {
                self.finish_level();
            }
        }
        Ok(outcome)
    }

    /// Plays the hint sweep if one is available. Cooldown violations and
    /// empty hint counts are guarded no-ops, not errors.
    pub fn hint(&mut self) -> HintOutcome {
        if !self.state.is_in_game()
            || self.hints_remaining == 0
            || !self.hint_timer.is_zero()
        {
            return HintOutcome::Unavailable;
        }
        let Some(board) = self.board.as_mut() else {
            return HintOutcome::Unavailable;
        };

        board.hint_sweep();
        self.hints_remaining -= 1;
        self.hints_used_this_level += 1;
        self.hint_timer = HINT_COOLDOWN;
        self.push_snapshot();
        HintOutcome::Played
    }

    /// Advances the session clock: hint cooldown plus the board's delayed
    /// continuations. Returns the board events fired this tick so the
    /// presentation and audio layers can consume them.
    pub fn tick(&mut self, dt: Duration) -> Vec<BoardEvent> {
        self.hint_timer = self.hint_timer.saturating_sub(dt);

        let Some(board) = self.board.as_mut() else {
            return Vec::new();
        };
        board.tick(dt, &mut self.pool);
        let events = board.take_events();

        for event in &events {
            if let BoardEvent::DiamondsRemoved { count, .. } = event {
                self.register_diamonds(u32::from(*count));
            }
        }
        events
    }

    /// Diamonds left play: dug-up diamonds score and count against the
    /// level total. Reaching zero settles the level.
    fn register_diamonds(&mut self, count: u32) {
        if !self.state.is_in_game() {
            return;
        }
        self.diamonds_remaining -= count as i32;
        self.score += count;
        self.push_snapshot();
        if self.diamonds_remaining <= 0 {
            self.finish_level();
        }
    }

    /// Settles the current level: any rank completes it, unranked fails it.
    fn finish_level(&mut self) {
        if !self.state.is_in_game() {
            return;
        }
        self.state = if self.rank().is_ranked() {
            FlowState::LevelCompleted
        } else {
            FlowState::LevelFailed
        };
        log::debug!(
            "Level {} settled: score {}, rank {:?}",
            self.current_level,
            self.score,
            self.rank()
        );
        self.push_snapshot();
    }

    fn current_spec(&self) -> &LevelSpec {
        self.catalogue.level(self.current_level)
    }

    fn push_snapshot(&mut self) {
        self.snapshots.push(self.snapshot());
    }
}
