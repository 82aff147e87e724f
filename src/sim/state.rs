//! Game state and core simulation types
//!
//! Everything a frame step reads or writes lives in [`GameState`].

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::EffectEngine;
use super::gates::GateStream;
use crate::consts::*;

/// Current phase of the game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first start command
    Start,
    /// Active gameplay
    Playing,
    /// Run ended, waiting for restart
    GameOver,
}

/// Bonus token kinds carried by gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Wide,
    Slow,
    Boost,
    Flash,
    Palette,
    Ghost,
    Frictionless,
    Chaos,
}

impl TokenKind {
    pub const ALL: [TokenKind; 8] = [
        TokenKind::Wide,
        TokenKind::Slow,
        TokenKind::Boost,
        TokenKind::Flash,
        TokenKind::Palette,
        TokenKind::Ghost,
        TokenKind::Frictionless,
        TokenKind::Chaos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Wide => "wide",
            TokenKind::Slow => "slow",
            TokenKind::Boost => "boost",
            TokenKind::Flash => "flash",
            TokenKind::Palette => "palette",
            TokenKind::Ghost => "ghost",
            TokenKind::Frictionless => "frictionless",
            TokenKind::Chaos => "chaos",
        }
    }
}

/// Per-kind token tally, used both for the current run and best-ever record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenCounts {
    pub wide: u32,
    pub slow: u32,
    pub boost: u32,
    pub flash: u32,
    pub palette: u32,
    pub ghost: u32,
    pub frictionless: u32,
    pub chaos: u32,
}

impl TokenCounts {
    pub fn get(&self, kind: TokenKind) -> u32 {
        match kind {
            TokenKind::Wide => self.wide,
            TokenKind::Slow => self.slow,
            TokenKind::Boost => self.boost,
            TokenKind::Flash => self.flash,
            TokenKind::Palette => self.palette,
            TokenKind::Ghost => self.ghost,
            TokenKind::Frictionless => self.frictionless,
            TokenKind::Chaos => self.chaos,
        }
    }

    fn slot(&mut self, kind: TokenKind) -> &mut u32 {
        match kind {
            TokenKind::Wide => &mut self.wide,
            TokenKind::Slow => &mut self.slow,
            TokenKind::Boost => &mut self.boost,
            TokenKind::Flash => &mut self.flash,
            TokenKind::Palette => &mut self.palette,
            TokenKind::Ghost => &mut self.ghost,
            TokenKind::Frictionless => &mut self.frictionless,
            TokenKind::Chaos => &mut self.chaos,
        }
    }

    /// Increment the tally for `kind`, returning the new count
    pub fn increment(&mut self, kind: TokenKind) -> u32 {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Raise every kind to at least `other`'s count. Returns true if anything changed.
    pub fn merge_max(&mut self, other: &TokenCounts) -> bool {
        let mut changed = false;
        for kind in TokenKind::ALL {
            let theirs = other.get(kind);
            let slot = self.slot(kind);
            if theirs > *slot {
                *slot = theirs;
                changed = true;
            }
        }
        changed
    }

    pub fn total(&self) -> u32 {
        TokenKind::ALL.iter().map(|k| self.get(*k)).sum()
    }
}

/// Vertical direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn from_velocity(vel: f32) -> Self {
        if vel <= 0.0 {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }
}

/// The player marker. Horizontal position is fixed at `PLAYER_X`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub y: f32,
    pub vel: f32,
    pub direction: Direction,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            y: PLAYFIELD_HEIGHT / 2.0,
            vel: 0.0,
            direction: Direction::Ascending,
        }
    }
}

/// Trail sample for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub y: f32,
    pub direction: Direction,
}

/// Fixed-capacity FIFO of recent player samples (newest first)
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    /// Create a trail filled with `fill` so its length always equals the capacity
    pub fn new(capacity: usize, fill: TrailPoint) -> Self {
        let mut points = VecDeque::with_capacity(capacity);
        points.resize(capacity, fill);
        Self { points, capacity }
    }

    /// Shift one slot: push the newest sample, drop the oldest
    pub fn shift(&mut self, point: TrailPoint) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_front(point);
        self.points.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Hit the barrier of a gate
    Collision,
    /// Left the playfield through the top or bottom
    OutOfBounds,
}

/// Events emitted by a frame step for the surrounding UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged { score: u32 },
    SpeedUp { level: u32, speed: f32 },
    TokenCollected { kind: TokenKind, count: u32 },
    RunEnded { score: u32, cause: EndCause },
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    pub gates: GateStream,
    pub effects: EffectEngine,
    /// Chaos mode expiry, `None` when disarmed
    pub chaos_until: Option<f64>,
    /// Pickup flash expiry (fades linearly over `PICKUP_FLASH_MS`)
    pub flash_until: f64,
    /// Tokens collected this run
    pub tokens: TokenCounts,
    pub trail: Trail,
    /// Effective scroll speed used by the last frame
    pub speed: f32,
    /// Timestamp of the last frame step (ms)
    pub now_ms: f64,
    /// Timestamp of the first frame of this run
    pub started_at: Option<f64>,
    pub frames: u64,
}

impl GameState {
    /// Create a new game state on the title screen
    pub fn new(seed: u64) -> Self {
        let player = Player::default();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            player,
            gates: GateStream::new(),
            effects: EffectEngine::default(),
            chaos_until: None,
            flash_until: f64::NEG_INFINITY,
            tokens: TokenCounts::default(),
            trail: Trail::new(
                TRAIL_CAPACITY,
                TrailPoint {
                    y: player.y,
                    direction: player.direction,
                },
            ),
            speed: INITIAL_SPEED,
            now_ms: 0.0,
            started_at: None,
            frames: 0,
        }
    }

    /// Fresh run state, already in `Playing`
    pub fn new_run(seed: u64) -> Self {
        let mut state = Self::new(seed);
        state.phase = GamePhase::Playing;
        state
    }

    /// Current score (number of passages)
    pub fn score(&self) -> u32 {
        self.gates.passed
    }

    pub fn chaos_active(&self) -> bool {
        self.chaos_until.is_some()
    }

    /// Pickup flash intensity in [0, 1]
    pub fn pickup_flash(&self) -> f32 {
        let remaining = self.flash_until - self.now_ms;
        (remaining / PICKUP_FLASH_MS).clamp(0.0, 1.0) as f32
    }

    /// Milliseconds elapsed since the first frame of the run
    pub fn elapsed_ms(&self) -> f64 {
        self.started_at.map(|t| self.now_ms - t).unwrap_or(0.0)
    }
}
