//! Gate stream: spawning, scrolling, pruning and passage scoring
//!
//! Gates enter at the right edge of the playfield and scroll left. The newest
//! gate (largest `x`) decides when the next one spawns; passing a gate scores
//! a point and every `PASSAGES_PER_LEVEL` passages the base speed steps up.

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::state::TokenKind;
use crate::consts::*;

/// Opening size class chosen at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapClass {
    Narrow,
    Normal,
}

impl GapClass {
    pub fn size(&self) -> f32 {
        match self {
            GapClass::Narrow => GAP_NARROW,
            GapClass::Normal => GAP_NORMAL,
        }
    }
}

/// A gate: upper and lower barrier with a vertical opening between them
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Top of the opening
    pub gap_start: f32,
    pub gap_class: GapClass,
    pub token: Option<TokenKind>,
    pub passed: bool,
    pub flashing: bool,
}

impl Gate {
    pub fn base_gap(&self) -> f32 {
        self.gap_class.size()
    }

    /// Opening size after the Wide bonus (never smaller than the base gap)
    pub fn effective_gap(&self, bonus: f32) -> f32 {
        self.base_gap() + bonus.max(0.0)
    }

    /// Bottom of the opening for the given widening bonus
    pub fn gap_end(&self, bonus: f32) -> f32 {
        self.gap_start + self.effective_gap(bonus)
    }

    /// Vertical centre of the attached token
    pub fn token_center(&self, bonus: f32) -> f32 {
        self.gap_start + self.effective_gap(bonus) / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + GATE_WIDTH
    }

    /// True while the gate's horizontal span covers the player column
    pub fn overlaps_player(&self) -> bool {
        self.x <= PLAYER_X && PLAYER_X <= self.right()
    }

    /// Whether any part of the gate is still on the playfield
    pub fn is_visible(&self) -> bool {
        self.right() >= 0.0
    }
}

/// Outcome of a passage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Passage {
    pub score: u32,
    /// Set when this passage crossed a difficulty threshold
    pub level_up: Option<u32>,
}

/// Ordered stream of gates plus passage and difficulty bookkeeping
#[derive(Debug, Clone)]
pub struct GateStream {
    pub gates: Vec<Gate>,
    /// Passage counter (the score)
    pub passed: u32,
    /// Difficulty level, starting at 1
    pub level: u32,
    pub base_speed: f32,
    /// Largest `x` among live gates
    newest_x: Option<f32>,
    /// Last non-none token kind handed out
    last_token: Option<TokenKind>,
    next_id: u32,
}

impl Default for GateStream {
    fn default() -> Self {
        Self::new()
    }
}

impl GateStream {
    pub fn new() -> Self {
        Self {
            gates: Vec::new(),
            passed: 0,
            level: 1,
            base_speed: INITIAL_SPEED,
            newest_x: None,
            last_token: None,
            next_id: 1,
        }
    }

    pub fn newest_x(&self) -> Option<f32> {
        self.newest_x
    }

    pub fn last_token(&self) -> Option<TokenKind> {
        self.last_token
    }

    /// True when the newest gate has travelled far enough from the right edge
    pub fn needs_spawn(&self) -> bool {
        match self.newest_x {
            None => true,
            Some(x) => PLAYFIELD_WIDTH - x >= SPAWN_SPACING,
        }
    }

    /// Spawn one gate at the right edge of the playfield
    pub fn spawn(&mut self, rng: &mut Pcg32) -> &Gate {
        let gap_class = if rng.random_bool(NARROW_GAP_CHANCE) {
            GapClass::Narrow
        } else {
            GapClass::Normal
        };
        let gap_start = roll_gap_start(rng, gap_class.size());
        let token = self.roll_token(rng);

        let id = self.next_id;
        self.next_id += 1;
        self.gates.push(Gate {
            id,
            x: PLAYFIELD_WIDTH,
            gap_start,
            gap_class,
            token,
            passed: false,
            flashing: false,
        });
        self.newest_x = Some(PLAYFIELD_WIDTH);

        log::trace!("Spawned gate {} ({:?}, token {:?})", id, gap_class, token);
        &self.gates[self.gates.len() - 1]
    }

    /// 25% chance of a token, never repeating the previous non-none kind
    fn roll_token(&mut self, rng: &mut Pcg32) -> Option<TokenKind> {
        if !rng.random_bool(TOKEN_CHANCE) {
            return None;
        }
        let pool: Vec<TokenKind> = TokenKind::ALL
            .iter()
            .copied()
            .filter(|k| Some(*k) != self.last_token)
            .collect();
        let kind = pool.choose(rng).copied()?;
        self.last_token = Some(kind);
        Some(kind)
    }

    /// Scroll every gate left by `speed` and refresh the newest gate
    pub fn advance(&mut self, speed: f32) {
        for gate in &mut self.gates {
            gate.x -= speed;
        }
        self.newest_x = self.gates.iter().map(|g| g.x).reduce(f32::max);
    }

    /// Remove gates that scrolled fully past the left edge. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.gates.len();
        self.gates.retain(Gate::is_visible);
        let removed = before - self.gates.len();
        if self.gates.is_empty() {
            self.newest_x = None;
        }
        removed
    }

    /// Score the gate at `index` if its right edge just crossed the player column
    ///
    /// Each gate scores at most once.
    pub fn mark_passed(&mut self, index: usize) -> Option<Passage> {
        let gate = self.gates.get_mut(index)?;
        if gate.passed || gate.right() >= PLAYER_X {
            return None;
        }
        gate.passed = true;
        Some(self.record_passage())
    }

    /// Bump the passage counter and apply the difficulty rule
    pub fn record_passage(&mut self) -> Passage {
        self.passed += 1;
        let mut level_up = None;
        if self.passed.is_multiple_of(PASSAGES_PER_LEVEL) {
            self.level += 1;
            self.base_speed = speed_for_level(self.level);
            level_up = Some(self.level);
            log::debug!("Level {} reached, base speed {:.2}", self.level, self.base_speed);
        }
        Passage {
            score: self.passed,
            level_up,
        }
    }
}

/// Base scroll speed for a difficulty level (level 1 = initial speed)
pub fn speed_for_level(level: u32) -> f32 {
    INITIAL_SPEED * (1.0 + level.saturating_sub(1) as f32 * LEVEL_SPEED_STEP)
}

/// Uniform opening start plus variance, clamped back into bounds
fn roll_gap_start(rng: &mut Pcg32, gap: f32) -> f32 {
    let min = GATE_MARGIN;
    let max = PLAYFIELD_HEIGHT - GATE_MARGIN - gap;
    if max <= min {
        return min.max(0.0);
    }
    let base = rng.random_range(min..=max);
    let variance = rng.random_range(-GAP_VARIANCE..=GAP_VARIANCE);
    (base + variance).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn gate_at(x: f32) -> Gate {
        Gate {
            id: 1,
            x,
            gap_start: 200.0,
            gap_class: GapClass::Normal,
            token: None,
            passed: false,
            flashing: false,
        }
    }

    #[test]
    fn test_spawn_at_right_edge_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut stream = GateStream::new();
        for _ in 0..500 {
            let gate = stream.spawn(&mut rng).clone();
            assert_eq!(gate.x, PLAYFIELD_WIDTH);
            assert!(gate.gap_start >= GATE_MARGIN);
            assert!(gate.gap_start + gate.base_gap() <= PLAYFIELD_HEIGHT - GATE_MARGIN);
        }
        assert_eq!(stream.newest_x(), Some(PLAYFIELD_WIDTH));
    }

    #[test]
    fn test_gap_class_and_token_rates() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut stream = GateStream::new();
        let n = 10_000;
        let mut narrow = 0;
        let mut tokens = 0;
        for _ in 0..n {
            let gate = stream.spawn(&mut rng);
            if gate.gap_class == GapClass::Narrow {
                narrow += 1;
            }
            if gate.token.is_some() {
                tokens += 1;
            }
        }
        let narrow_rate = narrow as f64 / n as f64;
        let token_rate = tokens as f64 / n as f64;
        assert!((narrow_rate - 0.3).abs() < 0.03, "narrow rate {narrow_rate}");
        assert!((token_rate - 0.25).abs() < 0.03, "token rate {token_rate}");
    }

    #[test]
    fn test_spawn_spacing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut stream = GateStream::new();
        assert!(stream.needs_spawn());
        stream.spawn(&mut rng);
        assert!(!stream.needs_spawn());

        stream.advance(SPAWN_SPACING - 1.0);
        assert!(!stream.needs_spawn());
        stream.advance(1.0);
        assert!(stream.needs_spawn());
    }

    #[test]
    fn test_advance_tracks_newest_gate() {
        let mut stream = GateStream::new();
        stream.gates.push(gate_at(100.0));
        stream.gates.push(gate_at(300.0));
        stream.advance(10.0);
        assert_eq!(stream.newest_x(), Some(290.0));
        assert_eq!(stream.gates[0].x, 90.0);
    }

    #[test]
    fn test_prune_removes_offscreen_gates() {
        let mut stream = GateStream::new();
        stream.gates.push(gate_at(-GATE_WIDTH - 0.5));
        stream.gates.push(gate_at(-GATE_WIDTH));
        stream.gates.push(gate_at(50.0));
        assert_eq!(stream.prune(), 1);
        assert_eq!(stream.gates.len(), 2);
        assert!(stream.gates.iter().all(Gate::is_visible));
    }

    #[test]
    fn test_mark_passed_counts_once() {
        let mut stream = GateStream::new();
        stream.gates.push(gate_at(PLAYER_X - GATE_WIDTH));
        // Right edge exactly on the player column: not yet passed
        assert!(stream.mark_passed(0).is_none());

        stream.advance(0.5);
        let passage = stream.mark_passed(0).expect("gate should pass");
        assert_eq!(passage.score, 1);
        assert!(stream.mark_passed(0).is_none());
        assert_eq!(stream.passed, 1);
    }

    #[test]
    fn test_difficulty_steps_every_fifteen_passages() {
        let mut stream = GateStream::new();
        for _ in 0..14 {
            assert!(stream.record_passage().level_up.is_none());
        }
        assert_eq!(stream.base_speed, INITIAL_SPEED);

        let passage = stream.record_passage();
        assert_eq!(passage.level_up, Some(2));
        assert!((stream.base_speed - INITIAL_SPEED * 1.1).abs() < 1e-5);

        for _ in 0..15 {
            stream.record_passage();
        }
        assert_eq!(stream.level, 3);
        assert!((stream.base_speed - INITIAL_SPEED * 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_effective_gap_ignores_negative_bonus() {
        let gate = gate_at(0.0);
        assert_eq!(gate.effective_gap(-50.0), gate.base_gap());
        assert_eq!(gate.effective_gap(WIDE_GAP_BONUS), GAP_NORMAL + WIDE_GAP_BONUS);
        assert_eq!(gate.token_center(0.0), 200.0 + GAP_NORMAL / 2.0);
    }

    proptest! {
        #[test]
        fn prop_token_never_repeats_previous_kind(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut stream = GateStream::new();
            let mut previous: Option<TokenKind> = None;
            for _ in 0..400 {
                if let Some(kind) = stream.spawn(&mut rng).token {
                    prop_assert_ne!(Some(kind), previous);
                    previous = Some(kind);
                }
            }
        }

        #[test]
        fn prop_effective_gap_never_shrinks(bonus in -200.0f32..200.0, narrow in any::<bool>()) {
            let mut gate = gate_at(0.0);
            gate.gap_class = if narrow { GapClass::Narrow } else { GapClass::Normal };
            prop_assert!(gate.effective_gap(bonus) >= gate.base_gap());
        }
    }
}
