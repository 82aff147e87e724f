//! Render-ready snapshot of a frame
//!
//! The simulation never draws. Whatever presents the game (canvas script,
//! terminal, test) consumes a [`FrameView`] built from the state.

use glam::Vec2;
use serde::Serialize;

use super::state::{Direction, GamePhase, GameState, TokenKind};
use crate::consts::*;
use crate::settings::Settings;

/// Axis-aligned rectangle in playfield pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenView {
    pub kind: TokenKind,
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateView {
    pub id: u32,
    /// Barrier above the opening
    pub upper: Rect,
    /// Barrier below the opening
    pub lower: Rect,
    pub token: Option<TokenView>,
    pub flashing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailView {
    pub pos: Vec2,
    pub ascending: bool,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub phase: GamePhase,
    pub player: Vec2,
    pub ascending: bool,
    pub gates: Vec<GateView>,
    pub trail: Vec<TrailView>,
    /// Full-screen pickup flash opacity in [0, 1]
    pub flash: f32,
    pub alt_palette: bool,
    pub ghost: bool,
    pub chaos: bool,
    pub score: u32,
    pub level: u32,
}

impl FrameView {
    pub fn build(state: &GameState, settings: &Settings) -> Self {
        let modifiers = state.effects.modifiers();
        let bonus = modifiers.gap_bonus;

        let gates = state
            .gates
            .gates
            .iter()
            .map(|gate| {
                let gap_end = gate.gap_end(bonus);
                GateView {
                    id: gate.id,
                    upper: Rect::new(Vec2::new(gate.x, 0.0), Vec2::new(gate.right(), gate.gap_start)),
                    lower: Rect::new(
                        Vec2::new(gate.x, gap_end.min(PLAYFIELD_HEIGHT)),
                        Vec2::new(gate.right(), PLAYFIELD_HEIGHT),
                    ),
                    token: gate.token.map(|kind| TokenView {
                        kind,
                        center: Vec2::new(gate.x + GATE_WIDTH / 2.0, gate.token_center(bonus)),
                        radius: TOKEN_RADIUS,
                    }),
                    flashing: gate.flashing && settings.effective_flashing(),
                }
            })
            .collect();

        // Trail samples march left one pixel per frame from the player column
        let trail = if settings.trails {
            state
                .trail
                .iter()
                .enumerate()
                .map(|(i, p)| TrailView {
                    pos: Vec2::new(PLAYER_X - i as f32, p.y),
                    ascending: p.direction == Direction::Ascending,
                })
                .collect()
        } else {
            Vec::new()
        };

        let flash = if settings.effective_pickup_flash() {
            state.pickup_flash()
        } else {
            0.0
        };

        Self {
            phase: state.phase,
            player: Vec2::new(PLAYER_X, state.player.y),
            ascending: state.player.direction == Direction::Ascending,
            gates,
            trail,
            flash,
            alt_palette: modifiers.alt_palette || settings.high_contrast,
            ghost: modifiers.ghost,
            chaos: state.chaos_active(),
            score: state.score(),
            level: state.gates.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::{TickInput, tick};

    #[test]
    fn test_gate_rects_frame_the_opening() {
        let mut state = GameState::new_run(8);
        tick(&mut state, &TickInput::default(), 0.0);
        let view = FrameView::build(&state, &Settings::default());

        let gate = &state.gates.gates[0];
        let gv = &view.gates[0];
        assert_eq!(gv.upper.max.y, gate.gap_start);
        assert_eq!(gv.lower.min.y, gate.gap_end(0.0));
        assert!((gv.lower.min.y - gv.upper.max.y - gate.base_gap()).abs() < 1e-3);
        assert_eq!(gv.upper.min.x, gate.x);
        assert_eq!(view.player, Vec2::new(PLAYER_X, state.player.y));
    }

    #[test]
    fn test_trail_matches_capacity_and_can_be_disabled() {
        let state = GameState::new_run(8);
        let view = FrameView::build(&state, &Settings::default());
        assert_eq!(view.trail.len(), TRAIL_CAPACITY);
        assert_eq!(view.trail[0].pos.x, PLAYER_X);
        assert_eq!(view.trail[TRAIL_CAPACITY - 1].pos.x, 1.0);

        let settings = Settings {
            trails: false,
            ..Default::default()
        };
        assert!(FrameView::build(&state, &settings).trail.is_empty());
    }

    #[test]
    fn test_reduced_motion_hides_pickup_flash() {
        let mut state = GameState::new_run(8);
        state.now_ms = 0.0;
        state.flash_until = PICKUP_FLASH_MS;
        assert_eq!(FrameView::build(&state, &Settings::default()).flash, 1.0);

        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(FrameView::build(&state, &settings).flash, 0.0);
    }

    #[test]
    fn test_view_serializes_to_json() {
        let mut state = GameState::new_run(8);
        tick(&mut state, &TickInput::default(), 0.0);
        let json = serde_json::to_string(&FrameView::build(&state, &Settings::default())).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("\"gates\""));
    }
}
