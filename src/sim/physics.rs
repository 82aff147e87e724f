//! Player integration and collision checks

use rand::Rng;
use rand_pcg::Pcg32;

use super::effects::Modifiers;
use super::gates::Gate;
use super::state::{Direction, Player};
use crate::consts::*;

/// Advance the player one frame.
///
/// Gravity, then chaos jitter while `chaos_until` is armed, then the
/// frictionless override, then position. Chaos disarms itself once `now`
/// reaches its expiry.
pub fn integrate(
    player: &mut Player,
    modifiers: &Modifiers,
    chaos_until: &mut Option<f64>,
    now: f64,
    rng: &mut Pcg32,
) {
    if !modifiers.frictionless {
        player.vel += GRAVITY;
    }

    if let Some(until) = *chaos_until {
        if now >= until {
            *chaos_until = None;
            log::debug!("Chaos mode expired");
        } else {
            player.vel += rng.random_range(-CHAOS_JITTER..=CHAOS_JITTER);
        }
    }

    if modifiers.frictionless {
        player.vel = 0.0;
    }

    player.y += player.vel;
    player.direction = Direction::from_velocity(player.vel);
}

/// Whether the player at height `y` hits `gate`
pub fn hits_gate(gate: &Gate, y: f32, modifiers: &Modifiers) -> bool {
    if modifiers.ghost || !gate.overlaps_player() {
        return false;
    }
    y < gate.gap_start || y > gate.gap_end(modifiers.gap_bonus)
}

/// Whether the player at height `y` touches the token on `gate`
pub fn touches_token(gate: &Gate, y: f32, modifiers: &Modifiers) -> bool {
    gate.token.is_some()
        && gate.overlaps_player()
        && (y - gate.token_center(modifiers.gap_bonus)).abs() <= TOKEN_RADIUS
}

/// Above the top edge or below the bottom edge. Sitting exactly on an edge is fine.
pub fn out_of_bounds(y: f32) -> bool {
    y < 0.0 || y > PLAYFIELD_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::{EffectEngine, EffectKind};
    use crate::sim::gates::GapClass;
    use crate::sim::state::TokenKind;
    use rand::SeedableRng;

    fn gate_over_player() -> Gate {
        Gate {
            id: 1,
            x: PLAYER_X - GATE_WIDTH / 2.0,
            gap_start: 200.0,
            gap_class: GapClass::Normal,
            token: None,
            passed: false,
            flashing: false,
        }
    }

    #[test]
    fn test_gravity_accumulates() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Player::default();
        let start = player.y;
        let mut chaos = None;
        for _ in 0..3 {
            integrate(&mut player, &Modifiers::default(), &mut chaos, 0.0, &mut rng);
        }
        assert!((player.vel - 3.0 * GRAVITY).abs() < 1e-6);
        assert!((player.y - (start + 6.0 * GRAVITY)).abs() < 1e-4);
        assert_eq!(player.direction, Direction::Descending);
    }

    #[test]
    fn test_frictionless_forces_zero_velocity_even_in_chaos() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut player = Player {
            vel: 4.0,
            ..Default::default()
        };
        let modifiers = Modifiers {
            frictionless: true,
            ..Default::default()
        };
        let mut chaos = Some(1000.0);
        let y = player.y;
        integrate(&mut player, &modifiers, &mut chaos, 10.0, &mut rng);
        assert_eq!(player.vel, 0.0);
        assert_eq!(player.y, y);
        assert_eq!(player.direction, Direction::Ascending);
    }

    #[test]
    fn test_chaos_jitter_bounded_and_disarms() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut chaos = Some(3000.0);
        for frame in 0..100 {
            let mut player = Player::default();
            integrate(&mut player, &Modifiers::default(), &mut chaos, frame as f64, &mut rng);
            let jitter = player.vel - GRAVITY;
            assert!(jitter.abs() <= CHAOS_JITTER + 1e-6);
        }
        assert!(chaos.is_some());

        let mut player = Player::default();
        integrate(&mut player, &Modifiers::default(), &mut chaos, 3000.0, &mut rng);
        assert!(chaos.is_none());
        assert_eq!(player.vel, GRAVITY);
    }

    #[test]
    fn test_gate_collision_only_while_overlapping() {
        let mut gate = gate_over_player();
        let modifiers = Modifiers::default();
        assert!(hits_gate(&gate, 150.0, &modifiers));
        assert!(hits_gate(&gate, 200.0 + GAP_NORMAL + 1.0, &modifiers));
        assert!(!hits_gate(&gate, 200.0, &modifiers));
        assert!(!hits_gate(&gate, 200.0 + GAP_NORMAL, &modifiers));

        gate.x = PLAYER_X + 1.0;
        assert!(!hits_gate(&gate, 0.0, &modifiers));
    }

    #[test]
    fn test_ghost_suppresses_collision() {
        let gate = gate_over_player();
        let modifiers = Modifiers {
            ghost: true,
            ..Default::default()
        };
        assert!(!hits_gate(&gate, 10.0, &modifiers));
    }

    #[test]
    fn test_wide_window_then_collides_again_after_expiry() {
        let gate = gate_over_player();
        let y = gate.gap_start + gate.base_gap() + 10.0;
        let mut engine = EffectEngine::default();
        assert!(hits_gate(&gate, y, &engine.resolve(0.0)));

        engine.add(EffectKind::Wide, 0.0);
        for t in (0..=10_000).step_by(500) {
            assert!(!hits_gate(&gate, y, &engine.resolve(t as f64)), "collided at {t}ms");
        }
        assert!(hits_gate(&gate, y, &engine.resolve(10_001.0)));
    }

    #[test]
    fn test_token_uses_effective_gap_center() {
        let mut gate = gate_over_player();
        gate.token = Some(TokenKind::Slow);
        let plain = Modifiers::default();
        let wide = Modifiers {
            gap_bonus: WIDE_GAP_BONUS,
            ..Default::default()
        };
        let widened_center = gate.token_center(WIDE_GAP_BONUS);
        assert!(touches_token(&gate, widened_center, &wide));
        assert!(!touches_token(&gate, widened_center + TOKEN_RADIUS + 1.0, &wide));
        assert!(touches_token(&gate, gate.token_center(0.0), &plain));

        gate.token = None;
        assert!(!touches_token(&gate, gate.token_center(0.0), &plain));
    }

    #[test]
    fn test_out_of_bounds_edges() {
        assert!(!out_of_bounds(0.0));
        assert!(!out_of_bounds(PLAYFIELD_HEIGHT));
        assert!(out_of_bounds(PLAYFIELD_HEIGHT + 0.001));
        assert!(out_of_bounds(-0.001));
    }
}
