//! Per-frame simulation step
//!
//! Core game loop that advances the simulation by one display frame.

use super::gates::Gate;
use super::physics::{hits_gate, integrate, out_of_bounds, touches_token};
use super::state::{EndCause, GameEvent, GamePhase, GameState, TrailPoint};
use crate::consts::*;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Impulse requested since the last frame (single slot, never queued)
    pub impulse: bool,
    /// Idle/demo mode - autopilot decides the impulse
    pub idle_mode: bool,
}

/// Advance the game state by one frame at timestamp `now` (ms)
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    state.now_ms = now;
    state.started_at.get_or_insert(now);
    state.frames += 1;

    let impulse = input.impulse || (input.idle_mode && autopilot_wants_impulse(state));
    if impulse {
        state.player.vel = BOUNCE_VELOCITY;
    }

    let mut modifiers = state.effects.resolve(now);

    integrate(
        &mut state.player,
        &modifiers,
        &mut state.chaos_until,
        now,
        &mut state.rng,
    );
    state.trail.shift(TrailPoint {
        y: state.player.y,
        direction: state.player.direction,
    });

    if state.gates.needs_spawn() {
        state.gates.spawn(&mut state.rng);
    }
    state.speed = state.gates.base_speed * modifiers.speed_multiplier;
    state.gates.advance(state.speed);

    let y = state.player.y;
    let mut crashed = false;
    for index in 0..state.gates.gates.len() {
        state.gates.gates[index].flashing = modifiers.flashing;

        let gate = &mut state.gates.gates[index];
        if touches_token(gate, y, &modifiers)
            && let Some(kind) = gate.token.take()
        {
            match kind.effect() {
                Some(effect) => state.effects.add(effect, now),
                None => state.chaos_until = Some(now + CHAOS_DURATION_MS),
            }
            state.flash_until = now + PICKUP_FLASH_MS;
            let count = state.tokens.increment(kind);
            log::debug!("Collected {} token ({} this run)", kind.as_str(), count);
            events.push(GameEvent::TokenCollected { kind, count });

            modifiers = state.effects.resolve(now);
            state.gates.gates[index].flashing = modifiers.flashing;
        }

        if let Some(passage) = state.gates.mark_passed(index) {
            events.push(GameEvent::ScoreChanged {
                score: passage.score,
            });
            if let Some(level) = passage.level_up {
                events.push(GameEvent::SpeedUp {
                    level,
                    speed: state.gates.base_speed,
                });
            }
        }

        if hits_gate(&state.gates.gates[index], y, &modifiers) {
            crashed = true;
        }
    }

    state.gates.prune();

    let cause = if crashed {
        Some(EndCause::Collision)
    } else if out_of_bounds(y) {
        Some(EndCause::OutOfBounds)
    } else {
        None
    };

    if let Some(cause) = cause {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Run over ({:?}) with score {} after {:.1}s",
            cause,
            state.score(),
            state.elapsed_ms() / 1000.0
        );
        events.push(GameEvent::RunEnded {
            score: state.score(),
            cause,
        });
    }

    events
}

/// Pure variant of [`tick`]: returns the next state and leaves `state` untouched
pub fn step(state: &GameState, input: &TickInput, now: f64) -> (GameState, Vec<GameEvent>) {
    let mut next = state.clone();
    let events = tick(&mut next, input, now);
    (next, events)
}

/// The first gate whose right edge hasn't reached the player column yet
fn next_gate(state: &GameState) -> Option<&Gate> {
    state
        .gates
        .gates
        .iter()
        .filter(|g| g.right() >= PLAYER_X)
        .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
}

/// Autopilot: bounce when falling below the middle of the upcoming opening
fn autopilot_wants_impulse(state: &GameState) -> bool {
    let bonus = state.effects.modifiers().gap_bonus;
    let target = next_gate(state)
        .map(|g| g.gap_start + g.effective_gap(bonus) * 0.6)
        .unwrap_or(PLAYFIELD_HEIGHT / 2.0);
    state.player.vel >= 0.0 && state.player.y > target
}
