//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per display frame, driven by the frame timestamp
//! - Seeded RNG only
//! - Stable iteration order (gates in spawn order)
//! - No rendering or platform dependencies

pub mod effects;
pub mod gates;
pub mod physics;
pub mod state;
pub mod tick;
pub mod view;

pub use effects::{ActiveEffect, EFFECT_PRIORITY, EffectEngine, EffectKind, Modifiers};
pub use gates::{GapClass, Gate, GateStream, Passage, speed_for_level};
pub use physics::{hits_gate, integrate, out_of_bounds, touches_token};
pub use state::{
    Direction, EndCause, GameEvent, GamePhase, GameState, Player, TokenCounts, TokenKind, Trail,
    TrailPoint,
};
pub use tick::{TickInput, step, tick};
pub use view::{FrameView, GateView, Rect, TokenView, TrailView};
