//! Timed power-up effects and their per-frame resolution
//!
//! Derived modifiers are rebuilt from scratch every frame from the list of
//! live effects, never accumulated.

use serde::{Deserialize, Serialize};

use super::state::TokenKind;
use crate::consts::*;

/// Modifier kinds that live in the active effect list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Wide,
    Slow,
    Boost,
    Flash,
    Palette,
    Ghost,
    Frictionless,
}

impl EffectKind {
    /// How long a freshly collected effect lasts
    pub fn duration_ms(&self) -> f64 {
        match self {
            EffectKind::Wide => 10_000.0,
            EffectKind::Slow => 5_000.0,
            EffectKind::Boost => 5_000.0,
            EffectKind::Flash => 5_000.0,
            EffectKind::Palette => 10_000.0,
            EffectKind::Ghost => 5_000.0,
            EffectKind::Frictionless => 5_000.0,
        }
    }
}

impl TokenKind {
    /// Effect granted by this token. Chaos arms chaos mode instead.
    pub fn effect(&self) -> Option<EffectKind> {
        match self {
            TokenKind::Wide => Some(EffectKind::Wide),
            TokenKind::Slow => Some(EffectKind::Slow),
            TokenKind::Boost => Some(EffectKind::Boost),
            TokenKind::Flash => Some(EffectKind::Flash),
            TokenKind::Palette => Some(EffectKind::Palette),
            TokenKind::Ghost => Some(EffectKind::Ghost),
            TokenKind::Frictionless => Some(EffectKind::Frictionless),
            TokenKind::Chaos => None,
        }
    }
}

/// Order in which live effects are applied each frame.
///
/// Speed rules overwrite each other, so the later entry wins when both are
/// live: Boost beats Slow.
pub const EFFECT_PRIORITY: [EffectKind; 7] = [
    EffectKind::Wide,
    EffectKind::Flash,
    EffectKind::Palette,
    EffectKind::Ghost,
    EffectKind::Frictionless,
    EffectKind::Slow,
    EffectKind::Boost,
];

/// A collected effect with its expiry timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub expires_at: f64,
}

/// Combined influence of all live effects for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub speed_multiplier: f32,
    /// Added to every gate's base opening
    pub gap_bonus: f32,
    pub flashing: bool,
    pub alt_palette: bool,
    pub ghost: bool,
    pub frictionless: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            gap_bonus: 0.0,
            flashing: false,
            alt_palette: false,
            ghost: false,
            frictionless: false,
        }
    }
}

impl Modifiers {
    fn apply(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::Wide => self.gap_bonus = WIDE_GAP_BONUS,
            EffectKind::Slow => self.speed_multiplier = SLOW_FACTOR,
            EffectKind::Boost => self.speed_multiplier = BOOST_FACTOR,
            EffectKind::Flash => self.flashing = true,
            EffectKind::Palette => self.alt_palette = true,
            EffectKind::Ghost => self.ghost = true,
            EffectKind::Frictionless => self.frictionless = true,
        }
    }
}

/// Live effects plus the modifiers derived from them on the last resolve
#[derive(Debug, Clone, Default)]
pub struct EffectEngine {
    effects: Vec<ActiveEffect>,
    modifiers: Modifiers,
}

impl EffectEngine {
    /// Append a new effect; earlier instances of the same kind keep their own expiry
    pub fn add(&mut self, kind: EffectKind, now: f64) {
        self.effects.push(ActiveEffect {
            kind,
            expires_at: now + kind.duration_ms(),
        });
    }

    /// Drop expired effects and rebuild the modifiers from baseline
    pub fn resolve(&mut self, now: f64) -> Modifiers {
        self.effects.retain(|e| now <= e.expires_at);

        let mut modifiers = Modifiers::default();
        for kind in EFFECT_PRIORITY {
            if self.is_active(kind) {
                modifiers.apply(kind);
            }
        }
        self.modifiers = modifiers;
        modifiers
    }

    /// Modifiers from the most recent `resolve`
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Latest expiry among live effects of `kind`
    pub fn expires_at(&self, kind: EffectKind) -> Option<f64> {
        self.effects
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.expires_at)
            .reduce(f64::max)
    }

    pub fn active(&self) -> &[ActiveEffect] {
        &self.effects
    }
}
