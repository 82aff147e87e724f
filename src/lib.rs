//! Gate Glider - A one-button gate-dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gates, effects, physics, frame step)
//! - `game`: Session lifecycle, input slot and run-end bookkeeping
//! - `highscores`: Best score and best token tallies
//! - `persistence`: Key/value storage backends
//! - `platform`: Cancellable frame scheduling
//! - `settings`: Player presentation preferences

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
///
/// Distances are in playfield pixels, velocities in pixels per frame and
/// durations in milliseconds.
pub mod consts {
    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 640.0;

    /// Fixed horizontal position of the player marker (also the trail length)
    pub const PLAYER_X: f32 = 120.0;
    pub const TRAIL_CAPACITY: usize = PLAYER_X as usize;

    /// Downward acceleration added every frame
    pub const GRAVITY: f32 = 0.35;
    /// Velocity set by an impulse (negative is up)
    pub const BOUNCE_VELOCITY: f32 = -6.5;
    /// Chaos mode velocity jitter, applied in [-J, J] each frame
    pub const CHAOS_JITTER: f32 = 1.2;
    pub const CHAOS_DURATION_MS: f64 = 3000.0;

    /// Gate geometry
    pub const GATE_WIDTH: f32 = 64.0;
    /// Newest gate must travel this many widths before the next spawns
    pub const SPAWN_SPACING_WIDTHS: f32 = 3.5;
    pub const SPAWN_SPACING: f32 = GATE_WIDTH * SPAWN_SPACING_WIDTHS;
    pub const GAP_NORMAL: f32 = 170.0;
    pub const GAP_NARROW: f32 = 125.0;
    pub const NARROW_GAP_CHANCE: f64 = 0.3;
    /// Keep openings this far from the top/bottom edges
    pub const GATE_MARGIN: f32 = 60.0;
    pub const GAP_VARIANCE: f32 = 40.0;
    /// Extra opening granted by the Wide token
    pub const WIDE_GAP_BONUS: f32 = 70.0;

    /// Tokens
    pub const TOKEN_CHANCE: f64 = 0.25;
    pub const TOKEN_RADIUS: f32 = 22.0;
    pub const PICKUP_FLASH_MS: f64 = 150.0;

    /// Scroll speed and difficulty
    pub const INITIAL_SPEED: f32 = 2.5;
    pub const PASSAGES_PER_LEVEL: u32 = 15;
    pub const LEVEL_SPEED_STEP: f32 = 0.1;
    pub const SLOW_FACTOR: f32 = 0.5;
    pub const BOOST_FACTOR: f32 = 1.5;
}
