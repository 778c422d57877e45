//! Neo Pong - a vertical paddle-and-ball arena against a reactive AI
//!
//! Core modules:
//! - `sim`: Simulation core (physics, collisions, match lifecycle)
//! - `clock`: Frame-driven fixed-step scheduling and the 1 Hz countdown
//! - `tuning`: Ball speed/size and paddle length presets
//! - `settings`: User preferences with a synchronous cache
//! - `highscores`: Leaderboard persistence
//! - `persistence`: Key/value storage backends and the background writer
//! - `platform`: Target-specific clock and logging glue
//! - `feedback`: Haptic and sound cues derived from simulation events

pub mod clock;
pub mod feedback;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use clock::SimulationClock;
pub use highscores::{ScoreEntry, ScoreStore};
pub use settings::{GameSettings, SettingsStore};
pub use sim::{ArenaState, GameResult, Mode, Phase};
pub use tuning::TuningProfile;

/// Game configuration constants
pub mod consts {
    /// Reference tick the per-tick velocities are expressed against (60 Hz)
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Fixed simulation timestep driven by the clock
    pub const SIM_DT: f32 = REFERENCE_DT;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena defaults (portrait phone proportions)
    pub const ARENA_WIDTH: f32 = 400.0;
    pub const ARENA_HEIGHT: f32 = 680.0;
    /// AI paddle lane sits near the top edge
    pub const AI_PADDLE_Y: f32 = 100.0;
    /// Player lane offset from the bottom edge
    pub const PLAYER_PADDLE_INSET: f32 = 60.0;
    /// Height of the strip in which a paddle can be hit
    pub const LANE_HEIGHT: f32 = 18.0;

    /// Hard cap on |velocity.y| (units per reference tick)
    pub const MAX_BALL_SPEED: f32 = 12.0;
    /// Vertical speed-up applied on every paddle hit
    pub const PADDLE_BOUNCE_FACTOR: f32 = 1.05;
    /// Horizontal speed at the very edge of a paddle
    pub const PADDLE_DEFLECTION: f32 = 6.0;

    /// AI paddle speed (units per reference tick)
    pub const AI_SPEED_FIRST_TO: f32 = 4.0;
    pub const AI_SPEED_TIME_ATTACK: f32 = 5.2;
    /// AI ignores offsets smaller than this
    pub const AI_DEAD_ZONE: f32 = 5.0;

    /// Delay between a score and the next serve (seconds)
    pub const SERVE_DELAY: f32 = 1.0;
    /// Ball opacity while waiting for the serve
    pub const RESETTING_OPACITY: f32 = 0.5;

    /// Match rules
    pub const WIN_SCORE: u32 = 5;
    pub const TIME_ATTACK_SECONDS: u32 = 60;
}
