//! Game state and core simulation types
//!
//! Coordinates are arena units with the origin at the top-left corner and
//! `y` growing downward. The AI defends the top edge, the player the bottom.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::evaluator::GameResult;
use crate::consts::*;
use crate::feedback::SoundEffect;
use crate::tuning::{TuningError, TuningProfile};

/// Which paddle (and which goal line) something belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bottom paddle, driven by pointer input
    Player,
    /// Top paddle, driven by the AI controller
    Ai,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    /// Sign of `velocity.y` for a ball travelling toward this side
    pub fn direction(&self) -> f32 {
        match self {
            Side::Player => 1.0,
            Side::Ai => -1.0,
        }
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first serve; nothing moves
    Ready,
    /// Active rally
    Running,
    /// Frozen: no physics, no AI, no countdown
    Paused,
    /// Ball parked at center waiting for the serve delay to elapse
    Resetting,
    /// Terminal; the result has been emitted
    Over,
}

impl Phase {
    /// Phases in which the match clock is considered live
    pub fn is_live(&self) -> bool {
        matches!(self, Phase::Running | Phase::Resetting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Ready => "READY",
            Phase::Running => "RUNNING",
            Phase::Paused => "PAUSED",
            Phase::Resetting => "RESETTING",
            Phase::Over => "OVER",
        };
        f.write_str(label)
    }
}

/// Win condition for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// First side to reach `target` points wins
    FirstTo { target: u32 },
    /// Match ends when the countdown reaches zero
    TimeAttack { duration_secs: u32 },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::first_to_five()
    }
}

impl Mode {
    pub fn first_to_five() -> Self {
        Mode::FirstTo { target: WIN_SCORE }
    }

    pub fn time_attack() -> Self {
        Mode::TimeAttack {
            duration_secs: TIME_ATTACK_SECONDS,
        }
    }

    /// Stable label used in persisted records
    pub fn label(&self) -> &'static str {
        match self {
            Mode::FirstTo { .. } => "FIRST_TO_5",
            Mode::TimeAttack { .. } => "TIME_ATTACK",
        }
    }

    /// AI paddle speed; the timed mode plays faster
    pub fn ai_speed(&self) -> f32 {
        match self {
            Mode::FirstTo { .. } => AI_SPEED_FIRST_TO,
            Mode::TimeAttack { .. } => AI_SPEED_TIME_ATTACK,
        }
    }

    /// Countdown start value, `None` for untimed modes
    pub fn initial_time_left(&self) -> Option<u32> {
        match self {
            Mode::FirstTo { .. } => None,
            Mode::TimeAttack { duration_secs } => Some(*duration_secs),
        }
    }
}

impl FromStr for Mode {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "first-to-5" | "first-to-five" => Ok(Mode::first_to_five()),
            "time-attack" => Ok(Mode::time_attack()),
            _ => Err(TuningError::UnknownOption {
                dimension: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Arena geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Top of the AI lane
    pub ai_paddle_y: f32,
    /// Top of the player lane
    pub player_paddle_y: f32,
    /// Lane (and paddle) thickness
    pub lane_height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(ARENA_WIDTH, ARENA_HEIGHT)
    }
}

impl ArenaConfig {
    /// Standard lane layout for an arena of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ai_paddle_y: AI_PADDLE_Y,
            player_paddle_y: height - PLAYER_PADDLE_INSET,
            lane_height: LANE_HEIGHT,
        }
    }

    pub fn paddle_y(&self, side: Side) -> f32 {
        match side {
            Side::Player => self.player_paddle_y,
            Side::Ai => self.ai_paddle_y,
        }
    }

    /// Top-left ball position that centers a ball of `diameter`
    pub fn ball_spawn(&self, diameter: f32) -> Vec2 {
        Vec2::new(
            self.width / 2.0 - diameter / 2.0,
            self.height / 2.0 - diameter / 2.0,
        )
    }
}

/// The ball. `pos` is the top-left corner of its bounding square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Units per reference tick
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// A paddle. `x` is the left edge, `y` the top of its lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub width: f32,
    pub y: f32,
    pub owner: Side,
}

impl Paddle {
    /// Paddle centered horizontally in its lane
    pub fn centered(owner: Side, width: f32, config: &ArenaConfig) -> Self {
        Self {
            x: (config.width - width) / 2.0,
            width,
            y: config.paddle_y(owner),
            owner,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Whether a horizontal coordinate lies on the paddle (edges inclusive)
    pub fn spans(&self, x: f32) -> bool {
        x >= self.x && x <= self.x + self.width
    }

    /// Move the left edge, clamped so the paddle stays inside the arena
    pub fn set_x(&mut self, x: f32, arena_width: f32) {
        let max_x = (arena_width - self.width).max(0.0);
        self.x = x.clamp(0.0, max_x);
    }

    /// Center the paddle under a pointer position
    pub fn follow_pointer(&mut self, pointer_x: f32, arena_width: f32) {
        self.set_x(pointer_x - self.width / 2.0, arena_width);
    }
}

/// Score, clock and lifecycle of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub player_score: u32,
    pub ai_score: u32,
    /// Remaining seconds; `None` outside time attack
    pub time_left_secs: Option<u32>,
    pub phase: Phase,
    pub mode: Mode,
}

impl MatchState {
    pub fn new(mode: Mode) -> Self {
        Self {
            player_score: 0,
            ai_score: 0,
            time_left_secs: mode.initial_time_left(),
            phase: Phase::Ready,
            mode,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_score,
            Side::Ai => self.ai_score,
        }
    }
}

/// Something that happened during a step, for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WallBounce,
    PaddleHit(Side),
    Scored(Side),
    /// Ball received its serve velocity, travelling toward `toward`
    Served { toward: Side },
    /// Vibration cue (only emitted when vibration is enabled)
    Haptic,
    /// Sound cue (only emitted when sound is enabled)
    Sound(SoundEffect),
    TuningApplied(TuningProfile),
    PhaseChanged { from: Phase, to: Phase },
    MatchOver(GameResult),
}

/// Immutable per-frame view handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub ball_pos: Vec2,
    pub ball_diameter: f32,
    /// 1.0 in play, dimmed while waiting for a serve
    pub ball_opacity: f32,
    /// Side that last touched the ball or is about to receive it
    pub ball_tint: Option<Side>,
    pub player_x: f32,
    pub player_y: f32,
    pub ai_x: f32,
    pub ai_y: f32,
    pub paddle_width: f32,
    pub player_score: u32,
    pub ai_score: u32,
    pub time_left_secs: Option<u32>,
    pub phase: Phase,
    pub tuning_open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paddle_clamps_to_arena() {
        let config = ArenaConfig::default();
        let mut paddle = Paddle::centered(Side::Player, 140.0, &config);

        paddle.follow_pointer(-50.0, config.width);
        assert_eq!(paddle.x, 0.0);

        paddle.follow_pointer(config.width + 50.0, config.width);
        assert_eq!(paddle.x, config.width - 140.0);

        paddle.follow_pointer(200.0, config.width);
        assert_eq!(paddle.center_x(), 200.0);
    }

    #[test]
    fn test_ball_spawn_is_centered() {
        let config = ArenaConfig::default();
        let ball = Ball::new(config.ball_spawn(16.0), 8.0);
        assert_eq!(ball.center(), Vec2::new(config.width / 2.0, config.height / 2.0));
    }

    #[test]
    fn test_match_state_timer_only_in_time_attack() {
        assert_eq!(MatchState::new(Mode::first_to_five()).time_left_secs, None);
        assert_eq!(
            MatchState::new(Mode::time_attack()).time_left_secs,
            Some(TIME_ATTACK_SECONDS)
        );
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("time-attack".parse::<Mode>().unwrap(), Mode::time_attack());
        assert_eq!("FIRST_TO_5".parse::<Mode>().unwrap(), Mode::first_to_five());
        assert!("sudden-death".parse::<Mode>().is_err());
    }

    #[test]
    fn test_side_direction() {
        assert!(Side::Player.direction() > 0.0);
        assert!(Side::Ai.direction() < 0.0);
        assert_eq!(Side::Player.opponent(), Side::Ai);
    }
}
