//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Time only enters through `step(dt)` and `tick_countdown`
//! - Serve angles come from an injected, seedable RNG
//! - Feedback leaves as events, never as direct device calls

pub mod ai;
pub mod collision;
pub mod evaluator;
pub mod state;
pub mod tick;

pub use ai::AiController;
pub use collision::{ball_goal_check, ball_paddle_collision, ball_wall_collision};
pub use evaluator::{GameResult, MatchResultEvaluator};
pub use state::{
    ArenaConfig, Ball, FrameSnapshot, GameEvent, MatchState, Mode, Paddle, Phase, Side,
};
pub use tick::{ArenaState, ControlError, ControlEvent, TickInput};
