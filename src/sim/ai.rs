//! Reactive AI opponent
//!
//! The controller chases the ball's current x position at a fixed speed. It has
//! no memory and does no prediction, so fast cross-court shots beat it.

use super::state::{Ball, Mode, Paddle};
use crate::consts::AI_DEAD_ZONE;

/// Fixed-speed ball follower
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiController {
    /// Units per reference tick
    pub speed: f32,
    /// Offsets smaller than this are ignored
    pub dead_zone: f32,
}

impl AiController {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            dead_zone: AI_DEAD_ZONE,
        }
    }

    /// Controller tuned for a match mode
    pub fn for_mode(mode: Mode) -> Self {
        Self::new(mode.ai_speed())
    }

    /// Left-edge position that would center `paddle` under the ball
    pub fn target_x(ball: &Ball, paddle: &Paddle) -> f32 {
        ball.center().x - paddle.width / 2.0
    }

    /// Desired paddle movement for one tick.
    ///
    /// `scale` is the fraction of a reference tick being simulated. The move
    /// is always a fixed step toward the target, never a snap onto it.
    pub fn desired_delta(&self, ball: &Ball, paddle: &Paddle, scale: f32) -> f32 {
        let offset = Self::target_x(ball, paddle) - paddle.x;
        if offset.abs() <= self.dead_zone {
            0.0
        } else {
            offset.signum() * self.speed * scale
        }
    }

    /// Move `paddle` one tick toward the ball, clamped to the arena
    pub fn drive(&self, ball: &Ball, paddle: &mut Paddle, arena_width: f32, scale: f32) {
        let delta = self.desired_delta(ball, paddle, scale);
        if delta != 0.0 {
            paddle.set_x(paddle.x + delta, arena_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ArenaConfig, Side};
    use glam::Vec2;

    fn setup(ball_center_x: f32) -> (ArenaConfig, Ball, Paddle) {
        let config = ArenaConfig::default();
        let ball = Ball::new(Vec2::new(ball_center_x - 8.0, 300.0), 8.0);
        let paddle = Paddle::centered(Side::Ai, 140.0, &config);
        (config, ball, paddle)
    }

    #[test]
    fn test_moves_toward_ball_at_fixed_speed() {
        let (_, ball, paddle) = setup(350.0);
        let ai = AiController::new(4.0);
        assert_eq!(ai.desired_delta(&ball, &paddle, 1.0), 4.0);

        let (_, ball, paddle) = setup(20.0);
        assert_eq!(ai.desired_delta(&ball, &paddle, 1.0), -4.0);
    }

    #[test]
    fn test_dead_zone_holds_still() {
        let (_, ball, paddle) = setup(203.0);
        let ai = AiController::new(4.0);
        assert_eq!(ai.desired_delta(&ball, &paddle, 1.0), 0.0);
    }

    #[test]
    fn test_time_attack_is_faster() {
        let relaxed = AiController::for_mode(Mode::first_to_five());
        let pressured = AiController::for_mode(Mode::time_attack());
        assert!(pressured.speed > relaxed.speed);
    }

    #[test]
    fn test_drive_is_clamped_to_arena() {
        let (config, ball, mut paddle) = setup(395.0);
        let ai = AiController::new(4.0);
        for _ in 0..200 {
            ai.drive(&ball, &mut paddle, config.width, 1.0);
        }
        assert_eq!(paddle.x, config.width - paddle.width);
    }

    #[test]
    fn test_never_snaps_in_one_tick() {
        let (config, ball, mut paddle) = setup(380.0);
        let ai = AiController::new(5.2);
        let before = paddle.x;
        ai.drive(&ball, &mut paddle, config.width, 1.0);
        assert!((paddle.x - before - 5.2).abs() < 1e-5);
        assert!(paddle.x < AiController::target_x(&ball, &paddle));
    }
}
