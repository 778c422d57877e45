//! Collision detection and response
//!
//! Side walls reflect the ball without energy loss. Paddles are tested as
//! lane bands: the ball's leading edge must be inside the lane strip, its
//! center must be over the paddle, and it must be travelling toward it.

use super::state::{Ball, Paddle, Side};
use crate::consts::{MAX_BALL_SPEED, PADDLE_BOUNCE_FACTOR, PADDLE_DEFLECTION};

/// Reflect the ball off the left/right walls.
///
/// Returns true if a wall was touched. The ball is clamped inside
/// `[0, arena_width - diameter]` and its horizontal velocity is pointed back
/// into the arena.
pub fn ball_wall_collision(ball: &mut Ball, arena_width: f32) -> bool {
    let diameter = ball.diameter();
    if ball.pos.x <= 0.0 {
        ball.pos.x = 0.0;
        ball.vel.x = ball.vel.x.abs();
        true
    } else if ball.pos.x + diameter >= arena_width {
        ball.pos.x = arena_width - diameter;
        ball.vel.x = -ball.vel.x.abs();
        true
    } else {
        false
    }
}

/// Whether the ball is inside `paddle`'s lane band, over the paddle, and
/// heading toward it
pub fn ball_in_paddle_lane(ball: &Ball, paddle: &Paddle, lane_height: f32) -> bool {
    let lane_top = paddle.y;
    let lane_bottom = paddle.y + lane_height;

    let (approaching, leading_edge) = match paddle.owner {
        // Player paddle is below the ball: leading edge is the bottom
        Side::Player => (ball.vel.y > 0.0, ball.pos.y + ball.diameter()),
        // AI paddle is above the ball: leading edge is the top
        Side::Ai => (ball.vel.y < 0.0, ball.pos.y),
    };

    approaching
        && leading_edge >= lane_top
        && leading_edge <= lane_bottom
        && paddle.spans(ball.center().x)
}

/// Horizontal hit offset normalized to [-1, 1] (-1 = left edge)
pub fn hit_offset(ball: &Ball, paddle: &Paddle) -> f32 {
    let half = paddle.width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball.center().x - paddle.center_x()) / half).clamp(-1.0, 1.0)
}

/// Vertical speed after a paddle hit: reversed, amplified, capped
pub fn bounced_vertical_speed(vel_y: f32) -> f32 {
    (-vel_y * PADDLE_BOUNCE_FACTOR).clamp(-MAX_BALL_SPEED, MAX_BALL_SPEED)
}

/// Test and resolve a ball/paddle hit.
///
/// On a hit the vertical velocity is reversed and amplified (capped at
/// `MAX_BALL_SPEED`), the horizontal velocity is set from the hit offset, and
/// the ball is snapped onto the paddle surface so it cannot stay inside the
/// lane.
pub fn ball_paddle_collision(ball: &mut Ball, paddle: &Paddle, lane_height: f32) -> bool {
    if !ball_in_paddle_lane(ball, paddle, lane_height) {
        return false;
    }

    ball.vel.y = bounced_vertical_speed(ball.vel.y);
    ball.vel.x = hit_offset(ball, paddle) * PADDLE_DEFLECTION;
    ball.pos.y = match paddle.owner {
        Side::Player => paddle.y - ball.diameter(),
        Side::Ai => paddle.y + lane_height,
    };
    true
}

/// Goal line crossed by the ball, if any. Exiting the top scores for the
/// player, exiting the bottom scores for the AI.
pub fn ball_goal_check(ball: &Ball, arena_height: f32) -> Option<Side> {
    if ball.pos.y < 0.0 {
        Some(Side::Player)
    } else if ball.pos.y > arena_height {
        Some(Side::Ai)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ArenaConfig;
    use glam::Vec2;

    fn player_paddle() -> (ArenaConfig, Paddle) {
        let config = ArenaConfig::default();
        let paddle = Paddle::centered(Side::Player, 140.0, &config);
        (config, paddle)
    }

    #[test]
    fn test_left_wall_reflects() {
        let mut ball = Ball::new(Vec2::new(-2.0, 300.0), 8.0);
        ball.vel = Vec2::new(-3.0, 2.0);

        assert!(ball_wall_collision(&mut ball, 400.0));
        assert_eq!(ball.pos.x, 0.0);
        assert_eq!(ball.vel, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn test_right_wall_reflects() {
        let mut ball = Ball::new(Vec2::new(390.0, 300.0), 8.0);
        ball.vel = Vec2::new(4.0, -1.0);

        assert!(ball_wall_collision(&mut ball, 400.0));
        assert_eq!(ball.pos.x, 400.0 - 16.0);
        assert_eq!(ball.vel, Vec2::new(-4.0, -1.0));
    }

    #[test]
    fn test_no_wall_hit_in_open_space() {
        let mut ball = Ball::new(Vec2::new(100.0, 300.0), 8.0);
        ball.vel = Vec2::new(4.0, -1.0);
        assert!(!ball_wall_collision(&mut ball, 400.0));
        assert_eq!(ball.vel, Vec2::new(4.0, -1.0));
    }

    #[test]
    fn test_player_paddle_center_hit() {
        let (config, paddle) = player_paddle();
        let mut ball = Ball::new(
            Vec2::new(paddle.center_x() - 8.0, paddle.y - 16.0 + 4.0),
            8.0,
        );
        ball.vel = Vec2::new(1.0, 4.0);

        assert!(ball_paddle_collision(&mut ball, &paddle, config.lane_height));
        assert!((ball.vel.y + 4.0 * PADDLE_BOUNCE_FACTOR).abs() < 1e-5);
        assert!(ball.vel.x.abs() < 1e-5, "center hit goes straight back");
        assert_eq!(ball.pos.y, paddle.y - 16.0, "snapped onto paddle surface");
    }

    #[test]
    fn test_edge_hit_deflects() {
        let (config, paddle) = player_paddle();
        let mut ball = Ball::new(Vec2::new(paddle.x + paddle.width - 8.0, paddle.y - 10.0), 8.0);
        ball.vel = Vec2::new(0.0, 4.0);

        assert!(ball_paddle_collision(&mut ball, &paddle, config.lane_height));
        assert!((ball.vel.x - PADDLE_DEFLECTION).abs() < 1e-4);
    }

    #[test]
    fn test_ball_moving_away_does_not_bounce() {
        let (config, paddle) = player_paddle();
        let mut ball = Ball::new(Vec2::new(paddle.center_x() - 8.0, paddle.y - 12.0), 8.0);
        ball.vel = Vec2::new(0.0, -4.0);

        assert!(!ball_paddle_collision(&mut ball, &paddle, config.lane_height));
        assert_eq!(ball.vel.y, -4.0);
    }

    #[test]
    fn test_ball_beside_paddle_misses() {
        let (config, paddle) = player_paddle();
        let mut ball = Ball::new(Vec2::new(paddle.x - 30.0, paddle.y - 12.0), 8.0);
        ball.vel = Vec2::new(0.0, 4.0);
        assert!(!ball_paddle_collision(&mut ball, &paddle, config.lane_height));
    }

    #[test]
    fn test_ai_paddle_hit_snaps_below_lane() {
        let config = ArenaConfig::default();
        let paddle = Paddle::centered(Side::Ai, 140.0, &config);
        let mut ball = Ball::new(Vec2::new(paddle.center_x() - 8.0, paddle.y + 10.0), 8.0);
        ball.vel = Vec2::new(0.0, -5.0);

        assert!(ball_paddle_collision(&mut ball, &paddle, config.lane_height));
        assert!(ball.vel.y > 0.0);
        assert_eq!(ball.pos.y, paddle.y + config.lane_height);
    }

    #[test]
    fn test_bounce_is_capped() {
        assert_eq!(bounced_vertical_speed(11.9), -MAX_BALL_SPEED);
        assert_eq!(bounced_vertical_speed(-11.9), MAX_BALL_SPEED);
    }

    #[test]
    fn test_goal_lines() {
        let mut ball = Ball::new(Vec2::new(100.0, -1.0), 8.0);
        assert_eq!(ball_goal_check(&ball, 680.0), Some(Side::Player));
        ball.pos.y = 681.0;
        assert_eq!(ball_goal_check(&ball, 680.0), Some(Side::Ai));
        ball.pos.y = 300.0;
        assert_eq!(ball_goal_check(&ball, 680.0), None);
    }
}
