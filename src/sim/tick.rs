//! Arena simulation tick
//!
//! `ArenaState` is the authoritative model of one match. It is advanced by
//! `step` once per frame and by `tick_countdown` once per second in timed
//! matches; control events from the presentation layer drive the phase
//! machine.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::ai::AiController;
use super::collision::{ball_goal_check, ball_paddle_collision, ball_wall_collision};
use super::evaluator::{GameResult, MatchResultEvaluator};
use super::state::{
    ArenaConfig, Ball, FrameSnapshot, GameEvent, MatchState, Mode, Paddle, Phase, Side,
};
use crate::consts::*;
use crate::feedback::SoundEffect;
use crate::settings::GameSettings;
use crate::tuning::TuningProfile;

/// Serve timers within this many seconds of zero count as elapsed
const SERVE_EPSILON: f32 = 1e-4;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Latest pointer x position, if the pointer has moved
    pub pointer_x: Option<f32>,
}

impl TickInput {
    pub fn pointer(x: f32) -> Self {
        Self { pointer_x: Some(x) }
    }
}

/// Discrete commands from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Pause,
    Resume,
    Quit,
    OpenTuning,
    ApplyTuning(TuningProfile),
    Serve,
}

/// Control event that is illegal in the current phase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("match is over")]
    MatchOver,
    #[error("match was abandoned")]
    Abandoned,
    #[error("{event} is not allowed while {phase}")]
    NotAllowed { event: &'static str, phase: Phase },
}

impl ControlEvent {
    fn name(&self) -> &'static str {
        match self {
            ControlEvent::Pause => "PAUSE",
            ControlEvent::Resume => "RESUME",
            ControlEvent::Quit => "QUIT",
            ControlEvent::OpenTuning => "OPEN_TUNING",
            ControlEvent::ApplyTuning(_) => "APPLY_TUNING",
            ControlEvent::Serve => "SERVE",
        }
    }
}

/// Serve waiting for the delay to elapse
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingServe {
    toward: Side,
    remaining: f32,
}

/// Complete state of one match
#[derive(Debug, Clone)]
pub struct ArenaState<R = Pcg32> {
    config: ArenaConfig,
    profile: TuningProfile,
    ball: Ball,
    player: Paddle,
    ai: Paddle,
    match_state: MatchState,
    ai_controller: AiController,
    evaluator: MatchResultEvaluator,
    pending_serve: Option<PendingServe>,
    /// Explicit user pause, independent of the tuning panel
    paused_by_user: bool,
    tuning_open: bool,
    abandoned: bool,
    /// Side whose colour the ball carries
    ball_tint: Option<Side>,
    events: Vec<GameEvent>,
    rng: R,
}

impl ArenaState<Pcg32> {
    /// Default arena and tuning with a seeded generator
    pub fn new(mode: Mode, seed: u64) -> Self {
        Self::with_rng(
            ArenaConfig::default(),
            mode,
            TuningProfile::default(),
            Pcg32::seed_from_u64(seed),
        )
    }
}

impl<R: RngCore> ArenaState<R> {
    /// Build a match with an injected random source for serve angles
    pub fn with_rng(config: ArenaConfig, mode: Mode, profile: TuningProfile, rng: R) -> Self {
        let diameter = profile.ball_diameter();
        let width = profile.paddle_width();
        Self {
            config,
            profile,
            ball: Ball::new(config.ball_spawn(diameter), diameter / 2.0),
            player: Paddle::centered(Side::Player, width, &config),
            ai: Paddle::centered(Side::Ai, width, &config),
            match_state: MatchState::new(mode),
            ai_controller: AiController::for_mode(mode),
            evaluator: MatchResultEvaluator::new(),
            pending_serve: None,
            paused_by_user: false,
            tuning_open: false,
            abandoned: false,
            ball_tint: None,
            events: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn profile(&self) -> TuningProfile {
        self.profile
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.ai,
        }
    }

    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    pub fn phase(&self) -> Phase {
        self.match_state.phase
    }

    pub fn is_tuning_open(&self) -> bool {
        self.tuning_open
    }

    /// Player quit; the match produces no result
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Whether the 1 Hz countdown should currently be running
    pub fn countdown_active(&self) -> bool {
        matches!(self.match_state.mode, Mode::TimeAttack { .. })
            && self.match_state.phase.is_live()
            && !self.abandoned
    }

    /// Drain events recorded since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Immutable view for the renderer
    pub fn snapshot(&self) -> FrameSnapshot {
        let ball_opacity = if self.pending_serve.is_some() {
            RESETTING_OPACITY
        } else {
            1.0
        };
        FrameSnapshot {
            ball_pos: self.ball.pos,
            ball_diameter: self.ball.diameter(),
            ball_opacity,
            ball_tint: self.ball_tint,
            player_x: self.player.x,
            player_y: self.player.y,
            ai_x: self.ai.x,
            ai_y: self.ai.y,
            paddle_width: self.player.width,
            player_score: self.match_state.player_score,
            ai_score: self.match_state.ai_score,
            time_left_secs: self.match_state.time_left_secs,
            phase: self.match_state.phase,
            tuning_open: self.tuning_open,
        }
    }

    /// Advance the match by one frame.
    ///
    /// `dt_frame` is in seconds; per-tick velocities are scaled by
    /// `dt_frame / REFERENCE_DT`. The ball moves in slices of at most one
    /// reference tick, so a long frame cannot carry it across a paddle lane.
    /// Returns the final result on the step that ends the match.
    pub fn step(
        &mut self,
        dt_frame: f32,
        input: &TickInput,
        settings: &GameSettings,
    ) -> Option<GameResult> {
        if self.abandoned {
            return None;
        }

        match self.match_state.phase {
            Phase::Ready | Phase::Paused | Phase::Over => return None,
            Phase::Running | Phase::Resetting => {}
        }

        let dt = if dt_frame.is_finite() {
            dt_frame.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let scale = dt / REFERENCE_DT;

        self.apply_pointer(input);

        let mut scored = None;
        if self.match_state.phase == Phase::Resetting {
            self.advance_serve(dt, settings);
        } else {
            scored = self.advance_ball(scale, settings);
        }

        self.ai_controller
            .drive(&self.ball, &mut self.ai, self.config.width, scale);

        assert!(
            self.ball.is_finite(),
            "ball state is no longer finite: {:?}",
            self.ball
        );

        if scored.is_some() {
            self.evaluate(settings)
        } else {
            None
        }
    }

    /// One-second countdown callback for timed matches.
    ///
    /// Only decrements while the match is live; returns the final result when
    /// the countdown reaches zero.
    pub fn tick_countdown(&mut self, settings: &GameSettings) -> Option<GameResult> {
        if !self.countdown_active() {
            return None;
        }
        let remaining = self.match_state.time_left_secs?;
        let remaining = remaining.saturating_sub(1);
        self.match_state.time_left_secs = Some(remaining);
        log::debug!("countdown: {}s left", remaining);
        self.evaluate(settings)
    }

    /// Center the ball, stop it, and schedule a serve toward `toward` after
    /// `SERVE_DELAY`. The match shows `Resetting` until the serve.
    pub fn reset_ball(&mut self, toward: Side) {
        if self.match_state.phase == Phase::Over {
            return;
        }
        self.ball.pos = self.config.ball_spawn(self.ball.diameter());
        self.ball.vel = Vec2::ZERO;
        self.ball_tint = None;
        self.pending_serve = Some(PendingServe {
            toward,
            remaining: SERVE_DELAY,
        });
        if self.match_state.phase != Phase::Paused {
            self.set_phase(Phase::Resetting);
        }
    }

    /// Swap in a new tuning profile.
    ///
    /// Ball size and both paddle widths change together. Once the match has
    /// started the ball is reset so it cannot end up inside geometry sized for
    /// the previous profile.
    pub fn apply_profile(&mut self, profile: TuningProfile) -> Result<(), ControlError> {
        if self.match_state.phase == Phase::Over {
            return Err(ControlError::MatchOver);
        }

        let width = profile.paddle_width();
        self.profile = profile;
        self.ball.radius = profile.ball_diameter() / 2.0;
        self.player.width = width;
        self.ai.width = width;
        self.player.set_x(self.player.x, self.config.width);
        self.ai.set_x(self.ai.x, self.config.width);
        self.tuning_open = false;
        self.events.push(GameEvent::TuningApplied(profile));
        log::info!("tuning applied: {}", profile);

        if self.match_state.phase == Phase::Ready {
            self.ball.pos = self.config.ball_spawn(self.ball.diameter());
            self.ball.vel = Vec2::ZERO;
            return Ok(());
        }

        self.reset_ball(Side::Ai);
        if !self.paused_by_user {
            self.set_phase(Phase::Resetting);
        }
        Ok(())
    }

    /// Handle a discrete control event from the presentation layer
    pub fn apply_control(&mut self, event: ControlEvent) -> Result<(), ControlError> {
        let phase = self.match_state.phase;
        if phase == Phase::Over {
            return Err(ControlError::MatchOver);
        }
        if self.abandoned {
            return Err(ControlError::Abandoned);
        }
        let not_allowed = ControlError::NotAllowed {
            event: event.name(),
            phase,
        };

        match event {
            ControlEvent::Serve => {
                if phase != Phase::Ready || self.tuning_open {
                    return Err(not_allowed);
                }
                log::info!("match started: {}", self.match_state.mode.label());
                self.reset_ball(Side::Ai);
            }
            ControlEvent::Pause => match phase {
                Phase::Running | Phase::Resetting => {
                    self.paused_by_user = true;
                    self.set_phase(Phase::Paused);
                }
                Phase::Paused => self.paused_by_user = true,
                _ => return Err(not_allowed),
            },
            ControlEvent::Resume => match phase {
                Phase::Paused => {
                    self.paused_by_user = false;
                    self.tuning_open = false;
                    self.set_phase(self.resume_phase());
                }
                Phase::Ready if self.tuning_open => self.tuning_open = false,
                _ => return Err(not_allowed),
            },
            ControlEvent::OpenTuning => {
                if self.tuning_open {
                    return Ok(());
                }
                self.tuning_open = true;
                if phase.is_live() {
                    self.set_phase(Phase::Paused);
                }
            }
            ControlEvent::ApplyTuning(profile) => return self.apply_profile(profile),
            ControlEvent::Quit => {
                log::info!(
                    "match abandoned at {}-{}",
                    self.match_state.player_score,
                    self.match_state.ai_score
                );
                self.abandoned = true;
                self.pending_serve = None;
            }
        }
        Ok(())
    }

    /// Phase to return to when a pause ends
    fn resume_phase(&self) -> Phase {
        if self.pending_serve.is_some() {
            Phase::Resetting
        } else {
            Phase::Running
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.match_state.phase;
        if from == to {
            return;
        }
        log::debug!("phase {} -> {}", from, to);
        self.match_state.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Player paddle follows the latest pointer sample
    fn apply_pointer(&mut self, input: &TickInput) {
        if let Some(x) = input.pointer_x {
            if x.is_finite() {
                self.player.follow_pointer(x, self.config.width);
            }
        }
    }

    /// Count down the serve delay and launch the ball once it elapses
    fn advance_serve(&mut self, dt: f32, settings: &GameSettings) {
        let Some(mut serve) = self.pending_serve else {
            self.set_phase(Phase::Running);
            return;
        };

        serve.remaining -= dt;
        if serve.remaining > SERVE_EPSILON {
            self.pending_serve = Some(serve);
            return;
        }

        let speed = self.profile.base_speed();
        let angle: f32 = self.rng.random_range(-1.0..1.0);
        self.ball.vel = Vec2::new(angle * speed, serve.toward.direction() * speed);
        self.ball_tint = Some(serve.toward.opponent());
        self.pending_serve = None;
        self.set_phase(Phase::Running);
        self.events.push(GameEvent::Served {
            toward: serve.toward,
        });
        self.cue(settings, SoundEffect::Serve, false);
    }

    /// Integrate, collide and score. Returns the side that scored, if any.
    fn advance_ball(&mut self, scale: f32, settings: &GameSettings) -> Option<Side> {
        let slices = scale.ceil().max(1.0);
        let slice = scale / slices;
        for _ in 0..slices as u32 {
            if let Some(scorer) = self.advance_ball_slice(slice, settings) {
                return Some(scorer);
            }
        }
        None
    }

    /// Move the ball by at most one reference tick and resolve what it hits
    fn advance_ball_slice(&mut self, scale: f32, settings: &GameSettings) -> Option<Side> {
        self.ball.pos += self.ball.vel * scale;

        if ball_wall_collision(&mut self.ball, self.config.width) {
            self.events.push(GameEvent::WallBounce);
            self.cue(settings, SoundEffect::WallHit, true);
        }

        let lane = self.config.lane_height;
        for side in [Side::Player, Side::Ai] {
            let paddle = match side {
                Side::Player => self.player,
                Side::Ai => self.ai,
            };
            if ball_paddle_collision(&mut self.ball, &paddle, lane) {
                self.ball_tint = Some(side);
                self.events.push(GameEvent::PaddleHit(side));
                self.cue(settings, SoundEffect::PaddleHit, true);
            }
        }

        let scorer = ball_goal_check(&self.ball, self.config.height)?;
        match scorer {
            Side::Player => self.match_state.player_score += 1,
            Side::Ai => self.match_state.ai_score += 1,
        }
        log::info!(
            "{:?} scored, now on {} ({}-{})",
            scorer,
            self.match_state.score(scorer),
            self.match_state.player_score,
            self.match_state.ai_score
        );
        self.events.push(GameEvent::Scored(scorer));
        self.cue(settings, SoundEffect::Score, false);
        self.reset_ball(scorer);
        Some(scorer)
    }

    /// Run the win-condition check and enter `Over` if it fires
    fn evaluate(&mut self, settings: &GameSettings) -> Option<GameResult> {
        let result = self.evaluator.evaluate(&self.match_state)?;
        self.pending_serve = None;
        self.ball.vel = Vec2::ZERO;
        self.set_phase(Phase::Over);
        log::info!(
            "match over: {} {}-{}",
            result.mode.label(),
            result.player_score,
            result.ai_score
        );
        self.events.push(GameEvent::MatchOver(result));
        self.cue(settings, SoundEffect::GameOver, false);
        Some(result)
    }

    /// Record feedback cues allowed by the settings snapshot
    fn cue(&mut self, settings: &GameSettings, effect: SoundEffect, haptic: bool) {
        if haptic && settings.vibration {
            self.events.push(GameEvent::Haptic);
        }
        if settings.sound {
            self.events.push(GameEvent::Sound(effect));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SETTINGS: GameSettings = GameSettings {
        vibration: true,
        sound: true,
    };

    fn serve_steps() -> usize {
        (SERVE_DELAY / SIM_DT).round() as usize
    }

    /// Started match with the first serve already delivered
    fn running(mode: Mode, seed: u64) -> ArenaState {
        let mut state = ArenaState::new(mode, seed);
        state.apply_control(ControlEvent::Serve).unwrap();
        for _ in 0..serve_steps() {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        assert_eq!(state.phase(), Phase::Running);
        state
    }

    #[test]
    fn test_ready_is_static_until_serve() {
        let mut state = ArenaState::new(Mode::first_to_five(), 1);
        let before = state.snapshot();
        for _ in 0..30 {
            state.step(SIM_DT, &TickInput::pointer(10.0), &SETTINGS);
        }
        assert_eq!(state.snapshot(), before);
        assert_eq!(state.phase(), Phase::Ready);

        state.apply_control(ControlEvent::Serve).unwrap();
        assert_eq!(state.phase(), Phase::Resetting);
        assert_eq!(
            state.apply_control(ControlEvent::Serve),
            Err(ControlError::NotAllowed {
                event: "SERVE",
                phase: Phase::Resetting
            })
        );
    }

    #[test]
    fn test_serve_delay_is_exact() {
        let mut state = ArenaState::new(Mode::first_to_five(), 7);
        state.apply_control(ControlEvent::Serve).unwrap();

        for _ in 0..serve_steps() - 1 {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
            assert_eq!(state.ball().vel, Vec2::ZERO);
            assert_eq!(state.phase(), Phase::Resetting);
            assert_eq!(state.snapshot().ball_opacity, RESETTING_OPACITY);
        }

        state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        assert!(state.ball().is_moving());
        assert!(state.ball().vel.y < 0.0, "first serve goes toward the AI");
        assert_eq!(state.phase(), Phase::Running);
        assert!(state
            .take_events()
            .contains(&GameEvent::Served { toward: Side::Ai }));
    }

    #[test]
    fn test_resetting_keeps_paddles_responsive() {
        let mut state = ArenaState::new(Mode::first_to_five(), 3);
        state.apply_control(ControlEvent::Serve).unwrap();
        state.step(SIM_DT, &TickInput::pointer(50.0), &SETTINGS);
        assert_eq!(state.paddle(Side::Player).x, 0.0);
        assert_eq!(state.ball().pos, state.config().ball_spawn(16.0));
    }

    #[test]
    fn test_player_scores_when_ball_exits_top() {
        let mut state = running(Mode::first_to_five(), 11);
        state.ball.pos = Vec2::new(20.0, 1.0);
        state.ball.vel = Vec2::new(0.0, -3.0);

        let result = state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        assert_eq!(result, None);
        assert_eq!(state.match_state().player_score, 1);
        assert_eq!(state.match_state().ai_score, 0);
        assert_eq!(state.phase(), Phase::Resetting);
        assert_eq!(state.ball().vel, Vec2::ZERO);

        for _ in 0..serve_steps() {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        assert!(state.ball().vel.y > 0.0, "serve goes toward the scorer");
    }

    #[test]
    fn test_ai_scores_when_ball_exits_bottom() {
        let mut state = running(Mode::first_to_five(), 12);
        state.ball.pos = Vec2::new(5.0, state.config.height - 1.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        state.step(SIM_DT, &TickInput::pointer(390.0), &SETTINGS);
        assert_eq!(state.match_state().score(Side::Ai), 1);
        assert!(state.take_events().contains(&GameEvent::Scored(Side::Ai)));
    }

    #[test]
    fn test_first_to_five_emits_once() {
        let mut state = running(Mode::first_to_five(), 5);
        let mut results = Vec::new();

        for _ in 0..5 {
            state.ball.pos = Vec2::new(20.0, 1.0);
            state.ball.vel = Vec2::new(0.0, -4.0);
            if let Some(result) = state.step(SIM_DT, &TickInput::default(), &SETTINGS) {
                results.push(result);
            }
            for _ in 0..serve_steps() {
                if let Some(result) = state.step(SIM_DT, &TickInput::default(), &SETTINGS) {
                    results.push(result);
                }
            }
        }

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].player_score, 5);
        assert!(results[0].ai_score < 5);
        assert_eq!(results[0].mode, Mode::first_to_five());
        assert_eq!(state.phase(), Phase::Over);

        let frozen = state.snapshot();
        for _ in 0..120 {
            assert_eq!(state.step(SIM_DT, &TickInput::pointer(0.0), &SETTINGS), None);
            assert_eq!(state.tick_countdown(&SETTINGS), None);
        }
        assert_eq!(state.snapshot(), frozen);
        assert_eq!(
            state.apply_control(ControlEvent::Resume),
            Err(ControlError::MatchOver)
        );
    }

    #[test]
    fn test_time_attack_countdown() {
        let mut state = running(Mode::time_attack(), 21);
        let mut result = None;
        for _ in 0..TIME_ATTACK_SECONDS {
            assert!(result.is_none());
            result = state.tick_countdown(&SETTINGS);
        }
        let result = result.unwrap();
        assert_eq!(state.match_state().time_left_secs, Some(0));
        assert_eq!(result.time_spent_secs, Some(TIME_ATTACK_SECONDS));
        assert_eq!(state.phase(), Phase::Over);
        assert!(!state.countdown_active());
    }

    #[test]
    fn test_countdown_ignored_while_paused() {
        let mut state = running(Mode::time_attack(), 22);
        state.apply_control(ControlEvent::Pause).unwrap();
        assert!(!state.countdown_active());
        state.tick_countdown(&SETTINGS);
        assert_eq!(state.match_state().time_left_secs, Some(TIME_ATTACK_SECONDS));
    }

    #[test]
    fn test_first_to_five_has_no_countdown() {
        let mut state = running(Mode::first_to_five(), 23);
        assert!(!state.countdown_active());
        assert_eq!(state.tick_countdown(&SETTINGS), None);
        assert_eq!(state.match_state().time_left_secs, None);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut state = running(Mode::first_to_five(), 31);
        state.apply_control(ControlEvent::Pause).unwrap();
        let frozen = state.snapshot();
        for _ in 0..100 {
            state.step(SIM_DT, &TickInput::pointer(0.0), &SETTINGS);
        }
        assert_eq!(state.snapshot(), frozen);

        state.apply_control(ControlEvent::Resume).unwrap();
        assert_eq!(state.phase(), Phase::Running);
        assert!(state.apply_control(ControlEvent::Resume).is_err());
    }

    #[test]
    fn test_pause_during_reset_keeps_serve_pending() {
        let mut state = ArenaState::new(Mode::first_to_five(), 32);
        state.apply_control(ControlEvent::Serve).unwrap();
        for _ in 0..10 {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        state.apply_control(ControlEvent::Pause).unwrap();
        for _ in 0..200 {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        assert_eq!(state.ball().vel, Vec2::ZERO);

        state.apply_control(ControlEvent::Resume).unwrap();
        assert_eq!(state.phase(), Phase::Resetting);
        for _ in 0..serve_steps() - 10 {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        assert!(state.ball().is_moving());
    }

    #[test]
    fn test_tuning_panel_is_an_implicit_pause() {
        let mut state = running(Mode::time_attack(), 41);
        state.apply_control(ControlEvent::OpenTuning).unwrap();
        assert_eq!(state.phase(), Phase::Paused);
        assert!(state.is_tuning_open());
        assert!(!state.countdown_active());

        // Resume cancels the panel without applying anything
        state.apply_control(ControlEvent::Resume).unwrap();
        assert!(!state.is_tuning_open());
        assert_eq!(state.profile(), TuningProfile::default());
        assert_eq!(state.phase(), Phase::Running);
    }

    #[test]
    fn test_apply_tuning_mid_match_resets_ball() {
        use crate::tuning::{BallSize, BallSpeed, PaddleLength};

        let mut state = running(Mode::first_to_five(), 42);
        for _ in 0..20 {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        state.apply_control(ControlEvent::OpenTuning).unwrap();
        let profile = TuningProfile::new(BallSpeed::Fast, BallSize::Large, PaddleLength::Long);
        state
            .apply_control(ControlEvent::ApplyTuning(profile))
            .unwrap();

        assert_eq!(state.ball().diameter(), 24.0);
        assert_eq!(state.paddle(Side::Player).width, 200.0);
        assert_eq!(state.paddle(Side::Ai).width, 200.0);
        assert_eq!(state.phase(), Phase::Resetting);
        assert!(!state.is_tuning_open());
        assert_eq!(state.ball().vel, Vec2::ZERO);
        assert_eq!(state.ball().pos, state.config().ball_spawn(24.0));

        for _ in 0..serve_steps() {
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        }
        assert!((state.ball().vel.y + 5.5).abs() < 1e-5);
    }

    #[test]
    fn test_apply_tuning_before_serve_stays_ready() {
        use crate::tuning::{BallSize, BallSpeed, PaddleLength};

        let mut state = ArenaState::new(Mode::first_to_five(), 43);
        state.apply_control(ControlEvent::OpenTuning).unwrap();
        assert!(state.apply_control(ControlEvent::Serve).is_err());
        let profile = TuningProfile::new(BallSpeed::Slow, BallSize::Small, PaddleLength::Short);
        state.apply_profile(profile).unwrap();
        assert_eq!(state.phase(), Phase::Ready);
        assert_eq!(state.ball().diameter(), 10.0);
        assert_eq!(state.ball().center(), state.config().ball_spawn(0.0));
    }

    #[test]
    fn test_apply_tuning_keeps_explicit_pause() {
        let mut state = running(Mode::first_to_five(), 44);
        state.apply_control(ControlEvent::Pause).unwrap();
        state.apply_control(ControlEvent::OpenTuning).unwrap();
        state.apply_profile(TuningProfile::default()).unwrap();
        assert_eq!(state.phase(), Phase::Paused);

        state.apply_control(ControlEvent::Resume).unwrap();
        assert_eq!(state.phase(), Phase::Resetting);
    }

    #[test]
    fn test_quit_abandons_without_result() {
        let mut state = running(Mode::first_to_five(), 51);
        state.apply_control(ControlEvent::Pause).unwrap();
        state.apply_control(ControlEvent::Quit).unwrap();
        assert!(state.is_abandoned());
        state.take_events();

        let frozen = state.snapshot();
        for event in [
            ControlEvent::Resume,
            ControlEvent::Pause,
            ControlEvent::OpenTuning,
            ControlEvent::ApplyTuning(TuningProfile::default()),
            ControlEvent::Serve,
            ControlEvent::Quit,
        ] {
            assert_eq!(state.apply_control(event), Err(ControlError::Abandoned));
        }
        assert_eq!(state.step(SIM_DT, &TickInput::default(), &SETTINGS), None);
        assert_eq!(state.snapshot(), frozen);
        assert_eq!(state.phase(), Phase::Paused);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_cues_follow_settings_snapshot() {
        let quiet = GameSettings {
            vibration: false,
            sound: false,
        };
        let mut state = running(Mode::first_to_five(), 61);
        state.take_events();
        state.ball.pos = Vec2::new(1.0, 300.0);
        state.ball.vel = Vec2::new(-3.0, 1.0);
        state.step(SIM_DT, &TickInput::default(), &quiet);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::WallBounce));
        assert!(!events.contains(&GameEvent::Haptic));

        state.ball.pos = Vec2::new(1.0, 300.0);
        state.ball.vel = Vec2::new(-3.0, 1.0);
        state.step(SIM_DT, &TickInput::default(), &SETTINGS);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Haptic));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::WallHit)));
    }

    #[test]
    fn test_variable_dt_keeps_physical_speed() {
        let mut fixed = running(Mode::first_to_five(), 71);
        let mut halved = fixed.clone();
        fixed.ball.pos = Vec2::new(200.0, 300.0);
        fixed.ball.vel = Vec2::new(1.0, 2.0);
        halved.ball.pos = fixed.ball.pos;
        halved.ball.vel = fixed.ball.vel;

        fixed.step(SIM_DT, &TickInput::default(), &SETTINGS);
        halved.step(SIM_DT / 2.0, &TickInput::default(), &SETTINGS);
        halved.step(SIM_DT / 2.0, &TickInput::default(), &SETTINGS);
        assert!((fixed.ball().pos - halved.ball().pos).length() < 1e-3);
    }

    #[test]
    fn test_long_frame_cannot_tunnel_through_paddle() {
        let mut state = running(Mode::first_to_five(), 72);
        let paddle = *state.paddle(Side::Player);
        state.ball.pos = Vec2::new(
            paddle.center_x() - state.ball.radius,
            paddle.y - state.ball.diameter() - 2.0,
        );
        state.ball.vel = Vec2::new(0.0, state.profile().base_speed());
        state.take_events();

        state.step(MAX_FRAME_DT, &TickInput::default(), &SETTINGS);
        assert!(state.ball().vel.y < 0.0, "ball bounced back up");
        assert!(state.ball().pos.y < paddle.y);
        assert!(
            state
                .take_events()
                .contains(&GameEvent::PaddleHit(Side::Player))
        );
        assert_eq!(state.match_state().ai_score, 0);
    }

    #[test]
    fn test_long_frame_matches_reference_ticks() {
        let mut long = running(Mode::first_to_five(), 73);
        let mut ticked = long.clone();
        for state in [&mut long, &mut ticked] {
            state.ball.pos = Vec2::new(150.0, 420.0);
            state.ball.vel = Vec2::new(-4.0, 9.0);
        }

        long.step(6.0 * REFERENCE_DT, &TickInput::default(), &SETTINGS);
        for _ in 0..6 {
            ticked.step(REFERENCE_DT, &TickInput::default(), &SETTINGS);
        }
        assert!((long.ball().pos - ticked.ball().pos).length() < 1e-2);
        assert_eq!(long.ball().vel, ticked.ball().vel);
    }

    #[test]
    fn test_same_seed_same_serve() {
        let a = running(Mode::first_to_five(), 99);
        let b = running(Mode::first_to_five(), 99);
        assert_eq!(a.ball().vel, b.ball().vel);
    }

    #[test]
    #[should_panic(expected = "no longer finite")]
    fn test_non_finite_ball_halts() {
        let mut state = running(Mode::first_to_five(), 81);
        state.ball.vel = Vec2::new(f32::NAN, 1.0);
        state.step(SIM_DT, &TickInput::default(), &SETTINGS);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_score_per_step(
            x in 0.0f32..384.0,
            y in -20.0f32..700.0,
            vx in -6.0f32..6.0,
            vy in -12.0f32..12.0,
        ) {
            let mut state = running(Mode::time_attack(), 1);
            state.ball.pos = Vec2::new(x, y);
            state.ball.vel = Vec2::new(vx, vy);
            let before = state.match_state().player_score + state.match_state().ai_score;
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
            let after = state.match_state().player_score + state.match_state().ai_score;
            prop_assert!(after - before <= 1);
        }

        #[test]
        fn prop_vertical_speed_stays_capped(
            offset in -70.0f32..70.0,
            vy in 0.5f32..12.0,
            hits in 1usize..40,
        ) {
            let mut state = running(Mode::first_to_five(), 4);
            for _ in 0..hits {
                let paddle = *state.paddle(Side::Player);
                state.ball.pos = Vec2::new(
                    paddle.center_x() + offset - state.ball.radius,
                    paddle.y - state.ball.diameter() + 1.0,
                );
                state.ball.vel = Vec2::new(0.0, vy.max(state.ball.vel.y.abs()));
                state.step(SIM_DT, &TickInput::default(), &SETTINGS);
                prop_assert!(state.ball().vel.y.abs() <= MAX_BALL_SPEED);
            }
        }

        #[test]
        fn prop_wall_reflection_is_symmetric(
            y in 200.0f32..400.0,
            vx in 0.5f32..6.0,
            vy in -5.0f32..5.0,
        ) {
            let mut state = running(Mode::first_to_five(), 2);
            state.ball.pos = Vec2::new(0.2, y);
            state.ball.vel = Vec2::new(-vx, vy);
            state.step(SIM_DT, &TickInput::default(), &SETTINGS);
            prop_assert_eq!(state.ball().vel, Vec2::new(vx, vy));
            prop_assert_eq!(state.ball().pos.x, 0.0);
        }

        #[test]
        fn prop_pause_freezes_everything(
            steps in 1usize..200,
            pointer in proptest::option::of(0.0f32..400.0),
        ) {
            let mut state = running(Mode::time_attack(), 3);
            state.apply_control(ControlEvent::Pause).unwrap();
            let frozen = state.snapshot();
            let input = TickInput { pointer_x: pointer };
            for _ in 0..steps {
                state.step(SIM_DT, &input, &SETTINGS);
                state.tick_countdown(&SETTINGS);
            }
            prop_assert_eq!(state.snapshot(), frozen);
        }
    }
}
