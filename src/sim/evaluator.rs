//! Match termination
//!
//! Watches the score and countdown after every change and produces the final
//! `GameResult` once, when the mode's win condition is met.

use serde::{Deserialize, Serialize};

use super::state::{MatchState, Mode, Side};

/// Final outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub player_score: u32,
    pub ai_score: u32,
    pub mode: Mode,
    /// Full duration for timed matches, `None` otherwise
    pub time_spent_secs: Option<u32>,
}

impl GameResult {
    /// Side with more points, `None` on a draw
    pub fn winner(&self) -> Option<Side> {
        use std::cmp::Ordering;
        match self.player_score.cmp(&self.ai_score) {
            Ordering::Greater => Some(Side::Player),
            Ordering::Less => Some(Side::Ai),
            Ordering::Equal => None,
        }
    }

    pub fn player_won(&self) -> bool {
        self.winner() == Some(Side::Player)
    }
}

/// One-shot win-condition check
#[derive(Debug, Clone, Default)]
pub struct MatchResultEvaluator {
    emitted: bool,
}

impl MatchResultEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the result has already been produced
    pub fn has_emitted(&self) -> bool {
        self.emitted
    }

    /// Inspect post-step state. Returns the result the first time a win
    /// condition holds and `None` on every later call.
    pub fn evaluate(&mut self, state: &MatchState) -> Option<GameResult> {
        if self.emitted {
            return None;
        }

        let result = match state.mode {
            Mode::FirstTo { target } => {
                if state.player_score >= target || state.ai_score >= target {
                    Some(GameResult {
                        player_score: state.player_score,
                        ai_score: state.ai_score,
                        mode: state.mode,
                        time_spent_secs: None,
                    })
                } else {
                    None
                }
            }
            Mode::TimeAttack { duration_secs } => match state.time_left_secs {
                Some(0) | None => Some(GameResult {
                    player_score: state.player_score,
                    ai_score: state.ai_score,
                    mode: state.mode,
                    time_spent_secs: Some(duration_secs),
                }),
                Some(_) => None,
            },
        };

        if result.is_some() {
            self.emitted = true;
        }
        result
    }
}
