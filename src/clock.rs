//! Frame-driven simulation clock
//!
//! Converts variable display-frame deltas into fixed simulation steps and owns
//! the 1 Hz countdown used by timed matches. The countdown only exists while
//! the match is live; leaving that state drops it, which cancels it and
//! discards any partial second.

use rand::RngCore;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::settings::GameSettings;
use crate::sim::{ArenaState, GameResult, TickInput};

/// Running 1 Hz countdown. Dropping it cancels it.
#[derive(Debug)]
pub struct Countdown {
    ticks_per_second: u32,
    ticks: u32,
}

impl Countdown {
    fn start() -> Self {
        log::debug!("countdown started");
        Self {
            ticks_per_second: (1.0 / SIM_DT).round().max(1.0) as u32,
            ticks: 0,
        }
    }

    /// Advance by one fixed step; true when a full second has elapsed
    fn advance(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks >= self.ticks_per_second {
            self.ticks = 0;
            true
        } else {
            false
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        log::debug!("countdown cancelled ({} ticks discarded)", self.ticks);
    }
}

/// Fixed-step scheduler for one match
#[derive(Debug)]
pub struct SimulationClock {
    accumulator: f32,
    running: bool,
    countdown: Option<Countdown>,
    countdowns_started: u32,
    countdowns_cancelled: u32,
    steps: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    /// A running clock with an empty accumulator
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            running: true,
            countdown: None,
            countdowns_started: 0,
            countdowns_cancelled: 0,
            steps: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown.is_some()
    }

    /// Countdowns started and cancelled so far
    pub fn countdown_stats(&self) -> (u32, u32) {
        (self.countdowns_started, self.countdowns_cancelled)
    }

    /// Fixed steps executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Stop scheduling. Cancels the countdown if one is running.
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
        self.cancel_countdown();
    }

    /// Drive the match by one display frame.
    ///
    /// Runs up to `MAX_SUBSTEPS` fixed steps and, in timed matches, one
    /// countdown tick per simulated second. Returns the result on the frame
    /// the match ends; the clock stops itself at that point.
    pub fn frame<R: RngCore>(
        &mut self,
        arena: &mut ArenaState<R>,
        frame_dt: f32,
        input: &TickInput,
        settings: &GameSettings,
    ) -> Option<GameResult> {
        if !self.running {
            return None;
        }

        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut result = None;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.steps += 1;

            if let Some(r) = arena.step(SIM_DT, input, settings) {
                result = Some(r);
            }

            self.sync_countdown(arena);
            let second_elapsed = match self.countdown.as_mut() {
                Some(countdown) => countdown.advance(),
                None => false,
            };
            if second_elapsed {
                if let Some(r) = arena.tick_countdown(settings) {
                    result = Some(r);
                }
            }

            if result.is_some() || arena.is_abandoned() {
                self.stop();
                break;
            }
        }

        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        result
    }

    /// Start or cancel the countdown to match the arena's phase
    fn sync_countdown<R: RngCore>(&mut self, arena: &ArenaState<R>) {
        let wanted = arena.countdown_active();
        if wanted && self.countdown.is_none() {
            self.countdown = Some(Countdown::start());
            self.countdowns_started += 1;
        } else if !wanted {
            self.cancel_countdown();
        }
    }

    fn cancel_countdown(&mut self) {
        if self.countdown.take().is_some() {
            self.countdowns_cancelled += 1;
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.cancel_countdown();
    }
}
