//! Haptic and sound cues
//!
//! The simulation only emits cue events, already gated by the settings
//! snapshot it was given. A `FeedbackSink` turns them into device effects.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball hits a paddle
    PaddleHit,
    /// Ball hits a side wall
    WallHit,
    /// Someone scored
    Score,
    /// Ball served after the delay
    Serve,
    /// Match ended
    GameOver,
}

/// Device-side consumer of cues
pub trait FeedbackSink {
    /// Light impact vibration
    fn haptic(&mut self);
    fn play(&mut self, effect: SoundEffect);
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogFeedback {
    pub haptics: u32,
    pub sounds: u32,
}

impl FeedbackSink for LogFeedback {
    fn haptic(&mut self) {
        self.haptics += 1;
        log::trace!("haptic: light impact");
    }

    fn play(&mut self, effect: SoundEffect) {
        self.sounds += 1;
        log::trace!("sound: {:?}", effect);
    }
}

/// Forward cue events to a sink; other events are ignored
pub fn dispatch<S: FeedbackSink + ?Sized>(events: &[GameEvent], sink: &mut S) {
    for event in events {
        match event {
            GameEvent::Haptic => sink.haptic(),
            GameEvent::Sound(effect) => sink.play(*effect),
            _ => {}
        }
    }
}
