//! Tuning presets
//!
//! A profile bundles the three dimensions the in-game tuner exposes. Each
//! dimension is a closed set of presets; parsing rejects anything else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuningError {
    #[error("unknown {dimension} option: {value:?}")]
    UnknownOption {
        dimension: &'static str,
        value: String,
    },
}

/// Serve speed preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BallSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl BallSpeed {
    pub const ALL: [BallSpeed; 3] = [BallSpeed::Slow, BallSpeed::Normal, BallSpeed::Fast];

    pub fn as_str(&self) -> &'static str {
        match self {
            BallSpeed::Slow => "SLOW",
            BallSpeed::Normal => "NORMAL",
            BallSpeed::Fast => "FAST",
        }
    }

    /// Serve speed in units per reference tick
    pub fn scalar(&self) -> f32 {
        match self {
            BallSpeed::Slow => 2.2,
            BallSpeed::Normal => 3.5,
            BallSpeed::Fast => 5.5,
        }
    }
}

impl FromStr for BallSpeed {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slow" => Ok(BallSpeed::Slow),
            "normal" => Ok(BallSpeed::Normal),
            "fast" => Ok(BallSpeed::Fast),
            _ => Err(TuningError::UnknownOption {
                dimension: "ball speed",
                value: s.to_string(),
            }),
        }
    }
}

/// Ball diameter preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BallSize {
    Small,
    #[default]
    Normal,
    Large,
}

impl BallSize {
    pub const ALL: [BallSize; 3] = [BallSize::Small, BallSize::Normal, BallSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            BallSize::Small => "SMALL",
            BallSize::Normal => "NORMAL",
            BallSize::Large => "LARGE",
        }
    }

    /// Ball diameter in arena units
    pub fn scalar(&self) -> f32 {
        match self {
            BallSize::Small => 10.0,
            BallSize::Normal => 16.0,
            BallSize::Large => 24.0,
        }
    }
}

impl FromStr for BallSize {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(BallSize::Small),
            "normal" => Ok(BallSize::Normal),
            "large" => Ok(BallSize::Large),
            _ => Err(TuningError::UnknownOption {
                dimension: "ball size",
                value: s.to_string(),
            }),
        }
    }
}

/// Paddle length preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaddleLength {
    Short,
    #[default]
    Normal,
    Long,
}

impl PaddleLength {
    pub const ALL: [PaddleLength; 3] = [
        PaddleLength::Short,
        PaddleLength::Normal,
        PaddleLength::Long,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaddleLength::Short => "SHORT",
            PaddleLength::Normal => "NORMAL",
            PaddleLength::Long => "LONG",
        }
    }

    /// Paddle width in arena units
    pub fn scalar(&self) -> f32 {
        match self {
            PaddleLength::Short => 100.0,
            PaddleLength::Normal => 140.0,
            PaddleLength::Long => 200.0,
        }
    }
}

impl FromStr for PaddleLength {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(PaddleLength::Short),
            "normal" => Ok(PaddleLength::Normal),
            "long" => Ok(PaddleLength::Long),
            _ => Err(TuningError::UnknownOption {
                dimension: "paddle length",
                value: s.to_string(),
            }),
        }
    }
}

/// A complete tuning selection, applied as one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TuningProfile {
    pub ball_speed: BallSpeed,
    pub ball_size: BallSize,
    pub paddle_length: PaddleLength,
}

impl TuningProfile {
    pub fn new(ball_speed: BallSpeed, ball_size: BallSize, paddle_length: PaddleLength) -> Self {
        Self {
            ball_speed,
            ball_size,
            paddle_length,
        }
    }

    /// Build a profile from the tuner's option labels.
    ///
    /// Fails on the first label that is not one of the presets; nothing is
    /// clamped or defaulted.
    pub fn from_labels(speed: &str, size: &str, paddle: &str) -> Result<Self, TuningError> {
        Ok(Self {
            ball_speed: speed.parse()?,
            ball_size: size.parse()?,
            paddle_length: paddle.parse()?,
        })
    }

    /// Serve speed (units per reference tick)
    pub fn base_speed(&self) -> f32 {
        self.ball_speed.scalar()
    }

    /// Ball diameter
    pub fn ball_diameter(&self) -> f32 {
        self.ball_size.scalar()
    }

    pub fn paddle_width(&self) -> f32 {
        self.paddle_length.scalar()
    }
}

impl fmt::Display for TuningProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "speed={} size={} paddle={}",
            self.ball_speed.as_str(),
            self.ball_size.as_str(),
            self.paddle_length.as_str()
        )
    }
}
