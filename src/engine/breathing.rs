//! Breathing pace controller
//!
//! Rescales the base and target periods of a breathing voice by a fixed
//! factor. The controller only moves the target; the voice glides its
//! audible cycle toward it.
//!
//! The faster and slower factors (0.85 and 1.15 by default) are not
//! inverses of each other: one step faster followed by one step slower
//! leaves the period at 0.9775 of where it started.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::voice::Breathing;

/// Direction of a pace change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceDirection {
    /// Breathe faster: shorter period
    Increase,
    /// Breathe slower: longer period
    Decrease,
}

impl fmt::Display for PaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaceDirection::Increase => write!(f, "increase"),
            PaceDirection::Decrease => write!(f, "decrease"),
        }
    }
}

impl FromStr for PaceDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "increase" | "faster" | "up" => Ok(PaceDirection::Increase),
            "decrease" | "slower" | "down" => Ok(PaceDirection::Decrease),
            other => Err(format!("unknown pace direction '{}'", other)),
        }
    }
}

/// Snapshot of a breathing voice for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingParams {
    pub mp0: f64,
    pub mp1: f64,
    pub inhale_dur: f64,
    pub exhale_dur: f64,
    pub current_period: f64,
    /// Always equal to `mp1`
    pub target_period: f64,
}

impl BreathingParams {
    pub fn read(voice: &dyn Breathing) -> Self {
        let mp1 = voice.mp1();
        Self {
            mp0: voice.mp0(),
            mp1,
            inhale_dur: voice.inhale_dur(),
            exhale_dur: voice.exhale_dur(),
            current_period: voice.current_period(),
            target_period: mp1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaceController {
    faster_factor: f64,
    slower_factor: f64,
    min_period: f64,
}

impl PaceController {
    pub fn new(faster_factor: f64, slower_factor: f64, min_period: f64) -> Self {
        Self {
            faster_factor,
            slower_factor,
            min_period,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.faster_pace_factor,
            config.slower_pace_factor,
            config.min_breathing_period_secs,
        )
    }

    pub fn factor(&self, direction: PaceDirection) -> f64 {
        match direction {
            PaceDirection::Increase => self.faster_factor,
            PaceDirection::Decrease => self.slower_factor,
        }
    }

    /// Scale `mp0` and `mp1` and return the new `(mp0, mp1)`
    pub fn adjust(&self, voice: &mut dyn Breathing, direction: PaceDirection) -> (f64, f64) {
        let factor = self.factor(direction);
        let mp0 = (voice.mp0() * factor).max(self.min_period);
        let mp1 = (voice.mp1() * factor).max(self.min_period);
        voice.set_mp0(mp0);
        voice.set_mp1(mp1);
        (mp0, mp1)
    }
}

impl Default for PaceController {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
