//! Engine configuration
//!
//! All tunables that would otherwise be process-wide constants: default
//! gains, timing intervals, the teardown grace delay and the breathing pace
//! policy. One value is handed to each engine at construction.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::voice::VoiceKind;

/// Default session length when a preset does not carry one (15 minutes)
pub const DEFAULT_DURATION_SECS: f64 = 900.0;

/// Default master volume (linear 0-1)
pub const DEFAULT_MASTER_VOLUME: f32 = 0.3;

/// Gain used for a voice kind missing from the default table
pub const FALLBACK_VOICE_VOLUME: f32 = 0.25;

/// Grace delay between stop and teardown; must outlast the voices' fade-out
pub const DEFAULT_GRACE_DELAY_MS: u64 = 1500;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Master volume applied when the engine is created
    pub master_volume: f32,

    /// Default linear gain per voice kind, used when a voice has no `iniVolume`
    pub default_volumes: HashMap<VoiceKind, f32>,

    /// Gain for kinds absent from `default_volumes`
    pub fallback_volume: f32,

    /// Session length for presets without `header.d`
    pub default_duration_secs: f64,

    /// Progress timer period
    pub tick_interval_ms: u64,

    /// Animation poll period (~60 Hz)
    pub animation_interval_ms: u64,

    /// Wait after stop before voices are disconnected
    pub grace_delay_ms: u64,

    /// Period multiplier for faster breathing
    pub faster_pace_factor: f64,

    /// Period multiplier for slower breathing
    pub slower_pace_factor: f64,

    /// Lower bound for breathing periods in seconds
    pub min_breathing_period_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Harsher voice kinds start quieter
        let default_volumes = HashMap::from([
            (VoiceKind::Tone, 0.15),
            (VoiceKind::BreathingTone, 0.15),
            (VoiceKind::BreathingBinauralBeat, 0.15),
            (VoiceKind::BinauralBeat, 0.12),
            (VoiceKind::NoteSequence, 0.1),
            (VoiceKind::NoiseGenerator, 0.08),
        ]);

        Self {
            master_volume: DEFAULT_MASTER_VOLUME,
            default_volumes,
            fallback_volume: FALLBACK_VOICE_VOLUME,
            default_duration_secs: DEFAULT_DURATION_SECS,
            tick_interval_ms: 100,
            animation_interval_ms: 16,
            grace_delay_ms: DEFAULT_GRACE_DELAY_MS,
            faster_pace_factor: 0.85,
            slower_pace_factor: 1.15,
            min_breathing_period_secs: 1.0,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(SessionError::InvalidConfig { reason });

        if !(0.0..=1.0).contains(&self.master_volume) {
            return invalid(format!("master_volume {} outside [0, 1]", self.master_volume));
        }
        if !(0.0..=1.0).contains(&self.fallback_volume) {
            return invalid(format!(
                "fallback_volume {} outside [0, 1]",
                self.fallback_volume
            ));
        }
        if let Some((kind, gain)) = self
            .default_volumes
            .iter()
            .find(|(_, gain)| !(0.0..=1.0).contains(*gain))
        {
            return invalid(format!("default volume {} for {} outside [0, 1]", gain, kind));
        }
        if !(self.default_duration_secs.is_finite() && self.default_duration_secs > 0.0) {
            return invalid(format!(
                "default_duration_secs must be positive, got {}",
                self.default_duration_secs
            ));
        }
        if self.tick_interval_ms == 0 || self.animation_interval_ms == 0 {
            return invalid("timer intervals must be non-zero".to_string());
        }
        if self.faster_pace_factor <= 0.0 || self.slower_pace_factor <= 0.0 {
            return invalid("pace factors must be positive".to_string());
        }
        if !(self.min_breathing_period_secs > 0.0) {
            return invalid(format!(
                "min_breathing_period_secs must be positive, got {}",
                self.min_breathing_period_secs
            ));
        }
        Ok(())
    }

    /// Default gain for a voice kind
    pub fn default_volume(&self, kind: VoiceKind) -> f32 {
        self.default_volumes
            .get(&kind)
            .copied()
            .unwrap_or(self.fallback_volume)
    }

    /// Starting gain for a voice: the preset's own volume wins over the defaults
    pub fn initial_volume(&self, kind: VoiceKind, preset_volume: Option<f32>) -> f32 {
        match preset_volume {
            Some(volume) if volume.is_finite() => volume.clamp(0.0, 1.0),
            _ => self.default_volume(kind),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}
