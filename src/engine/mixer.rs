//! Volume mixer
//!
//! Effective gain of a voice is `master * voice volume`. Every change is
//! written straight to the voice nodes; smoothing is up to the voices.

use super::builder::LiveVoice;

/// Clamp a linear gain into `[0, 1]`; NaN becomes silence
pub fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() {
        0.0
    } else {
        gain.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct VolumeMixer {
    master: f32,
}

impl VolumeMixer {
    pub fn new(master: f32) -> Self {
        Self {
            master: clamp_gain(master),
        }
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    /// Store a new master gain and return the clamped value
    pub fn set_master(&mut self, gain: f32) -> f32 {
        self.master = clamp_gain(gain);
        self.master
    }

    pub fn effective(&self, voice_volume: f32) -> f32 {
        self.master * voice_volume
    }

    /// Write the effective gain to every voice
    pub fn apply(&self, voices: &mut [LiveVoice]) {
        for voice in voices.iter_mut() {
            let gain = self.effective(voice.volume);
            voice.node.set_volume(gain);
        }
    }
}
