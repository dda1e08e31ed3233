//! Animation bridge
//!
//! Republishes the breathing phase of the first voice that exposes one, for
//! visuals synchronised to the inhale/exhale cycle. Only the first such
//! voice counts; values are not aggregated.

use super::builder::LiveVoice;

#[derive(Debug, Clone, Default)]
pub struct AnimationBridge {
    last_value: f32,
}

impl AnimationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the driving voice; `None` when no voice publishes a value
    pub fn poll(&mut self, voices: &[LiveVoice]) -> Option<f32> {
        let value = voices
            .iter()
            .find_map(|voice| voice.node.animation_value())?
            .clamp(0.0, 1.0);
        self.last_value = value;
        Some(value)
    }

    /// Last value published
    pub fn value(&self) -> f32 {
        self.last_value
    }

    pub fn reset(&mut self) {
        self.last_value = 0.0;
    }
}
