//! Voice graph builder
//!
//! Turns preset descriptors into live, connected voices. A descriptor that
//! cannot be built (unknown type, no factory, bad parameters, failed
//! connect) is skipped with a warning; the session runs with whatever voices
//! could be built.

use log::{debug, warn};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::preset::{Preset, VoiceDescriptor};
use crate::voice::{AudioOutput, VoiceKind, VoiceNode, VoiceRegistry};

/// A voice owned by a running session
pub struct LiveVoice {
    pub kind: VoiceKind,
    pub node: Box<dyn VoiceNode>,
    /// Per-voice linear gain in `[0, 1]`, before the master gain
    pub volume: f32,
}

/// Read-only view of a live voice for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSummary {
    pub index: usize,
    pub kind: VoiceKind,
    pub volume: f32,
}

pub struct VoiceGraphBuilder<'a> {
    registry: &'a VoiceRegistry,
    config: &'a EngineConfig,
}

impl<'a> VoiceGraphBuilder<'a> {
    pub fn new(registry: &'a VoiceRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Build and connect every buildable voice of `preset`, in preset order
    pub fn build(&self, preset: &Preset, output: &dyn AudioOutput) -> Vec<LiveVoice> {
        let voices: Vec<LiveVoice> = preset
            .voices
            .iter()
            .enumerate()
            .filter_map(|(position, descriptor)| self.build_one(position, descriptor, output))
            .collect();

        debug!(
            "[BUILDER] Built {} of {} voices",
            voices.len(),
            preset.voices.len()
        );
        voices
    }

    fn build_one(
        &self,
        position: usize,
        descriptor: &VoiceDescriptor,
        output: &dyn AudioOutput,
    ) -> Option<LiveVoice> {
        let Some(kind) = descriptor.kind() else {
            warn!(
                "[BUILDER] Skipping voice {}: unknown type '{}'",
                position, descriptor.voice_type
            );
            return None;
        };

        if !self.registry.has_kind(kind) {
            warn!(
                "[BUILDER] Skipping voice {}: no factory registered for {}",
                position, kind
            );
            return None;
        }

        let mut params = match descriptor.params() {
            Ok(params) => params,
            Err(e) => {
                warn!("[BUILDER] Skipping voice {}: {}", position, e);
                return None;
            }
        };
        params.clamp_breathing_periods(self.config.min_breathing_period_secs);

        let mut node = match self.registry.create(&params) {
            Ok(node) => node,
            Err(e) => {
                warn!("[BUILDER] Skipping voice {} ({}): {}", position, kind, e);
                return None;
            }
        };

        if let Err(e) = node.connect(output) {
            warn!(
                "[BUILDER] Skipping voice {} ({}): connect failed: {}",
                position, kind, e
            );
            return None;
        }

        let volume = self
            .config
            .initial_volume(kind, descriptor.initial_volume);
        debug!(
            "[BUILDER] Voice {} ({}) connected, volume {:.3}",
            position, kind, volume
        );

        Some(LiveVoice { kind, node, volume })
    }
}
