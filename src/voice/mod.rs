//! Voice capability surface
//!
//! The engine never generates sound itself. Each voice kind is provided by a
//! [`VoiceFactory`] that builds a [`VoiceNode`]; the engine only drives the
//! capabilities declared here.
//!
//! Optional capabilities (on/off toggle, animation signal, breathing period
//! control) are default methods that report "not supported", so a plain tone
//! implements only the required lifecycle and gain methods.

mod headless;
mod registry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

pub use headless::{HeadlessOutput, HeadlessVoice};
pub use registry::{FnVoiceFactory, VoiceFactory, VoiceRegistry};

/// The closed set of voice kinds a preset may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoiceKind {
    /// Single oscillator
    #[serde(alias = "Oscillator")]
    Tone,
    /// Oscillator frequency-modulated by the breathing cycle
    #[serde(alias = "Martigli")]
    BreathingTone,
    /// Left/right oscillator pair at slightly different frequencies
    #[serde(alias = "Binaural")]
    BinauralBeat,
    /// Binaural pair modulated by the breathing cycle
    #[serde(alias = "Martigli-Binaural")]
    BreathingBinauralBeat,
    /// Permuted note sequence across octaves
    #[serde(alias = "Symmetry")]
    NoteSequence,
    /// White, pink or brown noise
    #[serde(alias = "Noise")]
    NoiseGenerator,
}

impl VoiceKind {
    pub const ALL: [VoiceKind; 6] = [
        VoiceKind::Tone,
        VoiceKind::BreathingTone,
        VoiceKind::BinauralBeat,
        VoiceKind::BreathingBinauralBeat,
        VoiceKind::NoteSequence,
        VoiceKind::NoiseGenerator,
    ];

    /// Resolve a preset `type` tag, including the legacy vocabulary
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "Tone" | "Oscillator" => Some(VoiceKind::Tone),
            "BreathingTone" | "Martigli" => Some(VoiceKind::BreathingTone),
            "BinauralBeat" | "Binaural" => Some(VoiceKind::BinauralBeat),
            "BreathingBinauralBeat" | "Martigli-Binaural" => {
                Some(VoiceKind::BreathingBinauralBeat)
            }
            "NoteSequence" | "Symmetry" => Some(VoiceKind::NoteSequence),
            "NoiseGenerator" | "Noise" => Some(VoiceKind::NoiseGenerator),
            _ => None,
        }
    }

    /// Canonical tag
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceKind::Tone => "Tone",
            VoiceKind::BreathingTone => "BreathingTone",
            VoiceKind::BinauralBeat => "BinauralBeat",
            VoiceKind::BreathingBinauralBeat => "BreathingBinauralBeat",
            VoiceKind::NoteSequence => "NoteSequence",
            VoiceKind::NoiseGenerator => "NoiseGenerator",
        }
    }

    /// Whether voices of this kind carry breathing period parameters
    pub fn is_breathing(&self) -> bool {
        matches!(
            self,
            VoiceKind::BreathingTone | VoiceKind::BreathingBinauralBeat
        )
    }
}

impl fmt::Display for VoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        VoiceKind::from_type_tag(s).ok_or_else(|| SessionError::UnknownVoiceType {
            voice_type: s.to_string(),
        })
    }
}

/// The shared audio output every voice is connected to
pub trait AudioOutput {
    /// Bring the output to the running state; voices are only built after this succeeds
    fn resume(&mut self) -> Result<()>;

    /// Suspend the output
    fn suspend(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;
}

/// Breathing period control exposed by breathing-capable voices
///
/// `mp0` is the base period and `mp1` the target period, both in seconds.
/// The voice moves its audible cycle from one to the other on its own.
pub trait Breathing {
    fn mp0(&self) -> f64;
    fn set_mp0(&mut self, seconds: f64);

    fn mp1(&self) -> f64;
    fn set_mp1(&mut self, seconds: f64);

    fn inhale_dur(&self) -> f64;
    fn set_inhale_dur(&mut self, seconds: f64);

    fn exhale_dur(&self) -> f64;
    fn set_exhale_dur(&mut self, seconds: f64);

    /// Period the voice is currently breathing at
    fn current_period(&self) -> f64;
}

/// Capability surface of one live voice
pub trait VoiceNode {
    fn kind(&self) -> VoiceKind;

    /// Link the voice into the shared output
    fn connect(&mut self, output: &dyn AudioOutput) -> Result<()>;

    /// Unlink the voice; fails with `AlreadyDisconnected` when not linked
    fn disconnect(&mut self) -> Result<()>;

    fn start(&mut self);

    /// Begin the voice's own fade-out
    fn stop(&mut self);

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    /// Set the effective linear gain
    fn set_volume(&mut self, gain: f32);

    fn volume(&self) -> f32;

    /// Whether the voice has a master on/off toggle
    fn has_on_toggle(&self) -> bool {
        false
    }

    fn set_on(&mut self, _on: bool) {}

    /// Phase within the inhale/exhale cycle in `[0, 1]`, if the voice publishes one
    fn animation_value(&self) -> Option<f32> {
        None
    }

    fn breathing(&self) -> Option<&dyn Breathing> {
        None
    }

    fn breathing_mut(&mut self) -> Option<&mut dyn Breathing> {
        None
    }
}
