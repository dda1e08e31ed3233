//! Typed voice parameters
//!
//! Each voice kind has its own parameter struct whose `Default` impl is the
//! kind's default table. Preset fields override the defaults one by one
//! through serde; unknown fields are ignored.

use std::convert::TryFrom;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SessionError};
use crate::voice::VoiceKind;

// ============================================================================
// Enumerated fields
// ============================================================================

/// Oscillator waveform (preset value 0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl TryFrom<u8> for Waveform {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Waveform::Sine),
            1 => Ok(Waveform::Triangle),
            2 => Ok(Waveform::Square),
            3 => Ok(Waveform::Sawtooth),
            other => Err(format!("unknown waveform {}", other)),
        }
    }
}

impl From<Waveform> for u8 {
    fn from(waveform: Waveform) -> u8 {
        waveform as u8
    }
}

/// Noise spectrum (preset value 0-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NoiseColor {
    #[default]
    White,
    Pink,
    Brown,
}

impl TryFrom<u8> for NoiseColor {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(NoiseColor::White),
            1 => Ok(NoiseColor::Pink),
            2 => Ok(NoiseColor::Brown),
            other => Err(format!("unknown noise color {}", other)),
        }
    }
}

impl From<NoiseColor> for u8 {
    fn from(color: NoiseColor) -> u8 {
        color as u8
    }
}

/// Stereo panning mode of binaural voices (preset value 0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PanMode {
    /// Fixed stereo image
    #[default]
    Static,
    /// Slow left/right envelope with `panTrans` second transitions
    Envelope,
    /// Free-running sine of period `panPeriod`
    Sine,
    /// Follows the breathing cycle
    Breath,
}

impl TryFrom<u8> for PanMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(PanMode::Static),
            1 => Ok(PanMode::Envelope),
            2 => Ok(PanMode::Sine),
            3 => Ok(PanMode::Breath),
            other => Err(format!("unknown pan mode {}", other)),
        }
    }
}

impl From<PanMode> for u8 {
    fn from(mode: PanMode) -> u8 {
        mode as u8
    }
}

// ============================================================================
// Per-kind parameter structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToneParams {
    #[serde(alias = "frequency")]
    pub f: f64,
    pub waveform: Waveform,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            f: 200.0,
            waveform: Waveform::Sine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreathingToneParams {
    #[serde(alias = "mf0")]
    pub f: f64,
    #[serde(alias = "waveformM")]
    pub waveform: Waveform,
    /// Modulation depth in Hz
    pub ma: f64,
    pub mp0: f64,
    pub mp1: f64,
    /// Seconds to move from `mp0` to `mp1`
    pub md: f64,
    pub inhale_dur: f64,
    pub exhale_dur: f64,
}

impl Default for BreathingToneParams {
    fn default() -> Self {
        Self {
            f: 200.0,
            waveform: Waveform::Sine,
            ma: 0.5,
            mp0: 10.0,
            mp1: 20.0,
            md: 600.0,
            inhale_dur: 4.0,
            exhale_dur: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BinauralBeatParams {
    pub fl: f64,
    pub fr: f64,
    pub waveform_l: Waveform,
    pub waveform_r: Waveform,
    pub pan_osc: PanMode,
    #[serde(alias = "panOscPeriod")]
    pub pan_period: f64,
    #[serde(alias = "panOscTrans")]
    pub pan_trans: f64,
}

impl Default for BinauralBeatParams {
    fn default() -> Self {
        Self {
            fl: 200.0,
            fr: 210.0,
            waveform_l: Waveform::Sine,
            waveform_r: Waveform::Sine,
            pan_osc: PanMode::Static,
            pan_period: 5.0,
            pan_trans: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreathingBinauralBeatParams {
    pub fl: f64,
    pub fr: f64,
    pub waveform_l: Waveform,
    pub waveform_r: Waveform,
    pub ma: f64,
    pub mp0: f64,
    pub mp1: f64,
    pub md: f64,
    pub inhale_dur: f64,
    pub exhale_dur: f64,
    pub pan_osc: PanMode,
    #[serde(alias = "panOscPeriod")]
    pub pan_period: f64,
    #[serde(alias = "panOscTrans")]
    pub pan_trans: f64,
}

impl Default for BreathingBinauralBeatParams {
    fn default() -> Self {
        Self {
            fl: 200.0,
            fr: 210.0,
            waveform_l: Waveform::Sine,
            waveform_r: Waveform::Sine,
            ma: 0.5,
            mp0: 10.0,
            mp1: 20.0,
            md: 10.0,
            inhale_dur: 4.0,
            exhale_dur: 6.0,
            pan_osc: PanMode::Static,
            pan_period: 5.0,
            pan_trans: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoteSequenceParams {
    /// Lowest note in Hz
    pub f0: f64,
    pub noctaves: u32,
    pub nnotes: u32,
    /// Sequence duration in seconds
    pub d: f64,
    pub waveform: Waveform,
    /// Permutation function id
    pub permfunc: u32,
}

impl Default for NoteSequenceParams {
    fn default() -> Self {
        Self {
            f0: 200.0,
            noctaves: 2,
            nnotes: 2,
            d: 1.0,
            waveform: Waveform::Sine,
            permfunc: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoiseGeneratorParams {
    pub noise_color: NoiseColor,
}

// ============================================================================
// Resolved parameters
// ============================================================================

/// Fully resolved parameters for one voice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum VoiceParams {
    Tone(ToneParams),
    BreathingTone(BreathingToneParams),
    BinauralBeat(BinauralBeatParams),
    BreathingBinauralBeat(BreathingBinauralBeatParams),
    NoteSequence(NoteSequenceParams),
    NoiseGenerator(NoiseGeneratorParams),
}

impl VoiceParams {
    /// The default table for `kind`
    pub fn defaults(kind: VoiceKind) -> Self {
        match kind {
            VoiceKind::Tone => VoiceParams::Tone(ToneParams::default()),
            VoiceKind::BreathingTone => VoiceParams::BreathingTone(BreathingToneParams::default()),
            VoiceKind::BinauralBeat => VoiceParams::BinauralBeat(BinauralBeatParams::default()),
            VoiceKind::BreathingBinauralBeat => {
                VoiceParams::BreathingBinauralBeat(BreathingBinauralBeatParams::default())
            }
            VoiceKind::NoteSequence => VoiceParams::NoteSequence(NoteSequenceParams::default()),
            VoiceKind::NoiseGenerator => {
                VoiceParams::NoiseGenerator(NoiseGeneratorParams::default())
            }
        }
    }

    /// Apply preset `fields` over the default table for `kind`
    ///
    /// `null` fields count as absent.
    pub fn resolve(kind: VoiceKind, fields: &Map<String, Value>) -> Result<Self> {
        let present: Map<String, Value> = fields
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let params = match kind {
            VoiceKind::Tone => VoiceParams::Tone(parse(kind, present)?),
            VoiceKind::BreathingTone => VoiceParams::BreathingTone(parse(kind, present)?),
            VoiceKind::BinauralBeat => VoiceParams::BinauralBeat(parse(kind, present)?),
            VoiceKind::BreathingBinauralBeat => {
                VoiceParams::BreathingBinauralBeat(parse(kind, present)?)
            }
            VoiceKind::NoteSequence => VoiceParams::NoteSequence(parse(kind, present)?),
            VoiceKind::NoiseGenerator => VoiceParams::NoiseGenerator(parse(kind, present)?),
        };
        Ok(params)
    }

    pub fn kind(&self) -> VoiceKind {
        match self {
            VoiceParams::Tone(_) => VoiceKind::Tone,
            VoiceParams::BreathingTone(_) => VoiceKind::BreathingTone,
            VoiceParams::BinauralBeat(_) => VoiceKind::BinauralBeat,
            VoiceParams::BreathingBinauralBeat(_) => VoiceKind::BreathingBinauralBeat,
            VoiceParams::NoteSequence(_) => VoiceKind::NoteSequence,
            VoiceParams::NoiseGenerator(_) => VoiceKind::NoiseGenerator,
        }
    }

    /// Breathing fields `(mp0, mp1, md, inhale_dur, exhale_dur)` of breathing kinds
    pub fn breathing(&self) -> Option<BreathingFields> {
        match self {
            VoiceParams::BreathingTone(p) => Some(BreathingFields {
                mp0: p.mp0,
                mp1: p.mp1,
                md: p.md,
                inhale_dur: p.inhale_dur,
                exhale_dur: p.exhale_dur,
            }),
            VoiceParams::BreathingBinauralBeat(p) => Some(BreathingFields {
                mp0: p.mp0,
                mp1: p.mp1,
                md: p.md,
                inhale_dur: p.inhale_dur,
                exhale_dur: p.exhale_dur,
            }),
            _ => None,
        }
    }

    /// Raise breathing periods to at least `min_period` seconds
    pub fn clamp_breathing_periods(&mut self, min_period: f64) {
        match self {
            VoiceParams::BreathingTone(p) => {
                p.mp0 = p.mp0.max(min_period);
                p.mp1 = p.mp1.max(min_period);
            }
            VoiceParams::BreathingBinauralBeat(p) => {
                p.mp0 = p.mp0.max(min_period);
                p.mp1 = p.mp1.max(min_period);
            }
            _ => {}
        }
    }
}

/// Breathing cycle settings shared by the breathing kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathingFields {
    pub mp0: f64,
    pub mp1: f64,
    pub md: f64,
    pub inhale_dur: f64,
    pub exhale_dur: f64,
}

fn parse<T: DeserializeOwned>(kind: VoiceKind, fields: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|source| {
        SessionError::InvalidVoiceParams {
            voice_type: kind.to_string(),
            source,
        }
    })
}
