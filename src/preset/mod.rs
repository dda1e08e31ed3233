//! Preset model
//!
//! A preset is the declarative description of one session: a header carrying
//! the duration and an ordered list of voice descriptors. Presets are parsed
//! once and never mutated by the engine.
//!
//! The JSON layout follows the established preset files:
//!
//! ```json
//! { "header": { "d": 900, "med2": "Meditazione" },
//!   "voices": [ { "type": "Martigli-Binaural", "mp0": 10, "mp1": 20, "iniVolume": null } ] }
//! ```

mod params;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SessionError};
use crate::voice::VoiceKind;

pub use params::{
    BinauralBeatParams, BreathingBinauralBeatParams, BreathingFields, BreathingToneParams,
    NoiseColor, NoiseGeneratorParams, NoteSequenceParams, PanMode, ToneParams, VoiceParams,
    Waveform,
};

/// Session header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetHeader {
    /// Session duration in seconds
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Display name
    #[serde(rename = "med2", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One voice entry of a preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Voice type tag, kept verbatim so unknown kinds can be skipped at build time
    #[serde(rename = "type")]
    pub voice_type: String,

    /// Linear starting gain; absent or null means "use the kind default"
    #[serde(
        rename = "iniVolume",
        alias = "initialVolume",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_volume: Option<f32>,

    /// Type-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VoiceDescriptor {
    /// Descriptor with no overrides
    pub fn new(kind: VoiceKind) -> Self {
        Self {
            voice_type: kind.as_str().to_string(),
            initial_volume: None,
            fields: Map::new(),
        }
    }

    /// Set a type-specific field
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.initial_volume = Some(volume);
        self
    }

    /// The voice kind, or `None` for an unrecognised tag
    pub fn kind(&self) -> Option<VoiceKind> {
        VoiceKind::from_type_tag(&self.voice_type)
    }

    /// Resolve typed parameters: kind defaults first, then this descriptor's fields
    pub fn params(&self) -> Result<VoiceParams> {
        let kind = self.kind().ok_or_else(|| SessionError::UnknownVoiceType {
            voice_type: self.voice_type.clone(),
        })?;
        VoiceParams::resolve(kind, &self.fields)
    }
}

/// Declarative description of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub header: PresetHeader,

    #[serde(default)]
    pub voices: Vec<VoiceDescriptor>,
}

impl Preset {
    /// Build a preset in code
    pub fn new(duration_secs: f64, voices: Vec<VoiceDescriptor>) -> Self {
        Self {
            id: None,
            header: PresetHeader {
                duration: Some(duration_secs),
                name: None,
            },
            voices,
        }
    }

    /// Parse and validate a single preset
    pub fn from_json_str(json: &str) -> Result<Self> {
        let preset: Self = serde_json::from_str(json)?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check the header; voice entries are checked when the session is built
    pub fn validate(&self) -> Result<()> {
        match self.header.duration {
            Some(d) if !(d.is_finite() && d > 0.0) => Err(SessionError::InvalidPreset {
                reason: format!("duration must be a positive number of seconds, got {}", d),
            }),
            _ => Ok(()),
        }
    }

    /// Session duration, or `default_secs` when the header has none
    pub fn duration_or(&self, default_secs: f64) -> f64 {
        match self.header.duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => default_secs,
        }
    }

    /// Display name from the header, falling back to the id
    pub fn name(&self) -> Option<&str> {
        self.header.name.as_deref().or(self.id.as_deref())
    }
}

/// A collection of presets, as shipped in preset library files
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Parse either a JSON array of presets or a single preset object
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let presets = match value {
            Value::Array(_) => serde_json::from_value::<Vec<Preset>>(value)?,
            Value::Object(_) => vec![serde_json::from_value::<Preset>(value)?],
            _ => {
                return Err(SessionError::InvalidPreset {
                    reason: "expected a preset object or an array of presets".to_string(),
                })
            }
        };
        for preset in &presets {
            preset.validate()?;
        }
        Ok(Self { presets })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Find a preset by display name or id (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| {
            preset
                .header
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
                || preset
                    .id
                    .as_deref()
                    .is_some_and(|id| id.eq_ignore_ascii_case(name))
        })
    }

    pub fn first(&self) -> Option<&Preset> {
        self.presets.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
