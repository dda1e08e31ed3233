//! Preset and Configuration Tests
//!
//! Parsing of the bundled preset library, legacy vocabulary and config files.

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use test_case::test_case;

use breathwork::preset::{NoiseColor, PanMode};
use breathwork::{
    EngineConfig, Preset, PresetLibrary, SessionError, VoiceDescriptor, VoiceKind, VoiceParams,
};

const LIBRARY: &str = include_str!("../presets/library.json");

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// === Bundled library ===

#[test]
fn test_bundled_library_parses() {
    let library = PresetLibrary::from_json_str(LIBRARY).unwrap();
    assert_eq!(library.len(), 5);
    assert_eq!(library.first().unwrap().name(), Some("Quick Calm"));
}

#[test_case("Meditazione", 5 ; "meditation")]
#[test_case("uso ricreativo", 4 ; "case insensitive lookup")]
#[test_case("Dipendenza", 5 ; "legacy martigli voices")]
fn test_bundled_presets_resolve_every_voice(name: &str, voices: usize) {
    let library = PresetLibrary::from_json_str(LIBRARY).unwrap();
    let preset = library.find(name).unwrap();

    assert_eq!(preset.voices.len(), voices);
    assert_eq!(preset.duration_or(1.0), 900.0);
    for descriptor in &preset.voices {
        assert!(descriptor.params().is_ok(), "{} failed", descriptor.voice_type);
    }
}

#[test]
fn test_library_file_round_trip_through_disk() {
    let file = write_temp(LIBRARY);
    let library = PresetLibrary::from_json_file(file.path()).unwrap();
    assert!(library.find("Rilassamento").is_some());
    assert!(library.find("Nonexistent").is_none());
}

// === Legacy vocabulary ===

#[test_case("Martigli", VoiceKind::BreathingTone)]
#[test_case("Martigli-Binaural", VoiceKind::BreathingBinauralBeat)]
#[test_case("Binaural", VoiceKind::BinauralBeat)]
#[test_case("Symmetry", VoiceKind::NoteSequence)]
#[test_case("Noise", VoiceKind::NoiseGenerator)]
#[test_case("Tone", VoiceKind::Tone)]
fn test_legacy_type_tags(tag: &str, kind: VoiceKind) {
    let descriptor: VoiceDescriptor =
        serde_json::from_str(&format!(r#"{{ "type": "{}" }}"#, tag)).unwrap();
    assert_eq!(descriptor.kind(), Some(kind));
    assert_eq!(descriptor.params().unwrap().kind(), kind);
}

#[test]
fn test_legacy_field_aliases() {
    let descriptor: VoiceDescriptor = serde_json::from_str(
        r#"{ "type": "Martigli", "mf0": 300, "waveformM": 2, "mp0": 12, "isOn": true }"#,
    )
    .unwrap();

    match descriptor.params().unwrap() {
        VoiceParams::BreathingTone(params) => {
            assert_eq!(params.f, 300.0);
            assert_eq!(params.mp0, 12.0);
            assert_eq!(params.mp1, 20.0);
        }
        other => panic!("unexpected params: {:?}", other),
    }

    let descriptor: VoiceDescriptor = serde_json::from_str(
        r#"{ "type": "Binaural", "panOsc": 2, "panOscPeriod": 140, "panOscTrans": 20 }"#,
    )
    .unwrap();

    match descriptor.params().unwrap() {
        VoiceParams::BinauralBeat(params) => {
            assert_eq!(params.pan_osc, PanMode::Sine);
            assert_eq!(params.pan_period, 140.0);
            assert_eq!(params.pan_trans, 20.0);
        }
        other => panic!("unexpected params: {:?}", other),
    }
}

#[test]
fn test_noise_color_from_number() {
    let descriptor: VoiceDescriptor =
        serde_json::from_str(r#"{ "type": "NoiseGenerator", "noiseColor": 2 }"#).unwrap();
    match descriptor.params().unwrap() {
        VoiceParams::NoiseGenerator(params) => assert_eq!(params.noise_color, NoiseColor::Brown),
        other => panic!("unexpected params: {:?}", other),
    }
}

// === Validation ===

#[test_case(r#"{ "header": { "d": 0 }, "voices": [] }"# ; "zero duration")]
#[test_case(r#"{ "header": { "d": -30 }, "voices": [] }"# ; "negative duration")]
#[test_case(r#"[1, 2, 3]"# ; "not presets")]
fn test_invalid_presets_rejected(json: &str) {
    assert!(PresetLibrary::from_json_str(json).is_err());
}

#[test]
fn test_missing_header_uses_default_duration() {
    let preset = Preset::from_json_str(r#"{ "voices": [ { "type": "Tone" } ] }"#).unwrap();
    assert_eq!(preset.header.duration, None);
    assert_eq!(preset.duration_or(900.0), 900.0);
}

#[test]
fn test_bad_field_type_reports_voice_type() {
    let descriptor = VoiceDescriptor::new(VoiceKind::Tone).with_field("f", "loud");
    let err = descriptor.params().unwrap_err();
    assert!(matches!(err, SessionError::InvalidVoiceParams { .. }));
    assert_eq!(err.error_code(), "INVALID_VOICE_PARAMS");
}

// === Engine configuration ===

#[test]
fn test_config_file_overrides_defaults() {
    let file = write_temp(r#"{ "master_volume": 0.6, "grace_delay_ms": 500 }"#);
    let config = EngineConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config.master_volume, 0.6);
    assert_eq!(config.grace_delay_ms, 500);
    assert_eq!(config.tick_interval_ms, 100);
    assert_eq!(config.default_volume(VoiceKind::NoiseGenerator), 0.08);
}

#[test_case(r#"{ "master_volume": 1.5 }"# ; "master out of range")]
#[test_case(r#"{ "tick_interval_ms": 0 }"# ; "zero tick")]
#[test_case(r#"{ "faster_pace_factor": -0.85 }"# ; "negative factor")]
fn test_invalid_config_rejected(json: &str) {
    let file = write_temp(json);
    let err = EngineConfig::from_json_file(file.path()).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}
