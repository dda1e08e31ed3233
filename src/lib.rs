//! Breathwork - Breathing Session Orchestration Engine
//!
//! Breathwork drives timed, multi-voice ambient audio sessions built from a
//! declarative preset: a duration plus an ordered list of voices (tones,
//! binaural beats, note sequences, noise and their breathing-modulated
//! variants).
//!
//! # Architecture
//!
//! - `preset`: immutable session description and typed per-kind voice parameters
//! - `voice`: the capability surface voices expose, the factory registry, and
//!   headless control-rate voices for simulation
//! - `engine`: the session state machine, progress timer, volume mixer,
//!   animation bridge, breathing pace controller and teardown sequencing
//!
//! The engine is single-threaded and cooperative: recurring work is held as
//! scheduled tasks and executed whenever the host calls
//! [`SessionEngine::poll`].

pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod preset;
pub mod voice;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{
    BreathingParams, EventRecorder, PaceDirection, SessionEngine, SessionEvent, SessionObserver,
    SessionState, VoiceSummary,
};
pub use error::{Result, SessionError};
pub use preset::{Preset, PresetLibrary, VoiceDescriptor, VoiceParams};
pub use voice::{AudioOutput, Breathing, VoiceKind, VoiceNode, VoiceRegistry};
