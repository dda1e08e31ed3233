//! Session Engine Module
//!
//! Orchestration of one breathing session:
//! - Voice graph building from a preset
//! - Session state machine and teardown sequencing
//! - Progress timer, volume mixer and animation bridge
//! - Breathing pace control
//! - Engine-owned scheduled tasks and the optional real-time driver

pub mod animation;
pub mod breathing;
pub mod builder;
#[cfg(feature = "realtime")]
pub mod driver;
pub mod mixer;
pub mod observer;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod timer;

pub use animation::AnimationBridge;
pub use breathing::{BreathingParams, PaceController, PaceDirection};
pub use builder::{LiveVoice, VoiceGraphBuilder, VoiceSummary};
#[cfg(feature = "realtime")]
pub use driver::{run_until_idle, run_until_idle_or_interrupt, TokioClock};
pub use mixer::{clamp_gain, VolumeMixer};
pub use observer::{EventRecorder, SessionEvent, SessionObserver};
pub use scheduler::{TaskId, TaskKind, TaskScheduler};
pub use session::SessionEngine;
pub use state::SessionState;
pub use timer::ProgressTimer;
