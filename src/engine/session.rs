//! Session engine
//!
//! Owns one session at a time: the loaded preset, the live voices, the
//! progress timer and the scheduled tasks that keep them moving.
//!
//! ```text
//!            start            pause
//!   Idle ───────────▶ Playing ◀──────▶ Paused
//!    ▲                   │    resume/start │
//!    │                   │ stop            │ stop
//!    │   grace delay     ▼                 │
//!    └────────────── Stopped ◀─────────────┘
//! ```
//!
//! Operations that do not match the current state are logged no-ops. The
//! observer hears about each real transition exactly once, before the
//! causing method returns.

use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};
use uuid::Uuid;

use super::animation::AnimationBridge;
use super::breathing::{BreathingParams, PaceController, PaceDirection};
use super::builder::{LiveVoice, VoiceGraphBuilder, VoiceSummary};
use super::mixer::{clamp_gain, VolumeMixer};
use super::observer::SessionObserver;
use super::scheduler::{TaskId, TaskKind, TaskScheduler};
use super::state::SessionState;
use super::timer::ProgressTimer;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::preset::Preset;
use crate::voice::{AudioOutput, HeadlessOutput, VoiceNode, VoiceRegistry};

pub struct SessionEngine {
    config: EngineConfig,
    clock: Rc<dyn Clock>,
    output: Box<dyn AudioOutput>,
    registry: VoiceRegistry,
    observer: Option<Box<dyn SessionObserver>>,

    state: SessionState,
    preset: Option<Preset>,
    voices: Vec<LiveVoice>,
    session_id: Option<Uuid>,

    mixer: VolumeMixer,
    timer: ProgressTimer,
    animation: AnimationBridge,
    pace: PaceController,

    scheduler: TaskScheduler,
    tick_task: Option<TaskId>,
    animation_task: Option<TaskId>,
    teardown_task: Option<TaskId>,
}

impl SessionEngine {
    /// Create an idle engine
    ///
    /// A config that fails [`EngineConfig::validate`] is replaced by the
    /// defaults with a warning.
    pub fn new(
        config: EngineConfig,
        clock: Rc<dyn Clock>,
        output: Box<dyn AudioOutput>,
        registry: VoiceRegistry,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("[SESSION] {}; falling back to default configuration", e);
                EngineConfig::default()
            }
        };
        let mixer = VolumeMixer::new(config.master_volume);
        let timer = ProgressTimer::new(config.default_duration_secs);
        let pace = PaceController::from_config(&config);
        Self {
            config,
            clock,
            output,
            registry,
            observer: None,
            state: SessionState::Idle,
            preset: None,
            voices: Vec::new(),
            session_id: None,
            mixer,
            timer,
            animation: AnimationBridge::new(),
            pace,
            scheduler: TaskScheduler::new(),
            tick_task: None,
            animation_task: None,
            teardown_task: None,
        }
    }

    /// Engine with headless voices for every kind and a headless output
    pub fn headless(config: EngineConfig, clock: Rc<dyn Clock>) -> Self {
        let registry = VoiceRegistry::headless(Rc::clone(&clock));
        Self::new(config, clock, Box::new(HeadlessOutput::new()), registry)
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Store a preset for the next session. Only legal while idle.
    pub fn load_preset(&mut self, preset: Preset) {
        if self.state != SessionState::Idle {
            warn!(
                "[SESSION] load_preset ignored: session is {}, must be idle",
                self.state
            );
            return;
        }

        let duration = preset.duration_or(self.config.default_duration_secs);
        self.timer.set_duration(duration);
        info!(
            "[SESSION] Loaded preset '{}' ({} voices, {:.0}s)",
            preset.name().unwrap_or("unnamed"),
            preset.voices.len(),
            duration
        );
        self.preset = Some(preset);
    }

    /// Build the voice graph and start playing. From `Paused` this resumes.
    pub fn start(&mut self) {
        match self.state {
            SessionState::Idle => {}
            SessionState::Paused => {
                self.resume();
                return;
            }
            SessionState::Playing => {
                warn!("[SESSION] start ignored: already playing");
                return;
            }
            SessionState::Stopped => {
                warn!("[SESSION] start ignored: previous session is still tearing down");
                return;
            }
        }

        let Some(preset) = self.preset.as_ref() else {
            warn!("[SESSION] start ignored: no preset loaded");
            return;
        };

        if let Err(e) = self.output.resume() {
            warn!("[SESSION] start aborted: {}", e);
            return;
        }

        self.voices =
            VoiceGraphBuilder::new(&self.registry, &self.config).build(preset, self.output.as_ref());
        for voice in self.voices.iter_mut() {
            voice.node.start();
            if voice.node.has_on_toggle() {
                voice.node.set_on(true);
            }
        }
        self.mixer.apply(&mut self.voices);

        let now = self.clock.now();
        self.timer.begin(now);
        self.animation.reset();
        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.schedule_playback(now);

        info!(
            "[SESSION] Session {} started with {} voices for {:.0}s",
            session_id,
            self.voices.len(),
            self.timer.duration()
        );
        self.set_state(SessionState::Playing);
    }

    pub fn pause(&mut self) {
        if self.state != SessionState::Playing {
            warn!("[SESSION] pause ignored: session is {}", self.state);
            return;
        }

        let now = self.clock.now();
        self.cancel_playback();
        for voice in self.voices.iter_mut() {
            voice.node.pause();
        }
        self.timer.suspend(now);
        debug!("[SESSION] Paused at {:.3}s", self.timer.elapsed(now));
        self.set_state(SessionState::Paused);
    }

    pub fn resume(&mut self) {
        if self.state != SessionState::Paused {
            warn!("[SESSION] resume ignored: session is {}", self.state);
            return;
        }

        let now = self.clock.now();
        for voice in self.voices.iter_mut() {
            voice.node.resume();
        }
        self.timer.resume(now);
        self.schedule_playback(now);
        debug!("[SESSION] Resumed at {:.3}s", self.timer.elapsed(now));
        self.set_state(SessionState::Playing);
    }

    /// Fade every voice out and schedule teardown after the grace delay
    pub fn stop(&mut self) {
        if !self.state.can_stop() {
            warn!("[SESSION] stop ignored: session is {}", self.state);
            return;
        }

        let now = self.clock.now();
        self.timer.suspend(now);
        self.cancel_playback();
        for voice in self.voices.iter_mut() {
            if voice.node.has_on_toggle() {
                voice.node.set_on(false);
            }
            voice.node.stop();
        }

        let grace = self.config.grace_delay();
        self.teardown_task = Some(
            self.scheduler
                .schedule_once(TaskKind::Teardown, grace, now),
        );
        info!(
            "[TEARDOWN] Stopping at {:.3}s, cleanup in {}ms",
            self.timer.elapsed(now),
            grace.as_millis()
        );
        self.set_state(SessionState::Stopped);
    }

    /// Run every task due at the current time; returns how many ran
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some((id, kind)) = self.scheduler.pop_due(now) {
            ran += 1;
            match kind {
                TaskKind::ProgressTick => self.on_progress_tick(),
                TaskKind::AnimationPoll => self.on_animation_poll(),
                TaskKind::Teardown => {
                    if self.teardown_task == Some(id) {
                        self.teardown_task = None;
                        self.cleanup();
                    }
                }
            }
        }
        ran
    }

    /// Time the next scheduled task comes due
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Stop, tear down at once and release the shared output
    pub fn destroy(mut self) {
        if self.state.can_stop() {
            self.stop();
        }
        if let Some(id) = self.teardown_task.take() {
            self.scheduler.cancel(id);
            self.cleanup();
        }
        if let Err(e) = self.output.suspend() {
            warn!("[TEARDOWN] Output suspend failed: {}", e);
        }
        info!("[TEARDOWN] Engine destroyed");
    }

    // ========================================================================
    // Mixing
    // ========================================================================

    pub fn set_master_volume(&mut self, volume: f32) {
        let master = self.mixer.set_master(volume);
        self.mixer.apply(&mut self.voices);
        debug!("[MIXER] Master volume {:.3}", master);
    }

    pub fn master_volume(&self) -> f32 {
        self.mixer.master()
    }

    pub fn set_voice_volume(&mut self, index: usize, volume: f32) {
        let Some(voice) = self.voices.get_mut(index) else {
            warn!(
                "[MIXER] set_voice_volume ignored: no voice at index {} ({} live)",
                index,
                self.voices.len()
            );
            return;
        };

        voice.volume = clamp_gain(volume);
        voice.node.set_volume(self.mixer.effective(voice.volume));
        debug!(
            "[MIXER] Voice {} ({}) volume {:.3}",
            index, voice.kind, voice.volume
        );
    }

    // ========================================================================
    // Breathing
    // ========================================================================

    /// Snapshot of voice `index`'s breathing parameters, if it breathes
    pub fn breathing_params(&self, index: usize) -> Option<BreathingParams> {
        self.voices
            .get(index)?
            .node
            .breathing()
            .map(BreathingParams::read)
    }

    /// Rescale voice `index`'s breathing periods; returns the new `(mp0, mp1)`
    pub fn adjust_breathing_pace(
        &mut self,
        index: usize,
        direction: PaceDirection,
    ) -> Option<(f64, f64)> {
        let Some(breathing) = self
            .voices
            .get_mut(index)
            .and_then(|voice| voice.node.breathing_mut())
        else {
            warn!(
                "[PACE] adjust ignored: voice {} missing or not breathing-capable",
                index
            );
            return None;
        };

        let (mp0, mp1) = self.pace.adjust(breathing, direction);
        info!(
            "[PACE] Voice {} {}: mp0 {:.3}s, mp1 {:.3}s",
            index, direction, mp0, mp1
        );
        Some((mp0, mp1))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Seconds elapsed in the current session; 0 when idle
    pub fn elapsed_time(&self) -> f64 {
        if self.state == SessionState::Idle {
            return 0.0;
        }
        self.timer.elapsed(self.clock.now())
    }

    pub fn remaining_time(&self) -> f64 {
        self.timer.duration() - self.elapsed_time()
    }

    pub fn duration(&self) -> f64 {
        self.timer.duration()
    }

    pub fn voices(&self) -> Vec<VoiceSummary> {
        self.voices
            .iter()
            .enumerate()
            .map(|(index, voice)| VoiceSummary {
                index,
                kind: voice.kind,
                volume: voice.volume,
            })
            .collect()
    }

    pub fn voice_node(&self, index: usize) -> Option<&dyn VoiceNode> {
        self.voices.get(index).map(|voice| voice.node.as_ref())
    }

    /// Last breathing animation value published
    pub fn animation_value(&self) -> f32 {
        self.animation.value()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn preset(&self) -> Option<&Preset> {
        self.preset.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn set_state(&mut self, next: SessionState) {
        if next == self.state {
            return;
        }
        info!("[SESSION] {} -> {}", self.state, next);
        self.state = next;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_state_change(next);
        }
    }

    fn schedule_playback(&mut self, now: Duration) {
        self.cancel_playback();
        self.tick_task = Some(self.scheduler.schedule_repeating(
            TaskKind::ProgressTick,
            self.config.tick_interval(),
            now,
        ));
        self.animation_task = Some(self.scheduler.schedule_repeating(
            TaskKind::AnimationPoll,
            self.config.animation_interval(),
            now,
        ));
    }

    fn cancel_playback(&mut self) {
        if let Some(id) = self.tick_task.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.animation_task.take() {
            self.scheduler.cancel(id);
        }
    }

    fn on_progress_tick(&mut self) {
        let now = self.clock.now();
        let duration = self.timer.duration();
        let elapsed = self.timer.elapsed(now);
        let remaining = self.timer.remaining(now);

        if let Some(observer) = self.observer.as_mut() {
            observer.on_timer_update(elapsed, remaining, duration);
        }

        if remaining <= 0.0 {
            info!("[SESSION] Duration of {:.0}s reached", duration);
            self.stop();
        }
    }

    fn on_animation_poll(&mut self) {
        if let Some(value) = self.animation.poll(&self.voices) {
            if let Some(observer) = self.observer.as_mut() {
                observer.on_animation_update(value);
            }
        }
    }

    fn cleanup(&mut self) {
        for (index, mut voice) in self.voices.drain(..).enumerate() {
            if let Err(e) = voice.node.disconnect() {
                debug!("[TEARDOWN] Voice {} ({}) disconnect: {}", index, voice.kind, e);
            }
        }
        self.preset = None;
        self.timer.reset();
        self.animation.reset();
        if let Some(id) = self.session_id.take() {
            info!("[TEARDOWN] Session {} cleaned up", id);
        }
        self.set_state(SessionState::Idle);
    }
}
