//! Headless voices
//!
//! Control-rate stand-ins for real synthesis voices. They keep the state a
//! sound-producing voice would (gain, fade envelope, breathing cycle) and
//! advance it against a [`Clock`] instead of an audio callback, which makes
//! sessions observable in simulation and tests.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use super::{AudioOutput, Breathing, VoiceKind, VoiceNode};
use crate::clock::Clock;
use crate::error::{Result, SessionError};
use crate::preset::{BreathingFields, VoiceParams};

const FADE_IN_SECS: f64 = 1.0;
const PAUSE_FADE_SECS: f64 = 0.5;
const STOP_FADE_SECS: f64 = 1.0;

// ============================================================================
// Output
// ============================================================================

/// Output that only tracks whether it is running
#[derive(Debug, Clone, Default)]
pub struct HeadlessOutput {
    running: bool,
    unavailable: bool,
}

impl HeadlessOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// An output whose resume always fails
    pub fn unavailable() -> Self {
        Self {
            running: false,
            unavailable: true,
        }
    }
}

impl AudioOutput for HeadlessOutput {
    fn resume(&mut self) -> Result<()> {
        if self.unavailable {
            return Err(SessionError::OutputUnavailable {
                reason: "headless output is marked unavailable".to_string(),
            });
        }
        self.running = true;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

// ============================================================================
// Fade envelope
// ============================================================================

/// Linear gain ramp between two levels
#[derive(Debug, Clone, Copy)]
struct GainRamp {
    from: f64,
    to: f64,
    started_at: Duration,
    seconds: f64,
}

impl GainRamp {
    fn silent() -> Self {
        Self {
            from: 0.0,
            to: 0.0,
            started_at: Duration::ZERO,
            seconds: 0.0,
        }
    }

    fn level(&self, now: Duration) -> f64 {
        if self.seconds <= 0.0 {
            return self.to;
        }
        let t = (now.saturating_sub(self.started_at).as_secs_f64() / self.seconds).min(1.0);
        self.from + (self.to - self.from) * t
    }

    /// Start a new ramp from wherever the current one is
    fn retarget(&mut self, now: Duration, to: f64, seconds: f64) {
        *self = Self {
            from: self.level(now),
            to,
            started_at: now,
            seconds,
        };
    }
}

// ============================================================================
// Breathing cycle
// ============================================================================

/// Inhale/exhale oscillator whose period ramps from `mp0` to `mp1` over `md`
/// seconds. Inhale and exhale durations are locked at the start of every
/// cycle so a period change never tears a breath in half.
#[derive(Debug, Clone)]
struct BreathingCycle {
    mp0: f64,
    mp1: f64,
    md: f64,
    inhale_dur: f64,
    exhale_dur: f64,

    ramp_elapsed: f64,
    phase_time: f64,
    cycle_inhale: f64,
    cycle_exhale: f64,
    current_period: f64,
    animation: f64,
    paused: bool,
    last_sync: Option<Duration>,
}

impl BreathingCycle {
    fn new(fields: BreathingFields) -> Self {
        let mut cycle = Self {
            mp0: fields.mp0,
            mp1: fields.mp1,
            md: fields.md,
            inhale_dur: fields.inhale_dur,
            exhale_dur: fields.exhale_dur,
            ramp_elapsed: 0.0,
            phase_time: 0.0,
            cycle_inhale: 0.0,
            cycle_exhale: 0.0,
            current_period: fields.mp0,
            animation: 0.0,
            paused: true,
            last_sync: None,
        };
        cycle.lock_cycle(fields.mp0);
        cycle
    }

    fn begin(&mut self, now: Duration) {
        self.ramp_elapsed = 0.0;
        self.phase_time = 0.0;
        self.current_period = self.mp0;
        self.lock_cycle(self.mp0);
        self.paused = false;
        self.last_sync = Some(now);
        self.update_animation();
    }

    fn set_paused(&mut self, now: Duration, paused: bool) {
        self.advance(now);
        self.paused = paused;
    }

    fn lock_cycle(&mut self, period: f64) {
        if self.inhale_dur > 0.0 && self.exhale_dur > 0.0 {
            let scale = period / (self.inhale_dur + self.exhale_dur);
            self.cycle_inhale = self.inhale_dur * scale;
            self.cycle_exhale = self.exhale_dur * scale;
        } else {
            self.cycle_inhale = period * 0.5;
            self.cycle_exhale = period * 0.5;
        }
    }

    fn period_at(&self, ramp_elapsed: f64) -> f64 {
        if self.md > 0.0 {
            self.mp0 + (self.mp1 - self.mp0) * (ramp_elapsed / self.md).min(1.0)
        } else {
            self.mp1
        }
    }

    fn advance(&mut self, now: Duration) {
        let Some(last) = self.last_sync else {
            return;
        };
        let dt = now.saturating_sub(last).as_secs_f64();
        self.last_sync = Some(now);

        if !self.paused {
            self.ramp_elapsed += dt;
            self.phase_time += dt;
        }
        self.current_period = self.period_at(self.ramp_elapsed);

        loop {
            let total = self.cycle_inhale + self.cycle_exhale;
            if total <= 0.0 || self.phase_time < total {
                break;
            }
            self.phase_time -= total;
            self.lock_cycle(self.current_period);
        }
        self.update_animation();
    }

    fn update_animation(&mut self) {
        let phase = self.phase_time;
        let lfo = if phase < self.cycle_inhale {
            -(PI * phase / self.cycle_inhale).cos()
        } else {
            (PI * (phase - self.cycle_inhale) / self.cycle_exhale).cos()
        };
        self.animation = ((lfo + 1.0) * 0.5).clamp(0.0, 1.0);
    }
}

// ============================================================================
// Voice
// ============================================================================

/// A voice that tracks state without producing audio
pub struct HeadlessVoice {
    params: VoiceParams,
    clock: Rc<dyn Clock>,
    volume: f32,
    on: bool,
    connected: bool,
    envelope: GainRamp,
    cycle: Option<RefCell<BreathingCycle>>,
}

impl HeadlessVoice {
    pub fn new(params: VoiceParams, clock: Rc<dyn Clock>) -> Self {
        let cycle = params
            .breathing()
            .map(|fields| RefCell::new(BreathingCycle::new(fields)));
        Self {
            params,
            clock,
            volume: 0.5,
            on: false,
            connected: false,
            envelope: GainRamp::silent(),
            cycle,
        }
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Fade envelope level in `[0, 1]` at the current time
    pub fn envelope_level(&self) -> f64 {
        self.envelope.level(self.clock.now())
    }

    fn with_cycle<T>(&self, read: impl FnOnce(&mut BreathingCycle) -> T) -> Option<T> {
        self.cycle.as_ref().map(|cycle| {
            let mut cycle = cycle.borrow_mut();
            cycle.advance(self.clock.now());
            read(&mut cycle)
        })
    }
}

impl VoiceNode for HeadlessVoice {
    fn kind(&self) -> VoiceKind {
        self.params.kind()
    }

    fn connect(&mut self, output: &dyn AudioOutput) -> Result<()> {
        if !output.is_running() {
            return Err(SessionError::OutputUnavailable {
                reason: "output is not running".to_string(),
            });
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Err(SessionError::AlreadyDisconnected);
        }
        self.connected = false;
        Ok(())
    }

    fn start(&mut self) {
        let now = self.clock.now();
        self.envelope = GainRamp::silent();
        self.envelope.retarget(now, 1.0, FADE_IN_SECS);
        if let Some(cycle) = &self.cycle {
            cycle.borrow_mut().begin(now);
        }
    }

    fn stop(&mut self) {
        let now = self.clock.now();
        self.envelope.retarget(now, 0.0, STOP_FADE_SECS);
    }

    fn pause(&mut self) {
        let now = self.clock.now();
        self.envelope.retarget(now, 0.0, PAUSE_FADE_SECS);
        if let Some(cycle) = &self.cycle {
            cycle.borrow_mut().set_paused(now, true);
        }
    }

    fn resume(&mut self) {
        let now = self.clock.now();
        self.envelope.retarget(now, 1.0, PAUSE_FADE_SECS);
        if let Some(cycle) = &self.cycle {
            cycle.borrow_mut().set_paused(now, false);
        }
    }

    fn set_volume(&mut self, gain: f32) {
        self.volume = gain;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn has_on_toggle(&self) -> bool {
        self.cycle.is_some()
    }

    fn set_on(&mut self, on: bool) {
        if self.cycle.is_some() {
            self.on = on;
        }
    }

    /// Only published while the voice is switched on
    fn animation_value(&self) -> Option<f32> {
        if !self.on {
            return None;
        }
        self.with_cycle(|cycle| cycle.animation as f32)
    }

    fn breathing(&self) -> Option<&dyn Breathing> {
        self.cycle.as_ref().map(|_| self as &dyn Breathing)
    }

    fn breathing_mut(&mut self) -> Option<&mut dyn Breathing> {
        if self.cycle.is_some() {
            Some(self as &mut dyn Breathing)
        } else {
            None
        }
    }
}

impl Breathing for HeadlessVoice {
    fn mp0(&self) -> f64 {
        self.with_cycle(|c| c.mp0).unwrap_or_default()
    }

    fn set_mp0(&mut self, seconds: f64) {
        self.with_cycle(|c| c.mp0 = seconds);
    }

    fn mp1(&self) -> f64 {
        self.with_cycle(|c| c.mp1).unwrap_or_default()
    }

    fn set_mp1(&mut self, seconds: f64) {
        self.with_cycle(|c| c.mp1 = seconds);
    }

    fn inhale_dur(&self) -> f64 {
        self.with_cycle(|c| c.inhale_dur).unwrap_or_default()
    }

    fn set_inhale_dur(&mut self, seconds: f64) {
        self.with_cycle(|c| c.inhale_dur = seconds);
    }

    fn exhale_dur(&self) -> f64 {
        self.with_cycle(|c| c.exhale_dur).unwrap_or_default()
    }

    fn set_exhale_dur(&mut self, seconds: f64) {
        self.with_cycle(|c| c.exhale_dur = seconds);
    }

    fn current_period(&self) -> f64 {
        self.with_cycle(|c| c.current_period).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use approx::assert_relative_eq;

    fn voice(kind: VoiceKind, clock: &ManualClock) -> HeadlessVoice {
        HeadlessVoice::new(VoiceParams::defaults(kind), Rc::new(clock.clone()))
    }

    #[test]
    fn test_connect_requires_running_output() {
        let clock = ManualClock::new();
        let mut tone = voice(VoiceKind::Tone, &clock);
        let mut output = HeadlessOutput::new();

        assert!(tone.connect(&output).is_err());
        output.resume().unwrap();
        assert!(tone.connect(&output).is_ok());
        assert!(tone.is_connected());
    }

    #[test]
    fn test_double_disconnect_errors() {
        let clock = ManualClock::new();
        let mut tone = voice(VoiceKind::Tone, &clock);
        let mut output = HeadlessOutput::new();
        output.resume().unwrap();
        tone.connect(&output).unwrap();

        assert!(tone.disconnect().is_ok());
        assert!(matches!(
            tone.disconnect(),
            Err(SessionError::AlreadyDisconnected)
        ));
    }

    #[test]
    fn test_fade_in_and_out() {
        let clock = ManualClock::new();
        let mut tone = voice(VoiceKind::Tone, &clock);
        tone.start();
        assert_relative_eq!(tone.envelope_level(), 0.0);

        clock.advance_secs(0.5);
        assert_relative_eq!(tone.envelope_level(), 0.5, epsilon = 1e-9);

        clock.advance_secs(1.0);
        assert_relative_eq!(tone.envelope_level(), 1.0);

        tone.stop();
        clock.advance_secs(STOP_FADE_SECS);
        assert_relative_eq!(tone.envelope_level(), 0.0);
    }

    #[test]
    fn test_only_breathing_kinds_expose_breathing() {
        let clock = ManualClock::new();
        let mut noise = voice(VoiceKind::NoiseGenerator, &clock);
        assert!(noise.breathing().is_none());
        assert!(noise.breathing_mut().is_none());
        assert!(noise.animation_value().is_none());
        assert!(!noise.has_on_toggle());

        let breathing = voice(VoiceKind::BreathingTone, &clock);
        assert!(breathing.breathing().is_some());
        assert!(breathing.has_on_toggle());
    }

    #[test]
    fn test_period_ramps_toward_target() {
        let clock = ManualClock::new();
        let mut params = VoiceParams::defaults(VoiceKind::BreathingBinauralBeat);
        if let VoiceParams::BreathingBinauralBeat(p) = &mut params {
            p.mp0 = 10.0;
            p.mp1 = 20.0;
            p.md = 100.0;
        }
        let mut breathing = HeadlessVoice::new(params, Rc::new(clock.clone()));
        breathing.start();
        assert_relative_eq!(breathing.current_period(), 10.0);

        clock.advance_secs(50.0);
        assert_relative_eq!(breathing.current_period(), 15.0, epsilon = 1e-9);

        clock.advance_secs(200.0);
        assert_relative_eq!(breathing.current_period(), 20.0);
    }

    #[test]
    fn test_animation_follows_inhale_exhale() {
        let clock = ManualClock::new();
        let mut params = VoiceParams::defaults(VoiceKind::BreathingTone);
        if let VoiceParams::BreathingTone(p) = &mut params {
            p.mp0 = 10.0;
            p.mp1 = 10.0;
            p.inhale_dur = 4.0;
            p.exhale_dur = 6.0;
        }
        let mut breathing = HeadlessVoice::new(params, Rc::new(clock.clone()));
        breathing.start();
        breathing.set_on(true);
        assert_relative_eq!(breathing.animation_value().unwrap(), 0.0);

        // End of the 4 s inhale: fully expanded
        clock.advance_secs(4.0);
        assert_relative_eq!(breathing.animation_value().unwrap(), 1.0, epsilon = 1e-5);

        // Halfway through the 6 s exhale
        clock.advance_secs(3.0);
        assert_relative_eq!(breathing.animation_value().unwrap(), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_pause_freezes_cycle() {
        let clock = ManualClock::new();
        let mut breathing = voice(VoiceKind::BreathingTone, &clock);
        breathing.start();
        breathing.set_on(true);
        clock.advance_secs(2.0);
        breathing.pause();
        let frozen = breathing.animation_value().unwrap();

        clock.advance_secs(30.0);
        assert_relative_eq!(breathing.animation_value().unwrap(), frozen);

        breathing.resume();
        clock.advance_secs(1.0);
        assert!((breathing.animation_value().unwrap() - frozen).abs() > 1e-6);
    }

    #[test]
    fn test_switched_off_voice_publishes_no_animation() {
        let clock = ManualClock::new();
        let mut breathing = voice(VoiceKind::BreathingTone, &clock);
        breathing.start();
        clock.advance_secs(2.0);
        assert!(!breathing.is_on());
        assert!(breathing.animation_value().is_none());

        breathing.set_on(true);
        assert!(breathing.is_on());
        assert!(breathing.animation_value().is_some());

        breathing.set_on(false);
        assert!(breathing.animation_value().is_none());
    }

    #[test]
    fn test_on_toggle_ignored_without_breathing() {
        let clock = ManualClock::new();
        let mut tone = voice(VoiceKind::Tone, &clock);
        tone.set_on(true);
        assert!(!tone.is_on());
    }
}
