//! Session observers
//!
//! Observers are called synchronously from inside engine operations, before
//! the causing method returns.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::state::SessionState;

/// Receives session notifications. Every method defaults to a no-op.
pub trait SessionObserver {
    /// Fired exactly once per real state transition
    fn on_state_change(&mut self, _state: SessionState) {}

    /// Fired on every progress tick while playing
    fn on_timer_update(&mut self, _elapsed: f64, _remaining: f64, _duration: f64) {}

    /// Fired on every animation poll that found a driving voice
    fn on_animation_update(&mut self, _value: f32) {}
}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    StateChanged {
        state: SessionState,
    },
    TimerUpdate {
        elapsed: f64,
        remaining: f64,
        duration: f64,
    },
    Animation {
        value: f32,
    },
}

/// Observer that records every notification into a shared log
///
/// Clones share the same log, so a caller can hand one clone to the engine
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn state_changes(&self) -> Vec<SessionState> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn timer_updates(&self) -> Vec<(f64, f64, f64)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::TimerUpdate {
                    elapsed,
                    remaining,
                    duration,
                } => Some((*elapsed, *remaining, *duration)),
                _ => None,
            })
            .collect()
    }

    pub fn animation_values(&self) -> Vec<f32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Animation { value } => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for EventRecorder {
    fn on_state_change(&mut self, state: SessionState) {
        self.events
            .borrow_mut()
            .push(SessionEvent::StateChanged { state });
    }

    fn on_timer_update(&mut self, elapsed: f64, remaining: f64, duration: f64) {
        self.events.borrow_mut().push(SessionEvent::TimerUpdate {
            elapsed,
            remaining,
            duration,
        });
    }

    fn on_animation_update(&mut self, value: f32) {
        self.events
            .borrow_mut()
            .push(SessionEvent::Animation { value });
    }
}
