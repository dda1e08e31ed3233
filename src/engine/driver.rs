//! Real-time driver
//!
//! Polls a [`SessionEngine`] on a tokio interval until the session returns
//! to idle. The engine is single-threaded, so the driver runs on the
//! caller's task instead of being spawned.

use std::time::Duration;

use log::{info, warn};
use tokio::time::{Instant, MissedTickBehavior};

use super::session::SessionEngine;
use super::state::SessionState;
use crate::clock::Clock;

/// Clock backed by tokio's time source, so paused test runtimes control it
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Poll `engine` every `poll_every` until it is idle
pub async fn run_until_idle(engine: &mut SessionEngine, poll_every: Duration) {
    let mut ticker = tokio::time::interval(poll_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        engine.poll();
        if engine.state() == SessionState::Idle {
            break;
        }
    }
}

/// Like [`run_until_idle`], but Ctrl-C stops the session and lets the
/// teardown run out instead of killing the process mid-fade
pub async fn run_until_idle_or_interrupt(engine: &mut SessionEngine, poll_every: Duration) {
    let mut ticker = tokio::time::interval(poll_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            result = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                match result {
                    Ok(()) => {
                        info!("[SESSION] Interrupted, stopping session");
                        engine.stop();
                    }
                    Err(e) => warn!("[SESSION] Ctrl-C handler unavailable: {}", e),
                }
            }
            _ = ticker.tick() => {
                engine.poll();
                if engine.state() == SessionState::Idle {
                    break;
                }
            }
        }
    }
}
