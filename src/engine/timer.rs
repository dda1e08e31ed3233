//! Progress timer
//!
//! Elapsed time is derived from clock deltas, never counted in ticks:
//! `elapsed = accumulated + (running ? now - run_started_at : 0)`.
//! Pausing folds the current run into `accumulated`, so time is neither lost
//! nor double counted across pause/resume.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProgressTimer {
    duration_secs: f64,
    run_started_at: Option<Duration>,
    accumulated: Duration,
}

impl ProgressTimer {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            run_started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration_secs
    }

    pub fn set_duration(&mut self, duration_secs: f64) {
        self.duration_secs = duration_secs;
    }

    pub fn is_running(&self) -> bool {
        self.run_started_at.is_some()
    }

    /// Start a fresh session at `now`
    pub fn begin(&mut self, now: Duration) {
        self.accumulated = Duration::ZERO;
        self.run_started_at = Some(now);
    }

    /// Freeze elapsed time at `now`
    pub fn suspend(&mut self, now: Duration) {
        if let Some(started) = self.run_started_at.take() {
            self.accumulated += now.saturating_sub(started);
        }
    }

    /// Continue counting from `now`
    pub fn resume(&mut self, now: Duration) {
        if self.run_started_at.is_none() {
            self.run_started_at = Some(now);
        }
    }

    /// Seconds elapsed, clamped to `[0, duration]`
    pub fn elapsed(&self, now: Duration) -> f64 {
        let current = self
            .run_started_at
            .map(|started| now.saturating_sub(started))
            .unwrap_or(Duration::ZERO);
        (self.accumulated + current)
            .as_secs_f64()
            .min(self.duration_secs)
    }

    /// Seconds left, never negative
    pub fn remaining(&self, now: Duration) -> f64 {
        (self.duration_secs - self.elapsed(now)).max(0.0)
    }

    pub fn reset(&mut self) {
        self.run_started_at = None;
        self.accumulated = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_begin_starts_at_zero() {
        let mut timer = ProgressTimer::new(60.0);
        timer.begin(secs(12.0));
        assert_eq!(timer.elapsed(secs(12.0)), 0.0);
        assert_eq!(timer.remaining(secs(12.0)), 60.0);
    }

    #[test]
    fn test_pause_excludes_idle_time() {
        let mut timer = ProgressTimer::new(60.0);
        timer.begin(secs(0.0));
        timer.suspend(secs(10.0));
        assert_relative_eq!(timer.elapsed(secs(40.0)), 10.0);

        timer.resume(secs(40.0));
        assert_relative_eq!(timer.elapsed(secs(45.0)), 15.0);
        assert_relative_eq!(timer.remaining(secs(45.0)), 45.0);
    }

    #[test]
    fn test_elapsed_clamped_to_duration() {
        let mut timer = ProgressTimer::new(60.0);
        timer.begin(secs(0.0));
        assert_eq!(timer.elapsed(secs(75.0)), 60.0);
        assert_eq!(timer.remaining(secs(75.0)), 0.0);
    }

    #[test]
    fn test_double_suspend_does_not_double_count() {
        let mut timer = ProgressTimer::new(60.0);
        timer.begin(secs(0.0));
        timer.suspend(secs(5.0));
        timer.suspend(secs(9.0));
        assert_relative_eq!(timer.elapsed(secs(9.0)), 5.0);
    }

    #[test]
    fn test_reset() {
        let mut timer = ProgressTimer::new(60.0);
        timer.begin(secs(0.0));
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(secs(30.0)), 0.0);
    }
}
