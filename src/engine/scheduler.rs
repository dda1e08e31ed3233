//! Engine-owned scheduled tasks
//!
//! Recurring and deferred work (progress ticks, animation polling, teardown)
//! lives here as plain data instead of ambient timers, so the engine can
//! cancel exactly its own tasks and a host loop decides when they run.

use std::time::Duration;

/// Shortest period a repeating task may have
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// What a task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    ProgressTick,
    AnimationPoll,
    Teardown,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    kind: TaskKind,
    due_at: Duration,
    every: Option<Duration>,
}

/// Ordered set of pending tasks
#[derive(Debug, Default)]
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
    next_id: u64,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `kind` every `every`, first at `now + every`
    ///
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    pub fn schedule_repeating(&mut self, kind: TaskKind, every: Duration, now: Duration) -> TaskId {
        let every = every.max(MIN_PERIOD);
        self.push(kind, now + every, Some(every))
    }

    /// Run `kind` once at `now + delay`
    pub fn schedule_once(&mut self, kind: TaskKind, delay: Duration, now: Duration) -> TaskId {
        self.push(kind, now + delay, None)
    }

    /// Cancel a task; returns false if it already ran or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    /// Take the earliest task due at `now`
    ///
    /// Repeating tasks are re-armed one period after their due time, or one
    /// period after `now` when the host fell behind, so a late poll never
    /// replays a burst of missed ticks.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TaskId, TaskKind)> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_at <= now)
            .min_by_key(|(_, task)| (task.due_at, task.id.0))
            .map(|(index, _)| index)?;

        let task = &mut self.tasks[index];
        let fired = (task.id, task.kind);
        match task.every {
            Some(every) => {
                let next = task.due_at + every;
                task.due_at = if next > now { next } else { now + every };
            }
            None => {
                self.tasks.remove(index);
            }
        }
        Some(fired)
    }

    /// Time of the next due task
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|task| task.due_at).min()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn push(&mut self, kind: TaskKind, due_at: Duration, every: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            kind,
            due_at,
            every,
        });
        id
    }
}
