//! Timer abstraction the game issues commands to.
//!
//! The core never sleeps or spawns; it asks a [`Scheduler`] to start and
//! cancel repeating or one-shot [`Task`]s and is handed each task back when it
//! fires. [`VirtualTimers`] is a deterministic implementation driven by an
//! externally supplied clock, used both by tests and by the terminal loop.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::trace;

/// Everything the game can have scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    TrainTick,
    ClockTick,
    StationVanish,
    StationBlink,
    StationDestroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(pub u64);

pub trait Scheduler {
    /// Fires `task` every `period`, starting one period from now.
    fn start_interval(&mut self, period: Duration, task: Task) -> TaskHandle;

    /// Fires `task` once after `delay`.
    fn start_timeout(&mut self, delay: Duration, task: Task) -> TaskHandle;

    /// Cancelling an unknown or already finished handle is a no-op.
    fn cancel(&mut self, handle: TaskHandle);
}

#[derive(Debug, Clone)]
struct Entry {
    task: Task,
    due: Duration,
    period: Option<Duration>,
}

/// A fake clock. Time only moves through [`VirtualTimers::pop_due`] and
/// [`VirtualTimers::advance_to`].
#[derive(Debug, Default)]
pub struct VirtualTimers {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<TaskHandle, Entry>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    pub fn active_tasks(&self) -> Vec<Task> {
        self.entries.values().map(|entry| entry.task).collect()
    }

    /// Period of a live interval, `None` for timeouts and unknown handles.
    pub fn period_of(&self, handle: TaskHandle) -> Option<Duration> {
        self.entries.get(&handle).and_then(|entry| entry.period)
    }

    /// Removes and returns the earliest task due at or before `until`, moving
    /// the clock to its due time. Intervals are re-armed one period later.
    /// Ties fire in the order they were scheduled.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let (&handle, _) = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(handle, entry)| (entry.due, **handle))?;

        let entry = self.entries.get_mut(&handle)?;
        let task = entry.task;
        self.now = self.now.max(entry.due);

        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.remove(&handle);
            }
        }

        trace!(?task, now = ?self.now, "task fired");
        Some(task)
    }

    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, task: Task) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.entries.insert(handle, Entry { task, due: self.now + delay, period });
        handle
    }
}

impl Scheduler for VirtualTimers {
    fn start_interval(&mut self, period: Duration, task: Task) -> TaskHandle {
        // A zero period would fire forever without time passing
        let period = period.max(Duration::from_nanos(1));
        self.insert(period, Some(period), task)
    }

    fn start_timeout(&mut self, delay: Duration, task: Task) -> TaskHandle {
        self.insert(delay, None, task)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.entries.remove(&handle);
    }
}
