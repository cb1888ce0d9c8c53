//! Timers
//!
//! setTimeout/setInterval over a virtual millisecond clock. The owner
//! advances the clock; nothing here sleeps.

use std::collections::BTreeMap;

pub type TimerId = u32;

/// Timer entry
#[derive(Debug, Clone)]
pub struct Timer<T> {
    pub id: TimerId,
    pub task: T,
    pub delay_ms: u64,
    pub repeat: bool,
    pub due_at: u64,
}

/// Timer manager
#[derive(Debug)]
pub struct TimerManager<T> {
    now_ms: u64,
    next_id: TimerId,
    timers: BTreeMap<TimerId, Timer<T>>,
}

impl<T> Default for TimerManager<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            timers: BTreeMap::new(),
        }
    }
}

impl<T: Clone> TimerManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    fn insert(&mut self, task: T, delay_ms: u64, repeat: bool) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                id,
                task,
                delay_ms,
                repeat,
                due_at: self.now_ms.saturating_add(delay_ms),
            },
        );
        id
    }

    /// Add a timeout
    pub fn set_timeout(&mut self, task: T, delay_ms: u64) -> TimerId {
        self.insert(task, delay_ms, false)
    }

    /// Add an interval (at least 1ms)
    pub fn set_interval(&mut self, task: T, delay_ms: u64) -> TimerId {
        self.insert(task, delay_ms.max(1), true)
    }

    /// Clear a timer; clearing an unknown or fired timer is a no-op
    pub fn clear(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Time until the next timer fires
    pub fn time_until_next(&self) -> Option<u64> {
        self.timers
            .values()
            .map(|t| t.due_at.saturating_sub(self.now_ms))
            .min()
    }

    /// Time until the next one-shot timer fires; intervals are ignored
    pub fn time_until_next_timeout(&self) -> Option<u64> {
        self.timers
            .values()
            .filter(|t| !t.repeat)
            .map(|t| t.due_at.saturating_sub(self.now_ms))
            .min()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Timeouts are removed, intervals rescheduled.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, T)> {
        let id = self
            .timers
            .values()
            .filter(|t| t.due_at <= until)
            .min_by_key(|t| (t.due_at, t.id))?
            .id;

        let timer = self.timers.get_mut(&id)?;
        self.now_ms = self.now_ms.max(timer.due_at);
        let task = timer.task.clone();
        if timer.repeat {
            timer.due_at = timer.due_at.saturating_add(timer.delay_ms);
        } else {
            self.timers.remove(&id);
        }
        Some((id, task))
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
