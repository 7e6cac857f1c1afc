use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Handle returned by [`DeferredQueue::schedule`], used to cancel a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Scheduled<T> {
    id: TaskId,
    due: Duration,
    payload: T,
}

/// Delayed actions driven by the frame loop instead of a background timer.
///
/// The queue owns its own clock; it only moves when `advance` is called, so
/// payloads are always released on the caller's thread, in deadline order
/// (ties resolve in scheduling order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredQueue<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        log::trace!("scheduled task {} due at {:?}", id.0, due);
        self.pending.push(Scheduled { id, due, payload });
        id
    }

    /// Returns the payload if the task had not fired yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let index = self.pending.iter().position(|s| s.id == id)?;
        log::trace!("cancelled task {}", id.0);
        Some(self.pending.remove(index).payload)
    }

    /// Moves the clock forward by `dt` and returns every payload now due.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        if self.pending.iter().all(|s| s.due > self.now) {
            return Vec::new();
        }

        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = waiting;
        due.sort_by_key(|s| (s.due, s.id));
        due.into_iter().map(|s| s.payload).collect()
    }
}
