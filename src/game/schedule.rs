//! Deferred round events
//!
//! Timer ticks and the end of a practice reveal are one-shot tasks tagged
//! with the generation of the round that scheduled them. A task whose
//! generation no longer matches the live round is stale and must be dropped
//! by the caller instead of being applied.

use std::time::{Duration, Instant};

/// Kind of deferred event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One-second countdown step (time attack)
    Tick,
    /// Practice reveal delay elapsed
    EndReveal,
}

/// A task due at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub task: Task,
    pub due: Instant,
    pub generation: u64,
}

/// Pending one-shot tasks
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire `delay` after `now`.
    pub fn schedule(&mut self, task: Task, now: Instant, delay: Duration, generation: u64) {
        self.pending.push(Scheduled {
            task,
            due: now + delay,
            generation,
        });
    }

    /// Drop every pending task.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|s| s.due).min()
    }

    /// Remove and return tasks due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Scheduled> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = pending;
        due.sort_by_key(|s| s.due);
        due
    }
}
