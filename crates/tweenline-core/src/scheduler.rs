//! Deferred actions for staggered starts.
//!
//! A flat list of (remaining delay, action) pairs. Each registry update
//! decrements every entry by the tick step and drains the due actions, which
//! then run against the registry before managers advance.

use std::fmt;

use crate::registry::Registry;

/// Action deferred until its delay elapses.
pub type ScheduledAction = Box<dyn FnOnce(&mut Registry)>;

struct Entry {
    remaining: f32,
    action: Option<ScheduledAction>,
}

/// Flat delay queue, drained once per tick.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delay: f32, action: ScheduledAction) {
        self.entries.push(Entry {
            remaining: delay,
            action: Some(action),
        });
    }

    /// Decrement all entries by `step` and return the actions that came due,
    /// in insertion order.
    pub fn tick(&mut self, step: f32) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            entry.remaining -= step;
            if entry.remaining <= 0.0 {
                if let Some(action) = entry.action.take() {
                    due.push(action);
                }
            }
        }
        self.entries.retain(|e| e.action.is_some());
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.entries.len())
            .finish()
    }
}
