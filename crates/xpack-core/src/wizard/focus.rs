//! Deferred focus tied to a render generation.
//!
//! Every render schedules focus for the field that should receive input once
//! the transition settles. Scheduling again replaces the pending request, so a
//! superseded navigation never steals focus for a step that is gone.

use std::time::{Duration, Instant};

/// Delay before focusing, long enough for the step transition to finish
pub const FOCUS_DELAY: Duration = Duration::from_millis(300);

/// A field of a specific step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub step: usize,
    pub field: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingFocus {
    generation: u64,
    due: Instant,
    target: FieldRef,
}

#[derive(Debug, Default)]
pub struct FocusScheduler {
    generation: u64,
    pending: Option<PendingFocus>,
}

impl FocusScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and schedule `target` for `now + FOCUS_DELAY`.
    /// Any earlier pending focus is cancelled, even when `target` is `None`.
    pub fn schedule(&mut self, target: Option<FieldRef>, now: Instant) -> u64 {
        self.generation += 1;
        self.pending = target.map(|target| PendingFocus {
            generation: self.generation,
            due: now + FOCUS_DELAY,
            target,
        });
        self.generation
    }

    /// Take the pending focus if it is due
    pub fn poll(&mut self, now: Instant) -> Option<FieldRef> {
        match self.pending {
            Some(p) if p.generation == self.generation && now >= p.due => {
                self.pending = None;
                Some(p.target)
            }
            _ => None,
        }
    }
}
