//! Timer Scheduler - virtual clock with cancellable delayed tasks.
//!
//! Every "wait" in the behaviors is a scheduled task: the lock gate release,
//! the deferred unlock, the header show keepalive. Nothing blocks.
//!
//! # Pattern
//!
//! - `schedule(delay, task)` returns a [`TimerHandle`]
//! - `cancel(handle)` is idempotent (fired or already cancelled = no-op)
//! - `pop_due(until)` hands back tasks in due order, FIFO among equal due times
//!
//! Tasks are plain data; the [`Page`](crate::pipeline::Page) decides what
//! each one does when it fires.

use std::collections::{BTreeMap, HashMap};

use crate::types::ElementId;

// =============================================================================
// TASKS
// =============================================================================

/// Work a timer performs when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Reopen the scroll lock gate.
    LockReady,
    /// Apply a deferred unlock: clear padding on these targets and the body,
    /// then drop the locked marker.
    UnlockRelease { targets: Vec<ElementId> },
    /// Re-assert the visible marker on a header.
    HeaderShow(ElementId),
}

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

// =============================================================================
// SCHEDULER
// =============================================================================

#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    /// (due, id) -> task. Ids grow monotonically, so ties fire in schedule order.
    queue: BTreeMap<(u64, u64), Task>,
    /// id -> due, for cancellation.
    due_by_id: HashMap<u64, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in ms.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of tasks still waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Is this handle still waiting to fire?
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_by_id.contains_key(&handle.0)
    }

    /// Schedule `task` to fire `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, task: Task) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now.saturating_add(delay_ms);
        self.queue.insert((due, id), task);
        self.due_by_id.insert(id, due);
        TimerHandle(id)
    }

    /// Cancel a task. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.due_by_id.remove(&handle.0) {
            Some(due) => self.queue.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its due time.
    ///
    /// Returns `None` once nothing more is due; the clock then stays where the
    /// last task left it; call [`Scheduler::advance_to`] to finish the move.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerHandle, Task)> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        let task = self.queue.remove(&(due, id))?;
        self.due_by_id.remove(&id);
        self.now = self.now.max(due);
        Some((TimerHandle(id), task))
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }
}
