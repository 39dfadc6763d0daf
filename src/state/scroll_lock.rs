//! Scroll Lock - page-wide scroll disable with scrollbar compensation.
//!
//! A single ready gate makes lock/unlock single-flight: once an operation
//! starts, every further call is dropped (not queued) until the delay has
//! elapsed.
//!
//! Lock paints immediately. Unlock only schedules its paint for the end of
//! the delay, so a closing transition never shows the unpadded page early.
//!
//! # Example
//!
//! ```ignore
//! use fls_behaviors::state::ScrollLockManager;
//!
//! let lock = ScrollLockManager::new();
//! lock.lock(&mut doc, &mut scheduler, 500);   // padded + marked now
//! lock.unlock(&mut doc, &mut scheduler, 500); // dropped: gate still closed
//! ```

use log::{debug, trace};
use spark_signals::{signal, Signal};

use crate::config::{ATTR_LOCK_PADDING, ATTR_SCROLL_LOCK};
use crate::dom::Document;
use crate::scheduler::{Scheduler, Task};
use crate::types::ElementId;

/// Owns the ready gate and mirrors the locked marker.
#[derive(Clone)]
pub struct ScrollLockManager {
    ready: Signal<bool>,
    locked: Signal<bool>,
}

impl Default for ScrollLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollLockManager {
    pub fn new() -> Self {
        Self {
            ready: signal(true),
            locked: signal(false),
        }
    }

    /// Is the gate open?
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    /// Reactive view of the gate.
    pub fn ready_signal(&self) -> Signal<bool> {
        self.ready.clone()
    }

    /// Reactive view of the locked marker.
    pub fn locked_signal(&self) -> Signal<bool> {
        self.locked.clone()
    }

    /// Does the page carry the locked marker?
    pub fn is_locked(doc: &Document) -> bool {
        doc.has_attribute(doc.root(), ATTR_SCROLL_LOCK)
    }

    /// Width the scrollbar takes: viewport width minus body width, never negative.
    pub fn scrollbar_width(doc: &Document) -> f64 {
        (doc.viewport().inner_width - doc.offset_width(doc.body())).max(0.0)
    }

    /// Unlock if locked, lock otherwise. Returns whether anything happened.
    pub fn toggle(&self, doc: &mut Document, scheduler: &mut Scheduler, delay_ms: u64) -> bool {
        if Self::is_locked(doc) {
            self.unlock(doc, scheduler, delay_ms)
        } else {
            self.lock(doc, scheduler, delay_ms)
        }
    }

    /// Lock scrolling now. No-op while the gate is closed.
    pub fn lock(&self, doc: &mut Document, scheduler: &mut Scheduler, delay_ms: u64) -> bool {
        if !self.is_ready() {
            trace!("scroll lock: lock ignored, transition in flight");
            return false;
        }

        let width = Self::scrollbar_width(doc);
        for target in doc.query_all_with_attribute(ATTR_LOCK_PADDING) {
            doc.set_padding_right(target, Some(width));
        }
        let body = doc.body();
        doc.set_padding_right(body, Some(width));
        let root = doc.root();
        doc.set_attribute(root, ATTR_SCROLL_LOCK, "");
        self.locked.set(true);
        debug!("scroll lock: locked, compensating {width}px");

        self.close_gate(scheduler, delay_ms);
        true
    }

    /// Schedule an unlock for the end of the delay. No-op while the gate is closed.
    ///
    /// The padding targets are captured now; elements flagged later keep their padding.
    pub fn unlock(&self, doc: &mut Document, scheduler: &mut Scheduler, delay_ms: u64) -> bool {
        if !self.is_ready() {
            trace!("scroll lock: unlock ignored, transition in flight");
            return false;
        }

        let targets = doc.query_all_with_attribute(ATTR_LOCK_PADDING);
        scheduler.schedule(delay_ms, Task::UnlockRelease { targets });
        debug!("scroll lock: unlock scheduled in {delay_ms}ms");

        self.close_gate(scheduler, delay_ms);
        true
    }

    fn close_gate(&self, scheduler: &mut Scheduler, delay_ms: u64) {
        self.ready.set(false);
        scheduler.schedule(delay_ms, Task::LockReady);
    }

    /// Timer callback: reopen the gate.
    pub fn reopen(&self) {
        self.ready.set(true);
        trace!("scroll lock: ready");
    }

    /// Timer callback: the deferred half of `unlock`.
    pub fn release(&self, doc: &mut Document, targets: &[ElementId]) {
        for target in targets {
            doc.set_padding_right(*target, None);
        }
        let body = doc.body();
        doc.set_padding_right(body, None);
        let root = doc.root();
        doc.remove_attribute(root, ATTR_SCROLL_LOCK);
        self.locked.set(false);
        debug!("scroll lock: unlocked");
    }

    /// Run a fired lock task. Returns `false` for tasks this manager does not own.
    pub fn handle_task(&self, doc: &mut Document, task: &Task) -> bool {
        match task {
            Task::LockReady => self.reopen(),
            Task::UnlockRelease { targets } => self.release(doc, targets),
            _ => return false,
        }
        true
    }
}
