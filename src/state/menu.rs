//! Menu Toggle - burger menu that locks scrolling while open.
//!
//! A delegated click inside any `data-fls-menu` element toggles the scroll
//! lock and the root's `data-fls-menu-open` marker together. Clicks that land
//! while the lock gate is closed are dropped, so the two never drift apart.

use log::debug;

use crate::config::{ATTR_MENU, ATTR_MENU_OPEN};
use crate::dom::Document;
use crate::scheduler::Scheduler;
use crate::types::ElementId;

use super::scroll_lock::ScrollLockManager;

#[derive(Debug, Clone, Copy)]
pub struct MenuToggle {
    lock_delay_ms: u64,
}

impl MenuToggle {
    pub fn new(lock_delay_ms: u64) -> Self {
        Self { lock_delay_ms }
    }

    /// Does the page have anything to toggle?
    pub fn is_present(doc: &Document) -> bool {
        !doc.query_all_with_attribute(ATTR_MENU).is_empty()
    }

    /// Is the menu open?
    pub fn is_open(doc: &Document) -> bool {
        doc.has_attribute(doc.root(), ATTR_MENU_OPEN)
    }

    /// Delegated click handler. Returns `true` if the menu toggled.
    pub fn handle_click(
        &self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        lock: &ScrollLockManager,
        target: ElementId,
    ) -> bool {
        if !lock.is_ready() {
            return false;
        }
        if doc.closest(target, |el| el.attribute(ATTR_MENU).is_some()).is_none() {
            return false;
        }

        lock.toggle(doc, scheduler, self.lock_delay_ms);
        let root = doc.root();
        let open = doc.toggle_attribute(root, ATTR_MENU_OPEN);
        debug!("menu: open = {open}");
        true
    }
}
