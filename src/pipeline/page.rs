//! Page - wires the behaviors to the page's events and timers.
//!
//! The host feeds events in and moves time forward:
//!
//! ```text
//! PageEvent::Load ─→ activate (menu, headers, ratings)
//! PageEvent::Scroll ─→ every header controller, in delivery order
//! PageEvent::Click ─→ menu toggle, then rating delegation
//! PageEvent::NodesAdded ─→ module preloader
//! advance(ms) ─→ fire due timers in order
//! ```
//!
//! Everything runs on the caller's thread, one callback at a time.
//!
//! # Example
//!
//! ```ignore
//! use fls_behaviors::{Document, Page, PageConfig, PageEvent};
//!
//! let mut page = Page::new(doc, PageConfig::default());
//! page.dispatch(PageEvent::Load);
//! page.dispatch(PageEvent::Scroll { top: 120.0 });
//! page.advance(500);
//! ```

use log::debug;

use crate::config::{PageConfig, ATTR_HEADER_SCROLL, ATTR_RATING};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::primitives::RatingRegistry;
use crate::scheduler::{Scheduler, Task};
use crate::state::{HeaderController, MenuToggle, ScrollLockManager};
use crate::types::ElementId;

use super::preload::{FetchRequest, ModulePreloader};

/// Events the environment delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Window finished loading; behaviors activate.
    Load,
    /// Window scrolled to `top` px.
    Scroll { top: f64 },
    /// Click on `target` (delegated from the document).
    Click { target: ElementId },
    /// Elements were inserted into the document.
    NodesAdded(Vec<ElementId>),
}

pub struct Page {
    doc: Document,
    scheduler: Scheduler,
    config: PageConfig,
    lock: ScrollLockManager,
    menu: Option<MenuToggle>,
    headers: Vec<HeaderController>,
    ratings: RatingRegistry,
    preloader: ModulePreloader,
    loaded: bool,
}

impl Page {
    /// Take over `doc`. Module preloading starts right away; everything else waits for `Load`.
    pub fn new(doc: Document, config: PageConfig) -> Self {
        let mut preloader = ModulePreloader::new(config.native_modulepreload);
        preloader.scan(&doc);
        Self {
            doc,
            scheduler: Scheduler::new(),
            config,
            lock: ScrollLockManager::new(),
            menu: None,
            headers: Vec::new(),
            ratings: RatingRegistry::new(),
            preloader,
            loaded: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> PageConfig {
        self.config
    }

    /// Current virtual time in ms.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scroll_lock(&self) -> &ScrollLockManager {
        &self.lock
    }

    pub fn headers(&self) -> &[HeaderController] {
        &self.headers
    }

    pub fn ratings(&self) -> &RatingRegistry {
        &self.ratings
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::Load => self.activate(),
            PageEvent::Scroll { top } => self.on_scroll(top),
            PageEvent::Click { target } => self.on_click(target),
            PageEvent::NodesAdded(added) => self.preloader.nodes_added(&self.doc, &added),
        }
    }

    /// Move time forward by `ms`, firing every timer that comes due on the way.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now().saturating_add(ms);
        while let Some((_, task)) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.advance_to(until);
    }

    fn activate(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        if MenuToggle::is_present(&self.doc) {
            self.menu = Some(MenuToggle::new(self.config.lock_delay_ms));
        }

        for element in self.doc.query_all_with_attribute(ATTR_HEADER_SCROLL) {
            self.headers.push(HeaderController::activate(&self.doc, element));
        }

        for element in self.doc.query_all_with_attribute(ATTR_RATING) {
            if let Err(err) = self.ratings.activate(&mut self.doc, element) {
                debug!("page: rating {element} skipped: {err}");
            }
        }

        debug!(
            "page: activated menu={} headers={} ratings={}",
            self.menu.is_some(),
            self.headers.len(),
            self.ratings.len()
        );
    }

    fn on_scroll(&mut self, top: f64) {
        self.doc.viewport_mut().scroll_y = top;
        for header in &mut self.headers {
            header.on_scroll(&mut self.doc, &mut self.scheduler, top);
        }
    }

    fn on_click(&mut self, target: ElementId) {
        if let Some(menu) = &self.menu {
            menu.handle_click(&mut self.doc, &mut self.scheduler, &self.lock, target);
        }
        self.ratings.handle_click(&mut self.doc, target);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::HeaderShow(element) => {
                // A header that is no longer tracked leaves a harmless dangling timer.
                if let Some(header) = self.headers.iter_mut().find(|h| h.element() == element) {
                    header.on_show_timer(&mut self.doc);
                }
            }
            other => {
                self.lock.handle_task(&mut self.doc, &other);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Programmatic API
    // -------------------------------------------------------------------------

    /// Lock scrolling. Returns `false` if a transition is still in flight.
    pub fn lock_scroll(&mut self, delay_ms: u64) -> bool {
        self.lock.lock(&mut self.doc, &mut self.scheduler, delay_ms)
    }

    /// Schedule an unlock. Returns `false` if a transition is still in flight.
    pub fn unlock_scroll(&mut self, delay_ms: u64) -> bool {
        self.lock.unlock(&mut self.doc, &mut self.scheduler, delay_ms)
    }

    pub fn toggle_scroll_lock(&mut self, delay_ms: u64) -> bool {
        self.lock.toggle(&mut self.doc, &mut self.scheduler, delay_ms)
    }

    /// Set an activated rating's value directly.
    pub fn set_rating(&mut self, element: ElementId, value: f64) -> Result<()> {
        let widget = self
            .ratings
            .get(element)
            .ok_or(Error::UnknownElement(element))?;
        widget.set_value(&mut self.doc, value)
    }

    /// Take the module fetches the host should perform.
    pub fn drain_fetch_requests(&mut self) -> Vec<FetchRequest> {
        self.preloader.drain_requests()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ATTR_HEADER_SHOW, ATTR_LOCK_PADDING, ATTR_MENU, ATTR_MENU_OPEN};
    use crate::types::ClassList;

    struct Ids {
        header: ElementId,
        menu: ElementId,
        rating: ElementId,
    }

    fn setup() -> (Page, Ids) {
        let mut doc = Document::new();
        doc.viewport_mut().inner_width = 800.0;
        let body = doc.body();
        doc.set_offset_width(body, 785.0);

        let header = doc.append_new(body, "header").unwrap();
        doc.set_attribute(header, ATTR_HEADER_SCROLL, "");
        doc.set_attribute(header, ATTR_HEADER_SHOW, "");
        doc.set_attribute(header, ATTR_LOCK_PADDING, "");
        let menu = doc.append_new(header, "button").unwrap();
        doc.set_attribute(menu, ATTR_MENU, "");

        let rating = doc.append_new(body, "div").unwrap();
        doc.set_attribute(rating, ATTR_RATING, "set");

        let page = Page::new(doc, PageConfig::default());
        (page, Ids { header, menu, rating })
    }

    #[test]
    fn test_nothing_happens_before_load() {
        let (mut page, ids) = setup();

        page.dispatch(PageEvent::Scroll { top: 100.0 });
        page.dispatch(PageEvent::Click { target: ids.menu });

        assert!(page.headers().is_empty());
        assert!(page.ratings().is_empty());
        assert_eq!(page.document().classes(ids.header), ClassList::NONE);
        assert!(!ScrollLockManager::is_locked(page.document()));
    }

    #[test]
    fn test_load_activates_once() {
        let (mut page, ids) = setup();

        page.dispatch(PageEvent::Load);
        page.dispatch(PageEvent::Load);

        assert!(page.is_loaded());
        assert_eq!(page.headers().len(), 1);
        assert_eq!(page.ratings().len(), 1);
        let items = page.ratings().get(ids.rating).unwrap().items(page.document());
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn test_scroll_updates_viewport_and_header() {
        let (mut page, ids) = setup();
        page.dispatch(PageEvent::Load);

        page.dispatch(PageEvent::Scroll { top: 40.0 });
        assert_eq!(page.document().viewport().scroll_y, 40.0);
        assert!(page.document().has_class(ids.header, ClassList::HEADER_SCROLL));
        assert!(!page.document().has_class(ids.header, ClassList::HEADER_SHOW));

        page.advance(500);
        assert!(page.document().has_class(ids.header, ClassList::HEADER_SHOW));
    }

    #[test]
    fn test_menu_click_locks_with_padding() {
        let (mut page, ids) = setup();
        page.dispatch(PageEvent::Load);

        page.dispatch(PageEvent::Click { target: ids.menu });
        let doc = page.document();
        assert!(doc.has_attribute(doc.root(), ATTR_MENU_OPEN));
        assert_eq!(doc.style(ids.header).padding_right, Some(15.0));

        page.advance(500);
        page.dispatch(PageEvent::Click { target: ids.menu });
        page.advance(500);
        let doc = page.document();
        assert!(!doc.has_attribute(doc.root(), ATTR_MENU_OPEN));
        assert_eq!(doc.style(ids.header).padding_right, None);
    }

    #[test]
    fn test_programmatic_lock_shares_gate_with_menu() {
        let (mut page, ids) = setup();
        page.dispatch(PageEvent::Load);

        assert!(page.lock_scroll(500));
        page.dispatch(PageEvent::Click { target: ids.menu });
        let doc = page.document();
        assert!(!doc.has_attribute(doc.root(), ATTR_MENU_OPEN));
    }

    #[test]
    fn test_set_rating() {
        let (mut page, ids) = setup();
        page.dispatch(PageEvent::Load);

        page.set_rating(ids.rating, 2.0).unwrap();
        assert_eq!(page.ratings().get(ids.rating).unwrap().value(), 2.0);
        assert_eq!(
            page.set_rating(ids.header, 1.0),
            Err(Error::UnknownElement(ids.header))
        );
    }

    #[test]
    fn test_stale_header_timer_is_harmless() {
        let (mut page, ids) = setup();
        page.dispatch(PageEvent::Load);
        page.dispatch(PageEvent::Scroll { top: 40.0 });

        page.document_mut().remove(ids.header);
        page.advance(1000);
        assert_eq!(page.scheduler().pending(), 0);
    }
}
