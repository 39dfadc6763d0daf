//! Header Scroll - scrolled/visible state machine driven by scroll samples.
//!
//! Two facets per header:
//! - **scrolled** - `scroll_top >= threshold` (inclusive), drives `--header-scroll`
//! - **visible** - only with show-on-scroll-up while scrolled, drives `--header-show`
//!
//! While scrolled, a strictly downward sample hides the header; an upward or
//! stationary one shows it and restarts a keepalive timer that re-asserts
//! the marker when it fires. Every sample cancels the pending timer first.
//! Leaving the scrolled facet clears visible unconditionally.

use log::{debug, trace};
use spark_signals::{signal, Signal};

use crate::config::{
    first_number, ATTR_HEADER_SCROLL, ATTR_HEADER_SHOW, ATTR_HEADER_SHOW_DELAY,
    ATTR_HEADER_THRESHOLD, DEFAULT_SCROLL_THRESHOLD_PX, DEFAULT_SHOW_DELAY_MS,
};
use crate::dom::Document;
use crate::scheduler::{Scheduler, Task, TimerHandle};
use crate::types::{ClassList, ElementId};

// =============================================================================
// CONFIG
// =============================================================================

/// Per-header options, read once at activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderConfig {
    pub show_on_scroll_up: bool,
    pub show_delay_ms: u64,
    pub scroll_threshold_px: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            show_on_scroll_up: false,
            show_delay_ms: DEFAULT_SHOW_DELAY_MS,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
        }
    }
}

impl HeaderConfig {
    /// Read the header's attributes. Malformed numbers fall back to defaults.
    ///
    /// The dedicated `-threshold`/`-delay` attributes win; otherwise the value
    /// of the marker attribute itself is used.
    pub fn from_element(doc: &Document, id: ElementId) -> Self {
        let attr = |name: &str| doc.get_attribute(id, name);

        let scroll_threshold_px = first_number([
            (ATTR_HEADER_THRESHOLD, attr(ATTR_HEADER_THRESHOLD)),
            (ATTR_HEADER_SCROLL, attr(ATTR_HEADER_SCROLL)),
        ])
        .unwrap_or(DEFAULT_SCROLL_THRESHOLD_PX);

        let show_delay_ms = first_number([
            (ATTR_HEADER_SHOW_DELAY, attr(ATTR_HEADER_SHOW_DELAY)),
            (ATTR_HEADER_SHOW, attr(ATTR_HEADER_SHOW)),
        ])
        .filter(|ms| *ms >= 0.0)
        .map(|ms| ms as u64)
        .unwrap_or(DEFAULT_SHOW_DELAY_MS);

        Self {
            show_on_scroll_up: attr(ATTR_HEADER_SHOW).is_some(),
            show_delay_ms,
            scroll_threshold_px,
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// One header's state machine.
pub struct HeaderController {
    element: ElementId,
    config: HeaderConfig,
    last_scroll_top: f64,
    pending_show: Option<TimerHandle>,
    scrolled: Signal<bool>,
    visible: Signal<bool>,
}

impl HeaderController {
    pub fn new(element: ElementId, config: HeaderConfig) -> Self {
        Self {
            element,
            config,
            last_scroll_top: 0.0,
            pending_show: None,
            scrolled: signal(false),
            visible: signal(false),
        }
    }

    /// Build a controller from the element's attributes.
    pub fn activate(doc: &Document, element: ElementId) -> Self {
        let config = HeaderConfig::from_element(doc, element);
        debug!("header {element}: activated with {config:?}");
        Self::new(element, config)
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn config(&self) -> HeaderConfig {
        self.config
    }

    /// Previous sample used for direction detection.
    pub fn last_scroll_top(&self) -> f64 {
        self.last_scroll_top
    }

    pub fn scrolled_signal(&self) -> Signal<bool> {
        self.scrolled.clone()
    }

    pub fn visible_signal(&self) -> Signal<bool> {
        self.visible.clone()
    }

    /// Process one scroll sample.
    pub fn on_scroll(&mut self, doc: &mut Document, scheduler: &mut Scheduler, scroll_top: f64) {
        if let Some(handle) = self.pending_show.take() {
            scheduler.cancel(handle);
        }

        if scroll_top >= self.config.scroll_threshold_px {
            self.set_scrolled(doc, true);
            if self.config.show_on_scroll_up {
                let moving_down = scroll_top > self.last_scroll_top;
                self.set_visible(doc, !moving_down);
                self.pending_show = Some(
                    scheduler.schedule(self.config.show_delay_ms, Task::HeaderShow(self.element)),
                );
            }
        } else {
            self.set_scrolled(doc, false);
            if self.config.show_on_scroll_up {
                self.set_visible(doc, false);
            }
        }

        self.last_scroll_top = if scroll_top <= 0.0 { 0.0 } else { scroll_top };
    }

    /// Timer callback: the keepalive fired uninterrupted.
    pub fn on_show_timer(&mut self, doc: &mut Document) {
        self.pending_show = None;
        self.set_visible(doc, true);
    }

    fn set_scrolled(&self, doc: &mut Document, scrolled: bool) {
        if self.scrolled.get() != scrolled {
            trace!("header {}: scrolled = {scrolled}", self.element);
        }
        if scrolled {
            doc.add_class(self.element, ClassList::HEADER_SCROLL);
        } else {
            doc.remove_class(self.element, ClassList::HEADER_SCROLL);
        }
        self.scrolled.set(scrolled);
    }

    fn set_visible(&self, doc: &mut Document, visible: bool) {
        if self.visible.get() != visible {
            trace!("header {}: visible = {visible}", self.element);
        }
        if visible {
            doc.add_class(self.element, ClassList::HEADER_SHOW);
        } else {
            doc.remove_class(self.element, ClassList::HEADER_SHOW);
        }
        self.visible.set(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        doc: Document,
        scheduler: Scheduler,
        header: HeaderController,
    }

    fn setup(attrs: &[(&str, &str)]) -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let el = doc.append_new(body, "header").unwrap();
        doc.set_attribute(el, ATTR_HEADER_SCROLL, "");
        for (name, value) in attrs {
            doc.set_attribute(el, name, value);
        }
        let header = HeaderController::activate(&doc, el);
        Fixture {
            doc,
            scheduler: Scheduler::new(),
            header,
        }
    }

    fn scroll(f: &mut Fixture, top: f64) {
        f.header.on_scroll(&mut f.doc, &mut f.scheduler, top);
    }

    fn advance(f: &mut Fixture, ms: u64) {
        let until = f.scheduler.now() + ms;
        while let Some((_, task)) = f.scheduler.pop_due(until) {
            if let Task::HeaderShow(_) = task {
                f.header.on_show_timer(&mut f.doc);
            }
        }
        f.scheduler.advance_to(until);
    }

    fn classes(f: &Fixture) -> ClassList {
        f.doc.classes(f.header.element())
    }

    #[test]
    fn test_config_defaults() {
        let f = setup(&[]);
        assert_eq!(f.header.config(), HeaderConfig::default());
    }

    #[test]
    fn test_config_from_attributes() {
        let f = setup(&[
            (ATTR_HEADER_THRESHOLD, "80"),
            (ATTR_HEADER_SHOW, ""),
            (ATTR_HEADER_SHOW_DELAY, "250"),
        ]);
        assert_eq!(
            f.header.config(),
            HeaderConfig {
                show_on_scroll_up: true,
                show_delay_ms: 250,
                scroll_threshold_px: 80.0,
            }
        );
    }

    #[test]
    fn test_config_legacy_values() {
        let f = setup(&[(ATTR_HEADER_SCROLL, "120"), (ATTR_HEADER_SHOW, "900")]);
        assert_eq!(f.header.config().scroll_threshold_px, 120.0);
        assert_eq!(f.header.config().show_delay_ms, 900);
    }

    #[test]
    fn test_config_garbage_falls_back() {
        let f = setup(&[(ATTR_HEADER_THRESHOLD, "tall"), (ATTR_HEADER_SHOW_DELAY, "soon")]);
        assert_eq!(f.header.config().scroll_threshold_px, 1.0);
        assert_eq!(f.header.config().show_delay_ms, 500);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut f = setup(&[(ATTR_HEADER_THRESHOLD, "50")]);

        scroll(&mut f, 49.0);
        assert!(!classes(&f).contains(ClassList::HEADER_SCROLL));
        scroll(&mut f, 50.0);
        assert!(classes(&f).contains(ClassList::HEADER_SCROLL));
        assert!(f.header.scrolled_signal().get());
    }

    #[test]
    fn test_without_show_never_marks_visible() {
        let mut f = setup(&[]);

        scroll(&mut f, 100.0);
        scroll(&mut f, 50.0);
        advance(&mut f, 1000);
        assert!(!classes(&f).contains(ClassList::HEADER_SHOW));
        assert_eq!(f.scheduler.pending(), 0);
    }

    #[test]
    fn test_scroll_sequence() {
        let mut f = setup(&[(ATTR_HEADER_SHOW, "")]);
        let expect = [
            (0.0, false, false),
            (5.0, true, false),
            (3.0, true, true),
            (3.0, true, true),
            (10.0, true, false),
        ];

        for (top, scrolled, visible) in expect {
            scroll(&mut f, top);
            assert_eq!(classes(&f).contains(ClassList::HEADER_SCROLL), scrolled, "scrolled at {top}");
            assert_eq!(classes(&f).contains(ClassList::HEADER_SHOW), visible, "visible at {top}");
        }
    }

    #[test]
    fn test_keepalive_reasserts_after_delay() {
        let mut f = setup(&[(ATTR_HEADER_SHOW, "")]);

        scroll(&mut f, 100.0);
        assert!(!classes(&f).contains(ClassList::HEADER_SHOW));

        advance(&mut f, 499);
        assert!(!classes(&f).contains(ClassList::HEADER_SHOW));
        advance(&mut f, 1);
        assert!(classes(&f).contains(ClassList::HEADER_SHOW));
        assert!(f.header.visible_signal().get());
    }

    #[test]
    fn test_new_sample_cancels_keepalive() {
        let mut f = setup(&[(ATTR_HEADER_SHOW, "")]);

        scroll(&mut f, 100.0);
        advance(&mut f, 300);
        scroll(&mut f, 200.0);
        advance(&mut f, 300);
        // First timer would have fired at 500.
        assert!(!classes(&f).contains(ClassList::HEADER_SHOW));
        assert_eq!(f.scheduler.pending(), 1);

        advance(&mut f, 200);
        assert!(classes(&f).contains(ClassList::HEADER_SHOW));
    }

    #[test]
    fn test_leaving_scrolled_clears_visible() {
        let mut f = setup(&[(ATTR_HEADER_SHOW, ""), (ATTR_HEADER_THRESHOLD, "10")]);

        scroll(&mut f, 100.0);
        scroll(&mut f, 50.0);
        assert!(classes(&f).contains(ClassList::HEADER_SHOW));

        scroll(&mut f, 5.0);
        assert_eq!(classes(&f), ClassList::NONE);
        // No keepalive outside the scrolled facet.
        advance(&mut f, 1000);
        assert!(!classes(&f).contains(ClassList::HEADER_SHOW));
    }

    #[test]
    fn test_top_resets_baseline() {
        let mut f = setup(&[(ATTR_HEADER_SHOW, ""), (ATTR_HEADER_THRESHOLD, "0")]);

        scroll(&mut f, 40.0);
        scroll(&mut f, -15.0);
        assert_eq!(f.header.last_scroll_top(), 0.0);

        // 0 >= 0 is scrolled; 0 > 0 is not downward.
        scroll(&mut f, 0.0);
        assert!(classes(&f).contains(ClassList::HEADER_SHOW));
    }
}
