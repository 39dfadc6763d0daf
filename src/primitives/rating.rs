//! Rating Primitive - star rating with fractional fill.
//!
//! Each widget renders `size` radio inputs into one `rating__items` container
//! and reflects a value onto them:
//! - items `0..floor(value)` get `rating__item--active`
//! - the item right after gets a `span` overlay whose width is the fraction
//!
//! Clicks are delegated: one [`RatingRegistry`] maps widget elements to their
//! config and resolves a click target to the widget that owns it.
//!
//! # Example
//!
//! ```ignore
//! use fls_behaviors::primitives::RatingRegistry;
//!
//! let mut ratings = RatingRegistry::new();
//! ratings.activate(&mut doc, element)?;
//! ratings.handle_click(&mut doc, clicked_input);
//! ```

use std::collections::BTreeMap;

use log::{debug, trace};
use spark_signals::{signal, Signal};

use crate::config::{
    number_or, parse_number, positive_or, ATTR_RATING, ATTR_RATING_SIZE, ATTR_RATING_TITLE,
    ATTR_RATING_TITLE_LEGACY, ATTR_RATING_VALUE, DEFAULT_RATING_SIZE, MAX_RATING_SIZE,
    RATING_SETTABLE,
};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::types::{format_number, ClassList, ElementId};

/// Radio group name shared by the generated inputs.
const INPUT_NAME: &str = "rating";

// =============================================================================
// CONFIG
// =============================================================================

/// Per-widget options, read once at activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingConfig {
    /// Number of items. Always in `1..=MAX_RATING_SIZE`.
    pub size: usize,
    /// Value rendered right after initialization. 0 = none.
    pub initial_value: f64,
    /// Mirror the value into the element's title.
    pub show_title: bool,
    /// Clicks commit a new value.
    pub is_input: bool,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_RATING_SIZE,
            initial_value: 0.0,
            show_title: false,
            is_input: false,
        }
    }
}

impl RatingConfig {
    /// Read the widget's attributes. Absent, zero or malformed numbers fall back.
    pub fn from_element(doc: &Document, id: ElementId) -> Self {
        let attr = |name: &str| doc.get_attribute(id, name);

        // Fractional sizes round up: the generating loop runs while index < size.
        let requested = positive_or(
            ATTR_RATING_SIZE,
            attr(ATTR_RATING_SIZE),
            DEFAULT_RATING_SIZE as f64,
        )
        .ceil();
        let size = if requested <= MAX_RATING_SIZE as f64 {
            requested as usize
        } else {
            debug!("rating {id}: size {requested} exceeds {MAX_RATING_SIZE}, using default");
            DEFAULT_RATING_SIZE
        };

        Self {
            size,
            initial_value: number_or(ATTR_RATING_VALUE, attr(ATTR_RATING_VALUE), 0.0),
            show_title: attr(ATTR_RATING_TITLE).is_some()
                || attr(ATTR_RATING_TITLE_LEGACY).is_some(),
            is_input: attr(ATTR_RATING) == Some(RATING_SETTABLE),
        }
    }
}

// =============================================================================
// WIDGET
// =============================================================================

/// One initialized rating element.
pub struct RatingWidget {
    element: ElementId,
    config: RatingConfig,
    value: Signal<f64>,
}

impl RatingWidget {
    /// Render `config.size` items into `element`.
    ///
    /// Not re-entrant: a second call renders a second container. Only
    /// [`RatingRegistry::activate`] calls this, once per element, and it
    /// also applies the initial value.
    pub(crate) fn initialize(doc: &mut Document, element: ElementId, config: RatingConfig) -> Result<Self> {
        let container = doc.append_new(element, "div")?;
        doc.add_class(container, ClassList::RATING_ITEMS);

        for index in 0..config.size {
            let label = doc.append_new(container, "label")?;
            doc.add_class(label, ClassList::RATING_ITEM);

            let input = doc.append_new(label, "input")?;
            doc.add_class(input, ClassList::RATING_INPUT);
            doc.set_attribute(input, "type", "radio");
            doc.set_attribute(input, "name", INPUT_NAME);
            doc.set_attribute(input, "value", &(index + 1).to_string());
        }

        trace!("rating {element}: rendered {} items", config.size);
        Ok(Self {
            element,
            config,
            value: signal(0.0),
        })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn config(&self) -> RatingConfig {
        self.config
    }

    /// Last value passed to [`RatingWidget::set_value`].
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn value_signal(&self) -> Signal<f64> {
        self.value.clone()
    }

    /// Rendered items in document order.
    pub fn items(&self, doc: &Document) -> Vec<ElementId> {
        doc.query_classes_within(self.element, ClassList::RATING_ITEM)
    }

    /// Map a clicked input's value to the value to commit.
    ///
    /// Identity for now; the hook for derived values (averaging, steps).
    pub fn get_value(&self, raw: f64) -> f64 {
        raw
    }

    /// Reflect `value` onto the items.
    ///
    /// Values past `size` render every item active with no overlay. Negative
    /// or NaN values render the empty state. The title always gets the raw value.
    pub fn set_value(&self, doc: &mut Document, value: f64) -> Result<()> {
        let rendered = if value > 0.0 { value } else { 0.0 };
        let full = rendered.floor();
        let partial = rendered - full;
        let full = full as usize;

        if self.config.show_title {
            doc.set_title(self.element, &format_number(value));
        }

        for (index, item) in self.items(doc).into_iter().enumerate() {
            doc.remove_class(item, ClassList::RATING_ITEM_ACTIVE);
            let overlays: Vec<ElementId> = doc
                .children(item)
                .iter()
                .copied()
                .filter(|child| doc.tag(*child) == Some("span"))
                .collect();
            for overlay in overlays {
                doc.remove(overlay);
            }

            if index < full {
                doc.add_class(item, ClassList::RATING_ITEM_ACTIVE);
            }
            if index == full && partial > 0.0 {
                let span = doc.create_element("span");
                doc.set_width_percent(span, Some(partial * 100.0));
                doc.append_child(item, span)?;
            }
        }

        self.value.set(value);
        debug!("rating {}: value = {value}", self.element);
        Ok(())
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Every activated rating on the page, keyed by element.
#[derive(Default)]
pub struct RatingRegistry {
    widgets: BTreeMap<ElementId, RatingWidget>,
}

impl RatingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn get(&self, element: ElementId) -> Option<&RatingWidget> {
        self.widgets.get(&element)
    }

    /// Initialize `element` once and render its initial value, if any.
    pub fn activate(&mut self, doc: &mut Document, element: ElementId) -> Result<&RatingWidget> {
        if self.widgets.contains_key(&element) {
            return Err(Error::AlreadyInitialized(element));
        }
        if doc.element(element).is_none() {
            return Err(Error::UnknownElement(element));
        }

        let config = RatingConfig::from_element(doc, element);
        let widget = RatingWidget::initialize(doc, element, config)?;
        if config.initial_value != 0.0 {
            widget.set_value(doc, config.initial_value)?;
        }
        debug!("rating {element}: activated with {config:?}");

        Ok(self.widgets.entry(element).or_insert(widget))
    }

    /// Widget whose element contains `target`, nearest first.
    pub fn owner_of(&self, doc: &Document, target: ElementId) -> Option<&RatingWidget> {
        doc.ancestors_inclusive(target)
            .find_map(|ancestor| self.widgets.get(&ancestor))
    }

    /// Delegated click handler. Returns `true` if a value was committed.
    pub fn handle_click(&self, doc: &mut Document, target: ElementId) -> bool {
        let Some(input) = doc.closest(target, |el| el.classes().contains(ClassList::RATING_INPUT))
        else {
            return false;
        };
        let Some(widget) = self.owner_of(doc, input) else {
            return false;
        };
        if !widget.config.is_input {
            trace!("rating {}: display only, click ignored", widget.element);
            return false;
        }

        let raw = match parse_number("value", doc.get_attribute(input, "value")) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                debug!("rating {}: {err}", widget.element);
                return false;
            }
        };
        match widget.set_value(doc, widget.get_value(raw)) {
            Ok(()) => true,
            Err(err) => {
                debug!("rating {}: {err}", widget.element);
                false
            }
        }
    }
}
