//! Core types for fls-behaviors.
//!
//! Elements are NOT objects handed out to callers. They are indices into the
//! document arena, the same way every behavior addresses them.

use std::fmt;

// =============================================================================
// Element identity
// =============================================================================

/// Stable handle of an element inside a [`Document`](crate::dom::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Class list (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Behavior classes an element can carry.
    ///
    /// Only the classes the behaviors read or write are modelled.
    /// Combine with bitwise OR: `ClassList::RATING_ITEM | ClassList::RATING_ITEM_ACTIVE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassList: u16 {
        const NONE = 0;
        const HEADER_SCROLL = 1 << 0;
        const HEADER_SHOW = 1 << 1;
        const RATING_ITEMS = 1 << 2;
        const RATING_ITEM = 1 << 3;
        const RATING_ITEM_ACTIVE = 1 << 4;
        const RATING_INPUT = 1 << 5;
    }
}

impl ClassList {
    /// Class names in declaration order.
    const NAMES: [(ClassList, &'static str); 6] = [
        (ClassList::HEADER_SCROLL, "--header-scroll"),
        (ClassList::HEADER_SHOW, "--header-show"),
        (ClassList::RATING_ITEMS, "rating__items"),
        (ClassList::RATING_ITEM, "rating__item"),
        (ClassList::RATING_ITEM_ACTIVE, "rating__item--active"),
        (ClassList::RATING_INPUT, "rating__input"),
    ];

    /// Look up a single class by its name.
    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    /// Parse a whitespace separated `class` attribute, ignoring unknown names.
    pub fn parse(class_attr: &str) -> Self {
        class_attr
            .split_whitespace()
            .filter_map(Self::from_class_name)
            .fold(Self::NONE, |acc, flag| acc | flag)
    }

    /// Render as a `class` attribute value.
    pub fn to_class_string(self) -> String {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// =============================================================================
// Inline style
// =============================================================================

/// The inline style properties the behaviors write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Style {
    /// `padding-right` in px. `None` = not set.
    pub padding_right: Option<f64>,
    /// `width` in percent. `None` = not set.
    pub width_percent: Option<f64>,
}

/// Format a number the way the page prints it: `4` not `4.0`, `3.5` stays `3.5`.
///
/// Magnitude is never clamped; `-0` prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_parse_ignores_unknown() {
        let classes = ClassList::parse("rating__item  foo rating__item--active");
        assert_eq!(classes, ClassList::RATING_ITEM | ClassList::RATING_ITEM_ACTIVE);
        // The widget root class is never written, so it is not modelled.
        assert_eq!(ClassList::parse("rating"), ClassList::NONE);
    }

    #[test]
    fn test_class_list_to_string() {
        let classes = ClassList::HEADER_SHOW | ClassList::HEADER_SCROLL;
        assert_eq!(classes.to_class_string(), "--header-scroll --header-show");
        assert_eq!(ClassList::NONE.to_class_string(), "");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn test_format_number_large_values_are_exact() {
        assert_eq!(format_number(1e19), "10000000000000000000");
        assert_eq!(format_number(-1e19), "-10000000000000000000");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }
}
